//! Loss functions used to fit the value network.

pub mod functions;

pub use functions::{Loss, MSE};
