//! # Activation Functions Module
//!
//! Non-linearities applied after each dense layer of the value network.
//!
//! - **ReLU** (Rectified Linear Unit): `max(0, x)`, used on every hidden layer so
//!   hidden activations are never negative
//! - **Linear**: identity, used on the output layer so action values are unbounded
//!
//! ```rust
//! use gridpath::activations::Activation;
//! use ndarray::array;
//!
//! let mut data = array![[1.0, -0.5, 0.0, 2.0]];
//! Activation::Relu.apply_batch(&mut data);
//! assert_eq!(data, array![[1.0, 0.0, 0.0, 2.0]]);
//! ```

pub mod functions;

pub use functions::Activation;
