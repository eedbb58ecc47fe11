//! # Agent Module
//!
//! The [`Agent`] ties together the pieces that learn to cross the grid:
//!
//! - a [`ValueFunction`](crate::value_function::ValueFunction) estimating the
//!   return of each action,
//! - an [`EpsilonGreedy`](crate::exploration::EpsilonGreedy) policy choosing
//!   between exploring and exploiting those estimates,
//! - [`TrainingStatistics`](crate::statistics::TrainingStatistics) averaging
//!   episode lengths in batches.
//!
//! The agent owns all learned state and persists it as two artifacts: the
//! value-function parameters and a small JSON record holding epsilon and the
//! episode counters.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use gridpath::agent::AgentBuilder;
//! use gridpath::environment::GridEnvironment;
//! use std::path::Path;
//!
//! let mut agent = AgentBuilder::new().seed(42).build().unwrap();
//! if let Err(e) = agent.load(Path::new("model.bin"), Path::new("epsilon.json")) {
//!     println!("starting fresh: {}", e);
//! }
//!
//! let mut env = GridEnvironment::new(5, vec![]).unwrap();
//! let state = env.reset();
//! let action = agent.choose_action(&state);
//! let result = env.step(action);
//! agent.train(state, action, result.reward, result.state, result.done).unwrap();
//! agent.update_epsilon();
//! ```

mod dqn;
mod persistence;

pub use dqn::{Agent, AgentBuilder};
pub use persistence::EpsilonRecord;
