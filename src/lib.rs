//! # gridpath - Deep Q-Learning on a Grid
//!
//! gridpath trains a small Deep Q-Network agent to walk from the top-left
//! corner of a square grid to the opposite corner while avoiding penalized
//! obstacle cells. Learning is online: every transition is trained on
//! immediately, and the agent's learned state can be checkpointed and resumed
//! across process restarts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gridpath::agent::AgentBuilder;
//! use gridpath::config::TrainingConfig;
//! use gridpath::environment::Cell;
//! use gridpath::trainer::Trainer;
//!
//! let config = TrainingConfig::new(5, vec![Cell::new(2, 2)], 10, "model.bin", "epsilon.json");
//! let trainer = Trainer::new(config).unwrap();
//! let mut agent = AgentBuilder::new().build().unwrap();
//!
//! let report = trainer.run(&mut agent).unwrap();
//! println!("{}", report.last_episode.to_json().unwrap());
//! ```
//!
//! ## Module Organization
//!
//! - [`environment`] - The grid world, its states, actions and rewards
//! - [`value_function`] - Per-action value estimates and the Q-learning update
//! - [`exploration`] - Epsilon-greedy action selection with decay
//! - [`statistics`] - Batched averages of episode lengths
//! - [`agent`] - The agent and its persistence
//! - [`trainer`] - The episode loop and the `run_training` entry point
//! - [`checkpoint`] - When the trainer persists progress
//! - [`config`] - Agent and training configuration
//! - [`routes`] - The fixed scenarios served to the front end
//! - [`network`], [`layers`], [`activations`], [`loss`], [`optimizer`] - The
//!   dense network behind the value function
//! - [`error`] - Error types and result handling

pub mod activations;
pub mod agent;
pub mod checkpoint;
pub mod config;
pub mod environment;
pub mod error;
pub mod exploration;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optimizer;
pub mod routes;
pub mod statistics;
pub mod trainer;
pub mod value_function;

pub use error::{GridPathError, LoadError, Result};
pub use trainer::run_training;

#[cfg(test)]
mod tests;
