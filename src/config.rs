//! # Configuration
//!
//! [`AgentConfig`] holds the learning hyperparameters, [`TrainingConfig`]
//! describes one training run. Both deserialize from JSON; missing fields
//! take the defaults below.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::checkpoint::CheckpointPolicy;
use crate::environment::{Action, Obstacle};
use crate::error::{GridPathError, Result};
use crate::exploration::EpsilonGreedy;
use crate::statistics::TrainingStatistics;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Available actions, ordered by index
    pub actions: Vec<Action>,
    /// Width of the state vector
    pub state_size: usize,
    pub hidden_layers: Vec<usize>,
    pub learning_rate: f32,
    pub discount_factor: f32,
    pub epsilon: f32,
    pub epsilon_min: f32,
    pub epsilon_decay: f32,
    /// Completed episodes per aggregate
    pub batch_size: usize,
    /// Seed for weight initialization and exploration; entropy when absent
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        AgentConfig {
            actions: Action::ALL.to_vec(),
            state_size: 2,
            hidden_layers: vec![24, 24],
            learning_rate: 0.01,
            discount_factor: 0.95,
            epsilon: 0.95,
            epsilon_min: 0.01,
            epsilon_decay: EpsilonGreedy::DECAY_SLOW,
            batch_size: TrainingStatistics::DEFAULT_BATCH_SIZE,
            seed: None,
        }
    }
}

impl AgentConfig {
    pub fn validate(&self) -> Result<()> {
        if self.actions.is_empty() {
            return Err(GridPathError::invalid_parameter("actions", "action set must not be empty"));
        }
        if self.actions.iter().enumerate().any(|(i, a)| self.actions[..i].contains(a)) {
            return Err(GridPathError::invalid_parameter("actions", "action set must not repeat an action"));
        }
        if self.state_size == 0 {
            return Err(GridPathError::invalid_parameter("state_size", "must be greater than zero"));
        }
        if self.hidden_layers.iter().any(|&width| width == 0) {
            return Err(GridPathError::invalid_parameter("hidden_layers", "every hidden layer needs at least one unit"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(GridPathError::invalid_parameter(
                "learning_rate".to_string(),
                format!("must be positive, got {}", self.learning_rate),
            ));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(GridPathError::invalid_parameter(
                "discount_factor".to_string(),
                format!("must lie in [0, 1], got {}", self.discount_factor),
            ));
        }
        if self.batch_size == 0 {
            return Err(GridPathError::invalid_parameter("batch_size", "must be greater than zero"));
        }
        EpsilonGreedy::new(self.epsilon, self.epsilon_min, self.epsilon_decay).map(|_| ())
    }
}

/// Default cap on steps per episode; large enough to be effectively unbounded
pub const DEFAULT_MAX_ITERATION: u64 = 100_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub grid_size: usize,
    #[serde(default)]
    pub obstacles: Vec<Obstacle>,
    pub episodes: usize,
    #[serde(default = "default_max_iteration")]
    pub max_iteration: u64,
    pub model_path: PathBuf,
    pub epsilon_path: PathBuf,
    #[serde(default)]
    pub checkpoint: CheckpointPolicy,
}

fn default_max_iteration() -> u64 {
    DEFAULT_MAX_ITERATION
}

impl TrainingConfig {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(
        grid_size: usize,
        obstacles: Vec<Obstacle>,
        episodes: usize,
        model_path: P,
        epsilon_path: Q,
    ) -> Self {
        TrainingConfig {
            grid_size,
            obstacles,
            episodes,
            max_iteration: DEFAULT_MAX_ITERATION,
            model_path: model_path.into(),
            epsilon_path: epsilon_path.into(),
            checkpoint: CheckpointPolicy::default(),
        }
    }

    pub fn with_max_iteration(mut self, max_iteration: u64) -> Self {
        self.max_iteration = max_iteration;
        self
    }

    pub fn with_checkpoint(mut self, checkpoint: CheckpointPolicy) -> Self {
        self.checkpoint = checkpoint;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 2 {
            return Err(GridPathError::invalid_parameter(
                "grid_size".to_string(),
                format!("must be at least 2, got {}", self.grid_size),
            ));
        }
        if self.max_iteration == 0 {
            return Err(GridPathError::invalid_parameter("max_iteration", "must be greater than zero"));
        }
        self.checkpoint.validate()
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: TrainingConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }
}
