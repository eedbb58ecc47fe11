use serde::{Deserialize, Serialize};

use crate::error::{GridPathError, Result};

/// When the trainer writes the agent's learned state to disk.
///
/// `EveryStep` loses at most one transition of progress on interruption at
/// the price of a write per step; the other policies trade durability for
/// throughput without changing what is learned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointPolicy {
    #[default]
    EveryStep,
    EveryNSteps(u64),
    EveryEpisode,
    Never,
}

impl CheckpointPolicy {
    pub fn validate(&self) -> Result<()> {
        match self {
            CheckpointPolicy::EveryNSteps(0) => Err(GridPathError::invalid_parameter(
                "checkpoint",
                "step interval must be greater than zero",
            )),
            _ => Ok(()),
        }
    }

    /// Whether to save after an accepted transition, given the number of
    /// accepted transitions so far in this run (including this one)
    pub fn after_step(&self, accepted_steps: u64) -> bool {
        match self {
            CheckpointPolicy::EveryStep => true,
            CheckpointPolicy::EveryNSteps(n) => *n > 0 && accepted_steps % n == 0,
            CheckpointPolicy::EveryEpisode | CheckpointPolicy::Never => false,
        }
    }

    /// Whether to save when an episode ends
    pub fn after_episode(&self) -> bool {
        matches!(self, CheckpointPolicy::EveryEpisode)
    }
}

impl std::str::FromStr for CheckpointPolicy {
    type Err = GridPathError;

    /// Parses `every-step`, `every-episode`, `never`, or a positive step count.
    fn from_str(s: &str) -> Result<Self> {
        let policy = match s {
            "every-step" => CheckpointPolicy::EveryStep,
            "every-episode" => CheckpointPolicy::EveryEpisode,
            "never" => CheckpointPolicy::Never,
            other => other
                .parse::<u64>()
                .map(CheckpointPolicy::EveryNSteps)
                .map_err(|_| {
                    GridPathError::invalid_parameter(
                        "checkpoint".to_string(),
                        format!("expected every-step, every-episode, never or a step count, got '{}'", other),
                    )
                })?,
        };
        policy.validate()?;
        Ok(policy)
    }
}
