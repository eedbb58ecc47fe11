//! # Training Loop
//!
//! Drives episodes of the grid environment through an agent:
//!
//! ```text
//! load or init
//! for each episode:
//!     reset
//!     until done or max_iteration accepted steps:
//!         choose action -> step -> validate -> train -> decay epsilon
//!         -> checkpoint (per policy) -> record cell -> check done
//! return the last episode's record
//! ```
//!
//! Only the final episode's path is returned; earlier records are dropped as
//! soon as the next episode starts.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::agent::{Agent, AgentBuilder};
use crate::config::TrainingConfig;
use crate::environment::{Cell, GridEnvironment, Obstacle};
use crate::error::{GridPathError, Result};
use crate::value_function::ValueFunction;

/// Consecutive out-of-grid states tolerated before a run is aborted
pub const MAX_CONSECUTIVE_SKIPS: u32 = 1_000;

/// Cells visited during one episode, in order, and whether it reached the goal
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub path: Vec<Cell>,
    pub complete: bool,
}

impl EpisodeRecord {
    pub fn steps(&self) -> usize {
        self.path.len()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Summary of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub last_episode: EpisodeRecord,
    pub episodes_run: usize,
    /// Accepted transitions across all episodes of this run
    pub total_steps: u64,
    pub aggregates: Vec<f32>,
    pub epsilon: f32,
    pub times_trained: u64,
    /// Whether persisted state was restored before training
    pub resumed: bool,
}

pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Trainer { config })
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Restore the agent from the configured paths, keeping its fresh state
    /// when nothing usable is found. Returns whether state was restored.
    pub fn load_or_init<V: ValueFunction>(&self, agent: &mut Agent<V>) -> bool {
        match agent.load(&self.config.model_path, &self.config.epsilon_path) {
            Ok(()) => {
                tracing::info!(
                    model = %self.config.model_path.display(),
                    epsilon = agent.epsilon(),
                    times_trained = agent.times_trained(),
                    "Model loaded successfully"
                );
                true
            }
            Err(e) => {
                tracing::info!(reason = %e, "No existing model found, starting fresh training");
                false
            }
        }
    }

    /// Load or initialize the agent, then train for the configured episodes.
    pub fn run<V: ValueFunction>(&self, agent: &mut Agent<V>) -> Result<TrainingReport> {
        let resumed = self.load_or_init(agent);
        let mut report = self.train_episodes(agent)?;
        report.resumed = resumed;
        Ok(report)
    }

    /// Train for the configured episodes without loading persisted state.
    pub fn train_episodes<V: ValueFunction>(&self, agent: &mut Agent<V>) -> Result<TrainingReport> {
        let mut env = GridEnvironment::new(self.config.grid_size, self.config.obstacles.clone())?;
        let mut last_episode = EpisodeRecord::default();
        let mut total_steps = 0u64;

        for episode in 0..self.config.episodes {
            last_episode = self.run_episode(agent, &mut env, episode, &mut total_steps)?;

            if self.config.checkpoint.after_episode() {
                self.checkpoint(agent)?;
            }
        }

        Ok(TrainingReport {
            last_episode,
            episodes_run: self.config.episodes,
            total_steps,
            aggregates: agent.aggregates().to_vec(),
            epsilon: agent.epsilon(),
            times_trained: agent.times_trained(),
            resumed: false,
        })
    }

    fn run_episode<V: ValueFunction>(
        &self,
        agent: &mut Agent<V>,
        env: &mut GridEnvironment,
        episode: usize,
        total_steps: &mut u64,
    ) -> Result<EpisodeRecord> {
        let mut state = env.reset();
        let mut record = EpisodeRecord::default();
        let mut total_reward = 0.0f32;
        let mut iteration = 0u64;
        let mut done = false;
        let mut skipped = 0u32;

        while !done && iteration < self.config.max_iteration {
            let action = agent.choose_action(&state);
            let result = env.step(action);

            if !env.contains(&state) {
                // Unreachable while the environment clamps moves. The step is
                // retried without consuming the iteration budget.
                skipped += 1;
                tracing::warn!(x = state.x, y = state.y, skipped, "skipping transition from a state outside the grid");
                if skipped >= MAX_CONSECUTIVE_SKIPS {
                    return Err(GridPathError::InvalidState {
                        x: state.x,
                        y: state.y,
                        grid_size: env.grid_size(),
                    });
                }
                continue;
            }
            skipped = 0;

            agent.train(state, action, result.reward, result.state, result.done)?;
            agent.update_epsilon();

            *total_steps += 1;
            if self.config.checkpoint.after_step(*total_steps) {
                self.checkpoint(agent)?;
            }

            state = result.state;
            done = result.done;
            total_reward += result.reward;
            record.path.push(Cell::from(result.state));

            if done {
                record.complete = true;
                if let Some(mean) = agent.update_aggregate_data(record.steps()) {
                    tracing::info!(
                        times_trained = agent.times_trained(),
                        average_steps = mean,
                        "completed training batch"
                    );
                }
            }

            iteration += 1;
        }

        tracing::info!(
            episode,
            total_reward,
            steps = record.steps(),
            complete = record.complete,
            epsilon = agent.epsilon(),
            "Episode finished"
        );

        Ok(record)
    }

    fn checkpoint<V: ValueFunction>(&self, agent: &Agent<V>) -> Result<()> {
        tracing::debug!(model = %self.config.model_path.display(), "writing checkpoint");
        agent.save(&self.config.model_path, &self.config.epsilon_path)
    }
}

/// Train a default agent on a `grid_size` grid for `episodes` episodes,
/// resuming from and checkpointing to the given paths after every step.
///
/// Returns the final episode's trajectory.
pub fn run_training(
    grid_size: usize,
    obstacles: Vec<Obstacle>,
    episodes: usize,
    model_path: &Path,
    epsilon_path: &Path,
) -> Result<EpisodeRecord> {
    let config = TrainingConfig::new(grid_size, obstacles, episodes, model_path, epsilon_path);
    let trainer = Trainer::new(config)?;
    let mut agent = AgentBuilder::new().build()?;
    Ok(trainer.run(&mut agent)?.last_episode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_record_json_shape() {
        let record = EpisodeRecord {
            path: vec![Cell::new(0, 1), Cell::new(1, 1)],
            complete: true,
        };
        assert_eq!(
            record.to_json().unwrap(),
            r#"{"path":[{"row":0,"col":1},{"row":1,"col":1}],"complete":true}"#
        );
    }

    #[test]
    fn test_trainer_rejects_invalid_config() {
        let config = TrainingConfig::new(1, vec![], 1, "m", "e");
        assert!(Trainer::new(config).is_err());
    }
}
