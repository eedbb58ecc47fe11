use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::persistence::EpsilonRecord;
use crate::config::AgentConfig;
use crate::environment::{Action, State};
use crate::error::{GridPathError, LoadError, Result};
use crate::exploration::EpsilonGreedy;
use crate::statistics::TrainingStatistics;
use crate::value_function::{NetworkValueFunction, Transition, ValueFunction};

/// Deep Q-Network agent trained online, one transition at a time.
///
/// # Example
///
/// ```rust
/// use gridpath::agent::AgentBuilder;
/// use gridpath::environment::{Action, State};
///
/// let mut agent = AgentBuilder::new()
///     .epsilon(0.5)
///     .epsilon_decay(0.995)
///     .seed(3)
///     .build()
///     .unwrap();
///
/// let state = State::new(0, 0);
/// let action = agent.choose_action(&state);
/// agent.train(state, action, -0.07, State::new(0, 1), false).unwrap();
/// agent.update_epsilon();
/// assert!(agent.epsilon() < 0.5);
/// ```
#[derive(Debug)]
pub struct Agent<V: ValueFunction = NetworkValueFunction> {
    value_fn: V,
    policy: EpsilonGreedy,
    statistics: TrainingStatistics,
    actions: Vec<Action>,
    rng: StdRng,
}

impl Agent<NetworkValueFunction> {
    /// Create an agent with a freshly initialized network value function.
    pub fn new(config: &AgentConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = seeded_rng(config.seed);
        let value_fn = NetworkValueFunction::new(
            config.state_size,
            config.actions.len(),
            &config.hidden_layers,
            config.learning_rate,
            config.discount_factor,
            &mut rng,
        )?;
        Self::assemble(config, value_fn, rng)
    }
}

impl<V: ValueFunction> Agent<V> {
    /// Create an agent around an existing value function. Exploration and
    /// statistics settings come from `config`; its network settings are ignored.
    pub fn with_value_function(config: &AgentConfig, value_fn: V) -> Result<Self> {
        config.validate()?;
        if value_fn.action_count() != config.actions.len() {
            return Err(GridPathError::dimension_mismatch(
                format!("{} action values", config.actions.len()),
                format!("{} action values", value_fn.action_count()),
            ));
        }
        let rng = seeded_rng(config.seed);
        Self::assemble(config, value_fn, rng)
    }

    fn assemble(config: &AgentConfig, value_fn: V, rng: StdRng) -> Result<Self> {
        Ok(Agent {
            value_fn,
            policy: EpsilonGreedy::new(config.epsilon, config.epsilon_min, config.epsilon_decay)?,
            statistics: TrainingStatistics::new(config.batch_size)?,
            actions: config.actions.clone(),
            rng,
        })
    }

    /// Select an action using the epsilon-greedy policy
    pub fn choose_action(&mut self, state: &State) -> Action {
        self.policy
            .choose_action(state, &self.value_fn, &self.actions, &mut self.rng)
    }

    /// Learn from one transition. Returns the value-function loss before the update.
    ///
    /// Fails with [`GridPathError::InvalidAction`] when `action` is not in the
    /// agent's action set.
    pub fn train(&mut self, state: State, action: Action, reward: f32, next_state: State, done: bool) -> Result<f32> {
        let slot = self.slot_of(action)?;
        self.value_fn.update(&Transition {
            state,
            action: slot,
            reward,
            next_state,
            done,
        })
    }

    /// Output index of `action` in the value function
    fn slot_of(&self, action: Action) -> Result<usize> {
        self.actions
            .iter()
            .position(|&a| a == action)
            .ok_or(GridPathError::InvalidAction {
                action: action.index(),
                max_actions: self.actions.len(),
            })
    }

    /// Decay exploration toward its floor
    pub fn update_epsilon(&mut self) {
        self.policy.decay();
    }

    /// Record a completed episode. Returns the batch mean when one was flushed.
    pub fn update_aggregate_data(&mut self, num_steps: usize) -> Option<f32> {
        self.statistics.record_episode(num_steps)
    }

    /// Average steps per completed batch of episodes
    pub fn aggregates(&self) -> &[f32] {
        self.statistics.aggregates()
    }

    pub fn epsilon(&self) -> f32 {
        self.policy.epsilon()
    }

    pub fn times_trained(&self) -> u64 {
        self.statistics.times_trained()
    }

    pub fn policy(&self) -> &EpsilonGreedy {
        &self.policy
    }

    pub fn statistics(&self) -> &TrainingStatistics {
        &self.statistics
    }

    pub fn value_function(&self) -> &V {
        &self.value_fn
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Snapshot of the scalar learned state
    pub fn epsilon_record(&self) -> EpsilonRecord {
        EpsilonRecord {
            epsilon: self.policy.epsilon(),
            times_trained: self.statistics.times_trained(),
            this_batch: self.statistics.this_batch().to_vec(),
            av_steps_per_training_batch: self.statistics.aggregates().to_vec(),
        }
    }

    /// Persist value-function parameters to `model_path` and the epsilon
    /// record to `epsilon_path`.
    pub fn save(&self, model_path: &Path, epsilon_path: &Path) -> Result<()> {
        self.value_fn.save(model_path)?;
        self.epsilon_record().write(epsilon_path)
    }

    /// Restore state written by [`Agent::save`].
    ///
    /// Both artifacts are read and checked before anything is replaced, so
    /// on error the agent keeps its current state.
    pub fn load(&mut self, model_path: &Path, epsilon_path: &Path) -> std::result::Result<(), LoadError> {
        let value_fn = self.value_fn.read_params(model_path)?;
        let record = EpsilonRecord::read(epsilon_path)?;

        self.value_fn = value_fn;
        self.policy.set_epsilon(record.epsilon);
        self.statistics.restore(
            record.times_trained,
            record.this_batch,
            record.av_steps_per_training_batch,
        );
        Ok(())
    }
}

fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Builder pattern for [`Agent`]
pub struct AgentBuilder {
    config: AgentConfig,
}

impl AgentBuilder {
    pub fn new() -> Self {
        AgentBuilder {
            config: AgentConfig::default(),
        }
    }

    pub fn from_config(config: AgentConfig) -> Self {
        AgentBuilder { config }
    }

    pub fn actions(mut self, actions: &[Action]) -> Self {
        self.config.actions = actions.to_vec();
        self
    }

    pub fn hidden_layers(mut self, widths: &[usize]) -> Self {
        self.config.hidden_layers = widths.to_vec();
        self
    }

    pub fn learning_rate(mut self, learning_rate: f32) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    pub fn discount_factor(mut self, discount_factor: f32) -> Self {
        self.config.discount_factor = discount_factor;
        self
    }

    pub fn epsilon(mut self, epsilon: f32) -> Self {
        self.config.epsilon = epsilon;
        self
    }

    pub fn epsilon_min(mut self, epsilon_min: f32) -> Self {
        self.config.epsilon_min = epsilon_min;
        self
    }

    pub fn epsilon_decay(mut self, epsilon_decay: f32) -> Self {
        self.config.epsilon_decay = epsilon_decay;
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn build(self) -> Result<Agent> {
        Agent::new(&self.config)
    }

    /// Build around a caller-supplied value function
    pub fn build_with<V: ValueFunction>(self, value_fn: V) -> Result<Agent<V>> {
        Agent::with_value_function(&self.config, value_fn)
    }
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}
