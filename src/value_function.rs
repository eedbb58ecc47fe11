//! # Approximate Value Function
//!
//! Maps a grid state to one estimated return per action. The agent only
//! depends on the [`ValueFunction`] trait; [`NetworkValueFunction`] is the
//! neural-network implementation used for training.
//!
//! Updates are online one-step Q-learning: each transition nudges the taken
//! action's estimate toward `reward + discount * max_a Q(next_state, a)` (or
//! just `reward` on the terminal step). No replay buffer and no target
//! network are involved.

use std::fs;
use std::path::Path;

use ndarray::Array1;
use rand::Rng;

use crate::activations::Activation;
use crate::environment::State;
use crate::error::{GridPathError, LoadError, Result};
use crate::layers::WeightInit;
use crate::network::NeuralNetwork;

/// The atomic unit of experience fed to the value function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub state: State,
    /// Position of the taken action in the agent's action set, which is also
    /// its output index in [`ValueFunction::predict`]
    pub action: usize,
    pub reward: f32,
    pub next_state: State,
    pub done: bool,
}

pub trait ValueFunction {
    /// Number of actions an estimate is produced for
    fn action_count(&self) -> usize;

    /// Estimated value of every action in `state`, ordered by action index
    fn predict(&self, state: &State) -> Array1<f32>;

    /// Take one learning step on `transition`, returning the loss before the step
    fn update(&mut self, transition: &Transition) -> Result<f32>;

    /// Persist the learned parameters
    fn save(&self, path: &Path) -> Result<()>;

    /// Read parameters persisted by [`ValueFunction::save`] into a new value
    /// function compatible with `self`. `self` is left untouched.
    fn read_params(&self, path: &Path) -> std::result::Result<Self, LoadError>
    where
        Self: Sized;
}

/// Value function backed by a dense network: `state_size` inputs, ReLU hidden
/// layers, one linear output per action, fitted with Adam under
/// mean-squared error.
#[derive(Debug, Clone)]
pub struct NetworkValueFunction {
    network: NeuralNetwork,
    learning_rate: f32,
    discount_factor: f32,
}

impl NetworkValueFunction {
    pub fn new<R: Rng + ?Sized>(
        state_size: usize,
        action_count: usize,
        hidden_layers: &[usize],
        learning_rate: f32,
        discount_factor: f32,
        rng: &mut R,
    ) -> Result<Self> {
        if action_count == 0 {
            return Err(GridPathError::invalid_parameter("actions", "action set must not be empty"));
        }

        let mut layer_sizes = Vec::with_capacity(hidden_layers.len() + 2);
        layer_sizes.push(state_size);
        layer_sizes.extend_from_slice(hidden_layers);
        layer_sizes.push(action_count);

        let mut activations = vec![Activation::Relu; hidden_layers.len()];
        activations.push(Activation::Linear);

        let network = NeuralNetwork::new(&layer_sizes, &activations, WeightInit::XavierUniform, rng)?
            .with_adam(0.9, 0.999, 1e-7);

        Ok(NetworkValueFunction {
            network,
            learning_rate,
            discount_factor,
        })
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }

    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f32 {
        self.discount_factor
    }

    /// One-step bootstrapped target for the taken action
    pub fn target(&self, transition: &Transition) -> f32 {
        if transition.done {
            transition.reward
        } else {
            let max_next = self
                .predict(&transition.next_state)
                .fold(f32::NEG_INFINITY, |max, &v| max.max(v));
            transition.reward + self.discount_factor * max_next
        }
    }
}

impl ValueFunction for NetworkValueFunction {
    fn action_count(&self) -> usize {
        self.network.output_size()
    }

    fn predict(&self, state: &State) -> Array1<f32> {
        self.network.predict(state.features().view())
    }

    fn update(&mut self, transition: &Transition) -> Result<f32> {
        let action = transition.action;
        if action >= self.action_count() {
            return Err(GridPathError::InvalidAction {
                action,
                max_actions: self.action_count(),
            });
        }

        let features = transition.state.features();
        let mut target = self.network.predict(features.view());
        target[action] = self.target(transition);

        self.network.train_step(features.view(), target.view(), self.learning_rate)
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.network.save(path)
    }

    fn read_params(&self, path: &Path) -> std::result::Result<Self, LoadError> {
        let bytes = fs::read(path).map_err(|e| LoadError::from_io(path, e))?;
        let network = NeuralNetwork::from_bytes(&bytes).map_err(|e| LoadError::malformed(path, e.to_string()))?;

        let expected = (self.network.input_size(), self.network.output_size());
        let actual = (network.input_size(), network.output_size());
        if expected != actual {
            return Err(LoadError::malformed(
                path,
                format!("network maps {} inputs to {} outputs, expected {} to {}", actual.0, actual.1, expected.0, expected.1),
            ));
        }

        Ok(NetworkValueFunction {
            network,
            learning_rate: self.learning_rate,
            discount_factor: self.discount_factor,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn value_function() -> NetworkValueFunction {
        let mut rng = StdRng::seed_from_u64(7);
        NetworkValueFunction::new(2, 4, &[24, 24], 0.01, 0.95, &mut rng).unwrap()
    }

    #[test]
    fn test_predict_has_one_value_per_action() {
        let vf = value_function();
        assert_eq!(vf.predict(&State::new(1, 2)).len(), 4);
        assert_eq!(vf.action_count(), 4);
    }

    #[test]
    fn test_terminal_target_is_reward() {
        let vf = value_function();
        let transition = Transition {
            state: State::new(3, 4),
            action: 3,
            reward: 1.0,
            next_state: State::new(4, 4),
            done: true,
        };
        assert_eq!(vf.target(&transition), 1.0);
    }

    #[test]
    fn test_bootstrapped_target() {
        let vf = value_function();
        let transition = Transition {
            state: State::new(0, 0),
            action: 1,
            reward: -0.07,
            next_state: State::new(0, 1),
            done: false,
        };
        let max_next = vf.predict(&transition.next_state).fold(f32::NEG_INFINITY, |m, &v| m.max(v));
        assert!((vf.target(&transition) - (-0.07 + 0.95 * max_next)).abs() < 1e-6);
    }

    #[test]
    fn test_repeated_updates_move_taken_action_toward_target() {
        let mut vf = value_function();
        let transition = Transition {
            state: State::new(3, 4),
            action: 3,
            reward: 1.0,
            next_state: State::new(4, 4),
            done: true,
        };
        let before = (vf.predict(&transition.state)[3] - 1.0).abs();
        for _ in 0..50 {
            vf.update(&transition).unwrap();
        }
        let after = (vf.predict(&transition.state)[3] - 1.0).abs();
        assert!(after < before, "error grew from {} to {}", before, after);
    }

    #[test]
    fn test_rejects_empty_action_set() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(NetworkValueFunction::new(2, 0, &[24, 24], 0.01, 0.95, &mut rng).is_err());
    }
}
