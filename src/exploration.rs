use ndarray::ArrayView1;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::environment::{Action, State};
use crate::error::{GridPathError, Result};
use crate::value_function::ValueFunction;

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

/// Epsilon greedy exploration with multiplicative decay toward a floor.
///
/// Once epsilon has reached `epsilon_min` the policy stays there: later
/// calls to [`EpsilonGreedy::decay`] are no-ops, even if epsilon is raised
/// again through [`EpsilonGreedy::set_epsilon`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    epsilon: f32,
    epsilon_initial: f32,
    epsilon_min: f32,
    epsilon_decay: f32,
    floor_reached: bool,
}

impl EpsilonGreedy {
    /// Decay used by the resumable training configuration
    pub const DECAY_SLOW: f32 = 0.998;

    /// Decay used by the in-memory training configuration
    pub const DECAY_FAST: f32 = 0.995;

    /// Initialize the policy.
    ///
    /// Fails unless `0 <= epsilon_min <= epsilon <= 1` and `0 < epsilon_decay <= 1`.
    pub fn new(epsilon: f32, epsilon_min: f32, epsilon_decay: f32) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon_min) {
            return Err(GridPathError::invalid_parameter(
                "epsilon_min".to_string(),
                format!("must lie in [0, 1], got {}", epsilon_min),
            ));
        }
        if !(epsilon_min..=1.0).contains(&epsilon) {
            return Err(GridPathError::invalid_parameter(
                "epsilon".to_string(),
                format!("must lie in [{}, 1], got {}", epsilon_min, epsilon),
            ));
        }
        if !(epsilon_decay > 0.0 && epsilon_decay <= 1.0) {
            return Err(GridPathError::invalid_parameter(
                "epsilon_decay".to_string(),
                format!("must lie in (0, 1], got {}", epsilon_decay),
            ));
        }

        Ok(EpsilonGreedy {
            epsilon,
            epsilon_initial: epsilon,
            epsilon_min,
            epsilon_decay,
            floor_reached: epsilon <= epsilon_min,
        })
    }

    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    /// Starting epsilon; epsilon never exceeds it
    pub fn epsilon_initial(&self) -> f32 {
        self.epsilon_initial
    }

    pub fn epsilon_min(&self) -> f32 {
        self.epsilon_min
    }

    pub fn epsilon_decay(&self) -> f32 {
        self.epsilon_decay
    }

    pub fn floor_reached(&self) -> bool {
        self.floor_reached
    }

    /// Overwrite epsilon, e.g. from a checkpoint. The value is clamped into
    /// `[epsilon_min, epsilon_initial]`.
    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon.clamp(self.epsilon_min, self.epsilon_initial);
        if self.epsilon <= self.epsilon_min {
            self.floor_reached = true;
        }
    }

    /// Multiply epsilon by the decay factor, never going below the floor.
    pub fn decay(&mut self) {
        if self.floor_reached || self.epsilon <= self.epsilon_min {
            self.floor_reached = true;
            return;
        }
        self.epsilon = (self.epsilon * self.epsilon_decay).max(self.epsilon_min);
        if self.epsilon <= self.epsilon_min {
            self.floor_reached = true;
        }
    }

    /// Draw whether the next action explores or exploits
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Choice {
        if rng.gen::<f32>() < self.epsilon {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Pick an action for `state`: uniformly random with probability epsilon,
    /// otherwise the greedy action under `value_fn`.
    pub fn choose_action<V, R>(&self, state: &State, value_fn: &V, actions: &[Action], rng: &mut R) -> Action
    where
        V: ValueFunction + ?Sized,
        R: Rng + ?Sized,
    {
        match self.choose(rng) {
            Choice::Explore => actions[rng.gen_range(0..actions.len())],
            Choice::Exploit => {
                let values = value_fn.predict(state);
                actions[greedy_index(values.view())]
            }
        }
    }
}

/// Index of the largest value; ties go to the lowest index and NaN never wins.
pub fn greedy_index(values: ArrayView1<f32>) -> usize {
    let mut best = 0;
    for (i, &value) in values.iter().enumerate() {
        if value > values[best] || values[best].is_nan() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_decay_is_multiplicative() {
        let mut policy = EpsilonGreedy::new(0.95, 0.01, 0.998).unwrap();
        policy.decay();
        assert!((policy.epsilon() - 0.95 * 0.998).abs() < 1e-7);
    }

    #[test]
    fn test_decay_stops_at_floor() {
        let mut policy = EpsilonGreedy::new(0.02, 0.01, 0.5).unwrap();
        policy.decay();
        assert_eq!(policy.epsilon(), 0.01);
        assert!(policy.floor_reached());
        policy.decay();
        assert_eq!(policy.epsilon(), 0.01);
    }

    #[test]
    fn test_floor_is_sticky() {
        let mut policy = EpsilonGreedy::new(0.9, 0.01, 0.1).unwrap();
        policy.decay();
        policy.decay();
        assert!(policy.floor_reached());
        policy.set_epsilon(0.5);
        policy.decay();
        assert_eq!(policy.epsilon(), 0.5);
    }

    #[test]
    fn test_set_epsilon_stays_within_initial_and_floor() {
        let mut policy = EpsilonGreedy::new(0.95, 0.01, 0.998).unwrap();
        policy.set_epsilon(0.99);
        assert_eq!(policy.epsilon(), 0.95);
        assert!(!policy.floor_reached());

        policy.set_epsilon(0.001);
        assert_eq!(policy.epsilon(), 0.01);
        assert!(policy.floor_reached());
    }

    #[test]
    fn test_greedy_breaks_ties_toward_lowest_index() {
        assert_eq!(greedy_index(array![0.1, 0.5, 0.5, 0.2].view()), 1);
        assert_eq!(greedy_index(array![0.0, 0.0, 0.0, 0.0].view()), 0);
        assert_eq!(greedy_index(array![f32::NAN, -1.0, 2.0].view()), 2);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert!(EpsilonGreedy::new(0.005, 0.01, 0.99).is_err());
        assert!(EpsilonGreedy::new(0.5, 0.01, 0.0).is_err());
        assert!(EpsilonGreedy::new(0.5, 0.01, 1.5).is_err());
        assert!(EpsilonGreedy::new(1.5, 0.01, 0.99).is_err());
    }
}
