use serde::{Deserialize, Serialize};

use crate::error::{GridPathError, Result};

/// Rolling averages of episode lengths, flushed every `batch_size` completed
/// episodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingStatistics {
    times_trained: u64,
    batch_size: usize,
    this_batch: Vec<usize>,
    av_steps_per_training_batch: Vec<f32>,
}

impl TrainingStatistics {
    pub const DEFAULT_BATCH_SIZE: usize = 10;

    pub fn new(batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(GridPathError::invalid_parameter("batch_size", "must be greater than zero"));
        }
        Ok(TrainingStatistics {
            times_trained: 0,
            batch_size,
            this_batch: Vec::with_capacity(batch_size),
            av_steps_per_training_batch: Vec::new(),
        })
    }

    /// Restore counters from a checkpoint.
    ///
    /// A restored in-progress batch longer than the batch size keeps only its
    /// most recent entries.
    pub fn restore(&mut self, times_trained: u64, mut this_batch: Vec<usize>, aggregates: Vec<f32>) {
        if this_batch.len() >= self.batch_size {
            let excess = this_batch.len() + 1 - self.batch_size;
            this_batch.drain(..excess);
        }
        self.times_trained = times_trained;
        self.this_batch = this_batch;
        self.av_steps_per_training_batch = aggregates;
    }

    /// Record one completed episode of `num_steps` accepted steps.
    ///
    /// Returns the batch mean when this episode completed a batch.
    pub fn record_episode(&mut self, num_steps: usize) -> Option<f32> {
        self.times_trained += 1;
        self.this_batch.push(num_steps);

        if self.times_trained % self.batch_size as u64 != 0 {
            return None;
        }

        let mean = if self.this_batch.is_empty() {
            0.0
        } else {
            self.this_batch.iter().sum::<usize>() as f32 / self.this_batch.len() as f32
        };
        self.this_batch.clear();
        self.av_steps_per_training_batch.push(mean);
        Some(mean)
    }

    /// Completed batch means in completion order
    pub fn aggregates(&self) -> &[f32] {
        &self.av_steps_per_training_batch
    }

    pub fn times_trained(&self) -> u64 {
        self.times_trained
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn this_batch(&self) -> &[usize] {
        &self.this_batch
    }
}

impl Default for TrainingStatistics {
    fn default() -> Self {
        TrainingStatistics {
            times_trained: 0,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            this_batch: Vec::with_capacity(Self::DEFAULT_BATCH_SIZE),
            av_steps_per_training_batch: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flushes_every_batch() {
        let mut stats = TrainingStatistics::new(3).unwrap();
        assert_eq!(stats.record_episode(4), None);
        assert_eq!(stats.record_episode(6), None);
        assert_eq!(stats.record_episode(8), Some(6.0));
        assert_eq!(stats.aggregates(), &[6.0]);
        assert!(stats.this_batch().is_empty());
        assert_eq!(stats.times_trained(), 3);
    }

    #[test]
    fn test_rejects_zero_batch() {
        assert!(TrainingStatistics::new(0).is_err());
    }

    #[test]
    fn test_restore_trims_oversized_batch() {
        let mut stats = TrainingStatistics::new(3).unwrap();
        stats.restore(7, vec![1, 2, 3, 4], vec![5.0]);
        assert_eq!(stats.this_batch(), &[3, 4]);
        assert_eq!(stats.times_trained(), 7);
        assert_eq!(stats.aggregates(), &[5.0]);
    }
}
