use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};

/// Scalar learned state persisted next to the model.
///
/// Only `epsilon` and `times_trained` are required when reading; the batch
/// fields default to empty so records written without them still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpsilonRecord {
    pub epsilon: f32,
    pub times_trained: u64,
    #[serde(default)]
    pub this_batch: Vec<usize>,
    #[serde(default)]
    pub av_steps_per_training_batch: Vec<f32>,
}

impl EpsilonRecord {
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    pub fn read(path: &Path) -> std::result::Result<Self, LoadError> {
        let text = fs::read_to_string(path).map_err(|e| LoadError::from_io(path, e))?;
        let record: EpsilonRecord =
            serde_json::from_str(&text).map_err(|e| LoadError::malformed(path, e.to_string()))?;

        if !(0.0..=1.0).contains(&record.epsilon) {
            return Err(LoadError::malformed(
                path,
                format!("epsilon {} lies outside [0, 1]", record.epsilon),
            ));
        }
        Ok(record)
    }
}
