//! Configuration of a simulation run.
//!
//! Every field has a default, so a JSON file only needs the values it changes:
//!
//! ```
//! # use nnexplorer::config::SimulatorConfig;
//! # use nnexplorer::feedforward::DatasetKind;
//! let config = SimulatorConfig::from_json_str(
//!     r#"{ "geometry": [2, 8, 1], "dataset": { "kind": "spiral", "size": 200 } }"#,
//! )
//! .unwrap();
//! assert_eq!(config.dataset.kind, DatasetKind::Spiral);
//! assert_eq!(config.training.learning_rate, 0.1);
//! ```

use serde::{Deserialize, Serialize};
use std::{fs, path::Path, time::Duration};
use thiserror::Error;

use crate::feedforward::{validate_geometry, BuildError, DatasetError, DatasetKind};

/// Inputs of every dataset: the x and y coordinates.
pub const DATASET_INPUTS: usize = 2;

/// Outputs trained on a dataset: the class label.
pub const DATASET_OUTPUTS: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// `[input, hidden..., output]` layer sizes.
    pub geometry: Vec<usize>,
    pub training: TrainingConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub total_epochs: usize,
    /// Delay between two epochs of a running simulation.
    pub epoch_interval_ms: u64,
    /// Seed for weights and generated datasets. Random when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub kind: DatasetKind,
    /// Ignored for xor.
    pub size: usize,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            geometry: vec![2, 4, 1],
            training: TrainingConfig::default(),
            dataset: DatasetConfig::default(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            total_epochs: 100,
            epoch_interval_ms: 100,
            seed: None,
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            kind: DatasetKind::Xor,
            size: 100,
        }
    }
}

impl SimulatorConfig {
    #[must_use]
    pub fn with_geometry(mut self, geometry: Vec<usize>) -> Self {
        self.geometry = geometry;
        self
    }

    #[must_use]
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.training.learning_rate = learning_rate;
        self
    }

    #[must_use]
    pub fn with_total_epochs(mut self, total_epochs: usize) -> Self {
        self.training.total_epochs = total_epochs;
        self
    }

    #[must_use]
    pub fn with_epoch_interval_ms(mut self, epoch_interval_ms: u64) -> Self {
        self.training.epoch_interval_ms = epoch_interval_ms;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.training.seed = Some(seed);
        self
    }

    #[must_use]
    pub fn with_dataset(mut self, kind: DatasetKind, size: usize) -> Self {
        self.dataset = DatasetConfig { kind, size };
        self
    }

    /// Checks every section, see `TrainingConfig::validate`, `DatasetConfig::validate`
    /// and `check_geometry`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_geometry(&self.geometry)?;
        self.training.validate()?;
        self.dataset.validate()?;
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: SimulatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl TrainingConfig {
    pub fn epoch_interval(&self) -> Duration {
        Duration::from_millis(self.epoch_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_learning_rate(self.learning_rate)?;
        check_total_epochs(self.total_epochs)?;
        check_epoch_interval(self.epoch_interval_ms)?;
        Ok(())
    }
}

impl DatasetConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        Ok(self.kind.check_size(self.size)?)
    }
}

/// A geometry usable with the datasets: valid, 2 inputs and 1 output.
pub fn check_geometry(geometry: &[usize]) -> Result<(), ConfigError> {
    validate_geometry(geometry)?;
    let (inputs, outputs) = (geometry[0], geometry[geometry.len() - 1]);
    if inputs != DATASET_INPUTS || outputs != DATASET_OUTPUTS {
        return Err(ConfigError::IncompatibleGeometry { inputs, outputs });
    }
    Ok(())
}

pub fn check_learning_rate(learning_rate: f64) -> Result<(), ConfigError> {
    if !learning_rate.is_finite() || learning_rate <= 0.0 {
        return Err(ConfigError::BadLearningRate(learning_rate));
    }
    Ok(())
}

pub fn check_total_epochs(total_epochs: usize) -> Result<(), ConfigError> {
    if total_epochs == 0 {
        return Err(ConfigError::NoEpochs);
    }
    Ok(())
}

pub fn check_epoch_interval(epoch_interval_ms: u64) -> Result<(), ConfigError> {
    if epoch_interval_ms == 0 {
        return Err(ConfigError::NoInterval);
    }
    Ok(())
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Learning rate must be a positive number, but got {0}!")]
    BadLearningRate(f64),
    #[error("Total epochs must be at least 1!")]
    NoEpochs,
    #[error("Epoch interval must be at least 1 ms!")]
    NoInterval,
    #[error(transparent)]
    Geometry(#[from] BuildError),
    #[error(
        "Datasets need {} input(s) and {} output(s), but geometry has {inputs} and {outputs}!",
        DATASET_INPUTS,
        DATASET_OUTPUTS
    )]
    IncompatibleGeometry { inputs: usize, outputs: usize },
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("Cannot parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot read config: {0}")]
    Io(#[from] std::io::Error),
}
