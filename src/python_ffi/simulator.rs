use pyo3::prelude::*;
use std::time::Instant;

use crate::config::{ConfigError, SimulatorConfig};
use crate::feedforward::DatasetKind;
use crate::simulator::{EpochStats, Simulator as InnerSimulator, SimulatorError};

/// Epoch driver. The Python side calls `poll` from its own event loop or timer.
#[pyclass]
pub struct Simulator {
    inner: InnerSimulator,
}

fn stats_tuple(stats: EpochStats) -> (usize, f64, f64) {
    (stats.epoch, stats.error, stats.accuracy)
}

#[pymethods]
impl Simulator {
    /// Default configuration unless a JSON config is given.
    #[new]
    #[pyo3(signature = (config_json = None))]
    pub fn new(config_json: Option<&str>) -> Result<Self, SimulatorError> {
        let config = match config_json {
            Some(json) => SimulatorConfig::from_json_str(json)?,
            None => SimulatorConfig::default(),
        };
        Ok(Self {
            inner: InnerSimulator::new(config)?,
        })
    }

    pub fn state(&self) -> String {
        self.inner.state().to_string()
    }

    pub fn epoch(&self) -> usize {
        self.inner.epoch()
    }

    pub fn total_epochs(&self) -> usize {
        self.inner.total_epochs()
    }

    pub fn error_history(&self) -> Vec<f64> {
        self.inner.error_history().to_vec()
    }

    pub fn start(&mut self) -> bool {
        self.inner.start(Instant::now())
    }

    pub fn stop(&mut self) -> bool {
        self.inner.stop()
    }

    pub fn toggle(&mut self) -> String {
        self.inner.toggle(Instant::now()).to_string()
    }

    /// `(epoch, error, accuracy)` if an epoch was due and ran.
    pub fn poll(&mut self) -> Result<Option<(usize, f64, f64)>, SimulatorError> {
        Ok(self.inner.poll(Instant::now())?.map(stats_tuple))
    }

    pub fn step(&mut self) -> Result<(usize, f64, f64), SimulatorError> {
        Ok(stats_tuple(self.inner.step()?))
    }

    pub fn rebuild(&mut self, geometry: Vec<usize>) -> Result<(), SimulatorError> {
        self.inner.rebuild(&geometry)
    }

    pub fn reset(&mut self) -> Result<(), SimulatorError> {
        self.inner.reset()
    }

    pub fn clear_history(&mut self) -> Result<(), SimulatorError> {
        self.inner.clear_history()
    }

    #[pyo3(signature = (kind, size = 100))]
    pub fn set_dataset(&mut self, kind: &str, size: usize) -> Result<(), SimulatorError> {
        let kind: DatasetKind = kind.parse()?;
        self.inner.set_dataset(kind, size)
    }

    pub fn set_learning_rate(&mut self, learning_rate: f64) -> Result<(), SimulatorError> {
        self.inner.set_learning_rate(learning_rate)
    }

    pub fn set_total_epochs(&mut self, total_epochs: usize) -> Result<(), SimulatorError> {
        self.inner.set_total_epochs(total_epochs)
    }

    pub fn set_epoch_interval(&mut self, interval_ms: u64) -> Result<(), SimulatorError> {
        self.inner.set_epoch_interval(interval_ms)
    }

    pub fn forward(&mut self, inputs: Vec<f64>) -> Result<Vec<f64>, SimulatorError> {
        self.inner.forward(&inputs)
    }

    pub fn evaluate(&self, inputs: Vec<f64>) -> Result<Vec<f64>, SimulatorError> {
        self.inner.evaluate(&inputs)
    }

    pub fn decision_grid(&self, resolution: usize) -> Result<Vec<f64>, SimulatorError> {
        Ok(self.inner.decision_grid(resolution)?.values)
    }

    pub fn snapshot_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(&self.inner.snapshot())?)
    }

    /// Pending events, one JSON object each.
    pub fn drain_events_json(&mut self) -> Result<Vec<String>, ConfigError> {
        self.inner
            .drain_events()
            .iter()
            .map(|event| serde_json::to_string(event).map_err(ConfigError::from))
            .collect()
    }
}
