//! Simulation core of the Neural Network Explorer playground.
//!
//! * [`feedforward`] - the bias-free sigmoid network, its backpropagation trainer and the
//! synthetic datasets;
//! * [`simulator`] - the epoch driver with its idle/running/completed state machine;
//! * [`functions`] - activation and loss functions sampled for the plot pages;
//! * [`config`] - run configuration, loadable from JSON.
//!
//! Python bindings are available with the `python` feature.

pub mod config;
pub mod feedforward;
pub mod functions;
pub mod simulator;

#[cfg(feature = "python")]
pub mod python_ffi;

pub use config::{ConfigError, SimulatorConfig};
pub use simulator::{EpochStats, Simulator, SimulatorError, SimulatorEvent, TrainingState};
