//! Python FFI
use pyo3::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

use crate::config::ConfigError;
use crate::feedforward::{BuildError, DatasetError, ProcessError, TrainError};
use crate::functions::CurveError;
use crate::simulator::SimulatorError;
use crate::Impl_to_PyErr;

pub mod feedforward;
pub mod functions;
mod gen_macros;
pub mod simulator;

/// Seeded generator if a seed is given, otherwise seeded from the OS.
pub(crate) fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

#[pymodule]
fn nnexplorer(_py: Python, m: &PyModule) -> PyResult<()> {
    feedforward::construct_module(m)?;
    functions::construct_module(m)?;
    m.add_class::<simulator::Simulator>()?;
    Ok(())
}

Impl_to_PyErr!(
    for BuildError,
    ProcessError,
    TrainError,
    DatasetError,
    CurveError,
    ConfigError,
    SimulatorError
);
