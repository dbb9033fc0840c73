pub mod net;
pub mod trainer;

use pyo3::{prelude::*, wrap_pymodule};

use super::seeded_rng;
use crate::feedforward::{Dataset, DatasetError, DatasetKind};

/// Generates a dataset as `(x, y, label)` tuples.
#[pyfunction]
#[pyo3(signature = (kind, size = 100, seed = None))]
pub fn generate_dataset(
    kind: &str,
    size: usize,
    seed: Option<u64>,
) -> Result<Vec<(f64, f64, u8)>, DatasetError> {
    let kind: DatasetKind = kind.parse()?;
    let dataset = Dataset::generate(kind, size, &mut seeded_rng(seed))?;
    Ok(dataset.points().iter().map(|p| (p.x, p.y, p.label)).collect())
}

#[pymodule]
fn feedforward(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<net::Network>()?;
    m.add_class::<trainer::Trainer>()?;
    m.add_function(wrap_pyfunction!(generate_dataset, m)?)?;
    Ok(())
}

pub fn construct_module(m: &PyModule) -> PyResult<()> {
    m.add_wrapped(wrap_pymodule!(feedforward))?;
    Ok(())
}
