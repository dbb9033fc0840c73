use pyo3::prelude::*;

use super::trainer::{ConsumableTrainer, Trainer};
use crate::feedforward::{BuildError, Network as InnerNetwork};
use crate::python_ffi::seeded_rng;
use crate::MakeConsumable;

MakeConsumable!(ConsumableNetwork, InnerNetwork, Network);

#[pyclass]
pub struct Network {
    pub(super) net: ConsumableNetwork,
}

#[pymethods]
impl Network {
    /// Random weights from [-0.5, 0.5] unless `weights` are given in connection order.
    #[new]
    #[pyo3(signature = (geometry, weights = None, seed = None))]
    pub fn new(
        geometry: Vec<usize>,
        weights: Option<Vec<f64>>,
        seed: Option<u64>,
    ) -> Result<Self, BuildError> {
        let net = match weights {
            Some(weights) => InnerNetwork::from_weights(&geometry, &weights)?,
            None => InnerNetwork::new(&geometry, &mut seeded_rng(seed))?,
        };
        Ok(Self {
            net: ConsumableNetwork::acquire(net),
        })
    }

    pub fn geometry(&self) -> PyResult<Vec<usize>> {
        Ok(self.net.get_ref()?.geometry().to_vec())
    }

    pub fn export(&self) -> PyResult<(Vec<usize>, Vec<f64>)> {
        let (geometry, weights) = self.net.get_ref()?.export();
        Ok((geometry.to_owned(), weights))
    }

    pub fn activations(&self) -> PyResult<Vec<f64>> {
        Ok(self.net.get_ref()?.activations())
    }

    pub fn forward(&mut self, inputs: Vec<f64>) -> PyResult<Vec<f64>> {
        Ok(self.net.get_ref_mut()?.forward(&inputs)?)
    }

    pub fn evaluate(&self, inputs: Vec<f64>) -> PyResult<Vec<f64>> {
        Ok(self.net.get_ref()?.evaluate(&inputs)?)
    }

    /// Row-major outputs over a `resolution` x `resolution` grid of the unit square.
    pub fn decision_grid(&self, resolution: usize) -> PyResult<Vec<f64>> {
        Ok(self.net.get_ref()?.decision_grid(resolution)?.values)
    }

    pub fn build_trainer(&mut self) -> PyResult<Trainer> {
        Ok(Trainer {
            trainer: ConsumableTrainer::acquire(self.net.release()?.build_trainer()),
        })
    }
}
