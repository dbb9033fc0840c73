use pyo3::prelude::*;

use super::net::{ConsumableNetwork, Network};
use crate::feedforward::{DataPoint, Trainer as InnerTrainer};
use crate::MakeConsumable;

MakeConsumable!(ConsumableTrainer, InnerTrainer, Trainer);

#[pyclass]
pub struct Trainer {
    pub(super) trainer: ConsumableTrainer,
}

#[pymethods]
impl Trainer {
    pub fn geometry(&self) -> PyResult<Vec<usize>> {
        Ok(self.trainer.get_ref()?.net_ref().geometry().to_vec())
    }

    pub fn export_net(&self) -> PyResult<(Vec<usize>, Vec<f64>)> {
        let (geometry, weights) = self.trainer.get_ref()?.net_ref().export();
        Ok((geometry.to_owned(), weights))
    }

    pub fn forward(&mut self, inputs: Vec<f64>) -> PyResult<Vec<f64>> {
        Ok(self.trainer.get_ref_mut()?.net_mut().forward(&inputs)?)
    }

    /// One backpropagation step, returns the mean squared error before the update.
    pub fn train_sample(
        &mut self,
        inputs: Vec<f64>,
        targets: Vec<f64>,
        learning_rate: f64,
    ) -> PyResult<f64> {
        Ok(self
            .trainer
            .get_ref_mut()?
            .train_sample(&inputs, &targets, learning_rate)?)
    }

    /// One pass over `(x, y, label)` points, returns `(mean error, accuracy)`.
    pub fn train_epoch(
        &mut self,
        points: Vec<(f64, f64, u8)>,
        learning_rate: f64,
    ) -> PyResult<(f64, f64)> {
        let points: Vec<DataPoint> = points
            .into_iter()
            .map(|(x, y, label)| DataPoint::new(x, y, label))
            .collect();
        let outcome = self
            .trainer
            .get_ref_mut()?
            .train_epoch(&points, learning_rate)?;
        Ok((outcome.error, outcome.accuracy))
    }

    pub fn samples_trained(&self) -> PyResult<usize> {
        Ok(self.trainer.get_ref()?.samples_trained())
    }

    pub fn teardown(&mut self) -> PyResult<Network> {
        Ok(Network {
            net: ConsumableNetwork::acquire(self.trainer.release()?.teardown()),
        })
    }
}
