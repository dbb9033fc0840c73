use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::dataset::DataPoint;
use super::net::{Network, ProcessError, SizeMismatch};
use crate::functions::sigmoid_derivative;

/// Output activations at or above this value count as class 1.
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Net trainer structure.
///
/// Training procedure will look like this:
/// * One calls `Network::build_trainer`, which will consume `Network` and return `Trainer`.
/// (Consuming `Network` is needed to prevent one from building another concurrent `Trainer`s.)
/// * Training data is processed via `Trainer::train_sample` or a whole pass with
/// `Trainer::train_epoch`. Every sample updates weights right away (stochastic gradient descent).
/// Also, at any time one can call `Trainer::net_ref` to get access to `Network::evaluate`.
/// * Once finished training, one can use `Trainer::teardown` to get `Network` object back.
#[derive(Debug, Clone)]
pub struct Trainer {
    /// The network object trainer possesses.
    /// (Its neurons hold deltas of the last backward pass next to the activations.)
    pub(crate) net: Network,

    /// Samples trained since the trainer was built.
    pub(crate) samples_trained: usize,
}

/// Result of one pass over a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochOutcome {
    /// Mean of the per-sample errors.
    pub error: f64,
    /// Share of samples classified right during the pass.
    pub accuracy: f64,
}

impl Trainer {
    /// Consumes `Network` and builds `Trainer` object containing it.
    pub(super) fn build(net: Network) -> Trainer {
        Trainer {
            net,
            samples_trained: 0,
        }
    }

    /// Returns reference to contained `Network`.
    pub fn net_ref(&self) -> &Network {
        &self.net
    }

    /// Returns mutable reference to contained `Network`, allowing the use of `Network::forward`.
    pub fn net_mut(&mut self) -> &mut Network {
        &mut self.net
    }

    pub fn samples_trained(&self) -> usize {
        self.samples_trained
    }

    /// Computes deltas of every non-input neuron, going from the output layer backwards.
    /// Requires activations of the forward pass to be in place.
    ///
    /// # Returns
    /// * Sum of squared output errors.
    fn backpropagate(&mut self, targets: &[f64]) -> f64 {
        let net = &mut self.net;
        let layers_count = net.geometry.len();

        let mut cost = 0.0;
        for (neuron, &target) in net.neurons[net.layer_starts[layers_count - 1]..]
            .iter_mut()
            .zip(targets)
        {
            let error = target - neuron.activation;
            neuron.delta = error * sigmoid_derivative(neuron.activation);
            cost += error * error;
        }

        // Hidden layers, last one first. Each reads deltas of the layer after it.
        for layer in (1..layers_count - 1).rev() {
            let next_size = net.geometry[layer + 1];
            let next_start = net.layer_starts[layer + 1];
            let connections =
                &net.connections[net.connection_starts[layer]..net.connection_starts[layer + 1]];

            let (head, tail) = net.neurons.split_at_mut(next_start);
            let current = &mut head[net.layer_starts[layer]..];
            let next = &tail[..next_size];

            for (i, neuron) in current.iter_mut().enumerate() {
                let downstream: f64 = next
                    .iter()
                    .zip(&connections[i * next_size..(i + 1) * next_size])
                    .map(|(n, c)| n.delta * c.weight)
                    .sum();
                neuron.delta = sigmoid_derivative(neuron.activation) * downstream;
            }
        }

        cost
    }

    /// Applies `weight += learning_rate * delta(to) * activation(from)` to every connection.
    fn update_weights(&mut self, learning_rate: f64) {
        let net = &mut self.net;
        for connection in net.connections.iter_mut() {
            let step =
                net.neurons[connection.to.0].delta * net.neurons[connection.from.0].activation;
            connection.previous_weight = connection.weight;
            connection.weight += learning_rate * step;
            connection.gradient = step.abs();
        }
    }

    /// Performs training process on a given sample: forward pass, backward pass, then
    /// weight updates, all at once.
    ///
    /// Weights are not clipped, a too big `learning_rate` can make them diverge.
    ///
    /// # Arguments
    /// * `inputs` - slice that holds activations of input neurons;
    /// * `targets` - slice that holds desired activations of outputs neurons;
    /// * `learning_rate` - gradient multiplier.
    ///
    /// # Returns
    /// * The mean squared error of the outputs of the forward pass.
    ///
    /// # Examples
    /// ```
    /// # use nnexplorer::feedforward::Network;
    /// let mut trainer = Network::from_weights(&[2, 1], &[0.0, 0.0]).unwrap().build_trainer();
    /// let error = trainer.train_sample(&[1.0, 0.0], &[1.0], 0.1).unwrap();
    /// assert_eq!(error, 0.25);
    /// assert!(trainer.net_ref().weights()[0] > 0.0);
    /// ```
    pub fn train_sample(
        &mut self,
        inputs: &[f64],
        targets: &[f64],
        learning_rate: f64,
    ) -> Result<f64, TrainError> {
        let outputs_count = self.net.outputs_count();
        if targets.len() != outputs_count {
            return Err(TrainError::BadTargets(SizeMismatch {
                expected: outputs_count,
                got: targets.len(),
            }));
        }

        self.net.forward(inputs)?;
        let cost = self.backpropagate(targets);
        self.update_weights(learning_rate);
        self.samples_trained += 1;

        Ok(cost / outputs_count as f64)
    }

    /// Trains every data point once, in order. The point's coordinates are the inputs,
    /// its label is the only target.
    ///
    /// # Returns
    /// * `EpochOutcome` with the mean error over samples, and the share of samples whose
    /// output was on the right side of `DECISION_THRESHOLD` before the update.
    ///
    /// # Examples
    /// ```
    /// # use nnexplorer::feedforward::{Dataset, Network};
    /// let net = Network::new(&[2, 3, 1], &mut rand::thread_rng()).unwrap();
    /// let mut trainer = net.build_trainer();
    /// let outcome = trainer.train_epoch(Dataset::xor().points(), 0.5).unwrap();
    /// assert!(outcome.error > 0.0 && outcome.error < 1.0);
    /// ```
    pub fn train_epoch(
        &mut self,
        points: &[DataPoint],
        learning_rate: f64,
    ) -> Result<EpochOutcome, TrainError> {
        if points.is_empty() {
            return Err(TrainError::EmptyDataset);
        }

        let mut errors_sum = 0.0;
        let mut hits = 0usize;
        for point in points {
            errors_sum += self.train_sample(&point.inputs(), &point.targets(), learning_rate)?;

            // Activations still hold the forward pass, only weights have moved
            let output_start = self.net.layer_starts[self.net.geometry.len() - 1];
            let output = self.net.neurons[output_start].activation;
            let predicted = if output >= DECISION_THRESHOLD { 1 } else { 0 };
            if predicted == point.label {
                hits += 1;
            }
        }

        Ok(EpochOutcome {
            error: errors_sum / points.len() as f64,
            accuracy: hits as f64 / points.len() as f64,
        })
    }

    /// Consumes `Trainer` object, and returns contained `Network` back.
    pub fn teardown(self) -> Network {
        self.net
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrainError {
    #[error("Expected {} input(s), but got {}!", .0.expected, .0.got)]
    BadInputs(SizeMismatch),
    #[error("Expected {} target(s), but got {}!", .0.expected, .0.got)]
    BadTargets(SizeMismatch),
    #[error("Cannot train on an empty dataset!")]
    EmptyDataset,
    #[error(transparent)]
    Process(ProcessError),
}

impl From<ProcessError> for TrainError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::BadInputs(mismatch) => TrainError::BadInputs(mismatch),
            other => TrainError::Process(other),
        }
    }
}
