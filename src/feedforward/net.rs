use rand::{distributions::Uniform, prelude::Distribution, Rng};
use serde::{Deserialize, Serialize};
use std::mem;
use thiserror::Error;

use super::trainer::Trainer;
use crate::functions::sigmoid;

/// Initial weights are drawn uniformly from `[-INITIAL_WEIGHT_RANGE, INITIAL_WEIGHT_RANGE]`.
pub const INITIAL_WEIGHT_RANGE: f64 = 0.5;

/// Stable index of a neuron in `Network::neurons`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NeuronId(pub usize);

/// Stable index of a connection in `Network::connections`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(pub usize);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub id: NeuronId,
    pub layer: usize,
    /// Position within the layer.
    pub index: usize,
    /// Layout coordinate in `[0,1]²`, for rendering only.
    pub position: (f64, f64),
    /// Raw weighted sum of the last forward pass (the input value itself for input neurons).
    pub input: f64,
    pub activation: f64,
    /// Backpropagated error term.
    pub delta: f64,
    /// Highlighted by the last forward pass.
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub from: NeuronId,
    pub to: NeuronId,
    pub weight: f64,
    /// Weight before the last update, kept for animation.
    pub previous_weight: f64,
    /// Magnitude of the last update step, kept for visualization.
    pub gradient: f64,
    pub active: bool,
}

/// Dense feedforward network with sigmoid activations and no bias terms.
///
/// Neurons and connections live in two arenas and refer to each other by id:
/// `neurons = [layer_0][layer_1] ... [layer_N]`
/// `connections = [layer_0 -> layer_1] ... [layer_N-1 -> layer_N]`
/// Inside a block of connections, edges are ordered by source index, then by target index,
/// so the edge from neuron `i` of layer `l` to neuron `j` of layer `l + 1` has id
/// `connection_starts[l] + i * size(l + 1) + j`.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    /// The number of neurons in each layer.
    pub(super) geometry: Box<[usize]>,

    pub(super) neurons: Box<[Neuron]>,

    pub(super) connections: Box<[Connection]>,

    /// Id of the first neuron of each layer, followed by the total neurons count.
    pub(super) layer_starts: Box<[usize]>,

    /// Id of the first connection of each pair of adjacent layers, followed by the total count.
    pub(super) connection_starts: Box<[usize]>,
}

/// Geometry and weights of a network, enough to rebuild it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSnapshot {
    pub geometry: Vec<usize>,
    pub weights: Vec<f64>,
}

/// First output of a 2-input network sampled on a regular grid over `[0,1]²`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionGrid {
    pub resolution: usize,
    /// Row-major, rows go along `y`, columns along `x`.
    pub values: Vec<f64>,
}

impl DecisionGrid {
    /// Center of the cell at (`column`, `row`).
    pub fn cell_center(&self, column: usize, row: usize) -> (f64, f64) {
        let size = self.resolution as f64;
        ((column as f64 + 0.5) / size, (row as f64 + 0.5) / size)
    }

    pub fn value_at(&self, column: usize, row: usize) -> Option<f64> {
        if column >= self.resolution || row >= self.resolution {
            return None;
        }
        self.values.get(row * self.resolution + column).copied()
    }
}

/// Checks that a geometry describes a usable network.
///
/// # Returns
/// * `Ok(usize)` with the number of connections such a network has;
/// * `Err(BuildError)` if there are less than two layers, or some layer is empty.
pub fn validate_geometry(geometry: &[usize]) -> Result<usize, BuildError> {
    if geometry.len() < 2 {
        return Err(BuildError::BadGeometry(geometry.len()));
    }
    if let Some(layer) = geometry.iter().position(|&size| size == 0) {
        return Err(BuildError::EmptyLayer(layer));
    }
    Ok(geometry.windows(2).map(|pair| pair[0] * pair[1]).sum())
}

impl Network {
    /// Returns network for given geometry.
    /// It will have random weights from range [-0.5,0.5].
    ///
    /// # Arguments
    /// * `geometry` - a number slice that holds a desired number of neurons in each layer;
    /// * `rng` - source of the initial weights.
    ///
    /// # Examples
    /// ```
    /// # use nnexplorer::feedforward::Network;
    /// let net = Network::new(&[2, 4, 1], &mut rand::thread_rng()).unwrap();
    /// assert_eq!(net.connections().len(), 2 * 4 + 4 * 1);
    /// ```
    pub fn new<R: Rng + ?Sized>(geometry: &[usize], rng: &mut R) -> Result<Network, BuildError> {
        let connections_total = validate_geometry(geometry)?;

        let weights_between = Uniform::new_inclusive(-INITIAL_WEIGHT_RANGE, INITIAL_WEIGHT_RANGE);
        let weights: Vec<f64> = weights_between
            .sample_iter(rng)
            .take(connections_total)
            .collect();

        Ok(Network::assemble(geometry, &weights))
    }

    /// Returns network for given geometry and weights, listed in connection order.
    ///
    /// # Examples
    /// ```
    /// # use nnexplorer::feedforward::Network;
    /// let mut net = Network::from_weights(&[2, 1], &[0.0, 0.0]).unwrap();
    /// assert_eq!(net.forward(&[1.0, 1.0]).unwrap(), vec![0.5]);
    /// ```
    pub fn from_weights(geometry: &[usize], weights: &[f64]) -> Result<Network, BuildError> {
        let connections_total = validate_geometry(geometry)?;
        if weights.len() != connections_total {
            return Err(BuildError::BadWeights(SizeMismatch {
                expected: connections_total,
                got: weights.len(),
            }));
        }
        Ok(Network::assemble(geometry, weights))
    }

    pub fn from_snapshot(snapshot: &NetworkSnapshot) -> Result<Network, BuildError> {
        Network::from_weights(&snapshot.geometry, &snapshot.weights)
    }

    /// Lays out neurons and connections. Geometry and weights must be already validated.
    fn assemble(geometry: &[usize], weights: &[f64]) -> Network {
        let layers_count = geometry.len();

        let mut layer_starts = Vec::with_capacity(layers_count + 1);
        let mut neurons = Vec::with_capacity(geometry.iter().sum());
        for (layer, &layer_size) in geometry.iter().enumerate() {
            layer_starts.push(neurons.len());
            for index in 0..layer_size {
                let id = NeuronId(neurons.len());
                neurons.push(Neuron {
                    id,
                    layer,
                    index,
                    position: (
                        (layer as f64 + 0.5) / layers_count as f64,
                        (index as f64 + 0.5) / layer_size as f64,
                    ),
                    input: 0.0,
                    activation: 0.0,
                    delta: 0.0,
                    active: false,
                });
            }
        }
        layer_starts.push(neurons.len());

        let mut connection_starts = Vec::with_capacity(layers_count);
        let mut connections = Vec::with_capacity(weights.len());
        for layer in 0..layers_count - 1 {
            connection_starts.push(connections.len());
            for from in layer_starts[layer]..layer_starts[layer + 1] {
                for to in layer_starts[layer + 1]..layer_starts[layer + 2] {
                    let id = ConnectionId(connections.len());
                    let weight = weights[id.0];
                    connections.push(Connection {
                        id,
                        from: NeuronId(from),
                        to: NeuronId(to),
                        weight,
                        previous_weight: weight,
                        gradient: 0.0,
                        active: false,
                    });
                }
            }
        }
        connection_starts.push(connections.len());

        Network {
            geometry: geometry.to_owned().into_boxed_slice(),
            neurons: neurons.into_boxed_slice(),
            connections: connections.into_boxed_slice(),
            layer_starts: layer_starts.into_boxed_slice(),
            connection_starts: connection_starts.into_boxed_slice(),
        }
    }

    pub fn geometry(&self) -> &[usize] {
        &self.geometry
    }

    pub fn layers_count(&self) -> usize {
        self.geometry.len()
    }

    pub fn inputs_count(&self) -> usize {
        self.geometry[0]
    }

    pub fn outputs_count(&self) -> usize {
        self.geometry[self.geometry.len() - 1]
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn neuron(&self, id: NeuronId) -> Option<&Neuron> {
        self.neurons.get(id.0)
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id.0)
    }

    /// Neurons of the given layer, in index order.
    pub fn layer(&self, layer: usize) -> Option<&[Neuron]> {
        if layer >= self.geometry.len() {
            return None;
        }
        Some(&self.neurons[self.layer_starts[layer]..self.layer_starts[layer + 1]])
    }

    /// Connections leaving the given layer towards the next one.
    pub fn layer_connections(&self, layer: usize) -> Option<&[Connection]> {
        if layer + 1 >= self.geometry.len() {
            return None;
        }
        Some(&self.connections[self.connection_starts[layer]..self.connection_starts[layer + 1]])
    }

    /// Id of the connection between two neurons of adjacent layers.
    pub fn connection_between(&self, from: NeuronId, to: NeuronId) -> Option<ConnectionId> {
        let (source, target) = (self.neuron(from)?, self.neuron(to)?);
        if target.layer != source.layer + 1 {
            return None;
        }
        let target_layer_size = self.geometry[target.layer];
        Some(ConnectionId(
            self.connection_starts[source.layer] + source.index * target_layer_size + target.index,
        ))
    }

    /// Connections ending in the given neuron.
    pub fn incoming(&self, to: NeuronId) -> impl Iterator<Item = &Connection> + '_ {
        let layer = self.neuron(to).map(|n| n.layer).filter(|&l| l > 0);
        layer
            .and_then(|l| self.layer_connections(l - 1))
            .unwrap_or(&[])
            .iter()
            .filter(move |c| c.to == to)
    }

    /// Connections starting in the given neuron.
    pub fn outgoing(&self, from: NeuronId) -> impl Iterator<Item = &Connection> + '_ {
        let layer = self.neuron(from).map(|n| n.layer);
        layer
            .and_then(|l| self.layer_connections(l))
            .unwrap_or(&[])
            .iter()
            .filter(move |c| c.from == from)
    }

    /// Activations of the output layer after the last forward pass.
    pub fn outputs(&self) -> Vec<f64> {
        self.neurons[self.layer_starts[self.geometry.len() - 1]..]
            .iter()
            .map(|n| n.activation)
            .collect()
    }

    pub fn activations(&self) -> Vec<f64> {
        self.neurons.iter().map(|n| n.activation).collect()
    }

    /// Weights in connection order.
    pub fn weights(&self) -> Vec<f64> {
        self.connections.iter().map(|c| c.weight).collect()
    }

    /// Exports geometry and weights from network.
    ///
    /// # Returns
    /// `(geometry, weights)`.
    pub fn export(&self) -> (&[usize], Vec<f64>) {
        (&self.geometry, self.weights())
    }

    pub fn snapshot(&self) -> NetworkSnapshot {
        NetworkSnapshot {
            geometry: self.geometry.to_vec(),
            weights: self.weights(),
        }
    }

    fn check_inputs(&self, inputs: &[f64]) -> Result<(), ProcessError> {
        if inputs.len() != self.geometry[0] {
            return Err(ProcessError::BadInputs(SizeMismatch {
                expected: self.geometry[0],
                got: inputs.len(),
            }));
        }
        Ok(())
    }

    /// Weighted input of neuron `target` of the next layer.
    ///
    /// # Arguments
    /// * `activations` - activations of the previous layer, in index order;
    /// * `connections` - connections from the previous layer (see `Network` documentation);
    /// * `target` - index of the neuron in its layer;
    /// * `layer_size` - size of the layer `target` belongs to.
    fn weighted_input<I>(
        activations: I,
        connections: &[Connection],
        target: usize,
        layer_size: usize,
    ) -> f64
    where
        I: Iterator<Item = f64>,
    {
        activations
            .enumerate()
            .fold(0.0, |sum, (i, a)| sum + a * connections[i * layer_size + target].weight)
    }

    /// Computes activations of layer `layer + 1` from activations of `layer`,
    /// storing them in neurons.
    fn propagate_layer(&mut self, layer: usize) {
        let sources_start = self.layer_starts[layer];
        let targets_start = self.layer_starts[layer + 1];
        let targets_size = self.geometry[layer + 1];
        let connections = &mut self.connections
            [self.connection_starts[layer]..self.connection_starts[layer + 1]];

        // Previous layer is read-only, next layer is written
        let (head, tail) = self.neurons.split_at_mut(targets_start);
        let sources = &head[sources_start..];
        let targets = &mut tail[..targets_size];

        for (j, target) in targets.iter_mut().enumerate() {
            let sum = Network::weighted_input(
                sources.iter().map(|n| n.activation),
                connections,
                j,
                targets_size,
            );
            target.input = sum;
            target.activation = sigmoid(sum);
            target.active = target.activation != 0.0;
        }

        for (i, source) in sources.iter().enumerate() {
            for connection in &mut connections[i * targets_size..(i + 1) * targets_size] {
                connection.active = source.active;
            }
        }
    }

    /// Calculates output of the network using given input, storing activations of every neuron.
    ///
    /// Input neurons take the inputs verbatim, every next layer is computed strictly after
    /// the previous one. Neurons with non-zero activation and connections leaving them are
    /// marked active.
    ///
    /// # Returns
    /// * `Ok(Vec<f64>)` with activations of output neurons, if amount of inputs is right;
    /// * `Err(ProcessError)` otherwise.
    ///
    /// # Examples
    /// ```
    /// # use nnexplorer::feedforward::Network;
    /// let mut net = Network::new(&[2, 3], &mut rand::thread_rng()).unwrap();
    /// // No biases: zero inputs give sigmoid(0) everywhere after the input layer
    /// let outputs = net.forward(&[0.0, 0.0]).unwrap();
    /// assert_eq!(outputs, vec![0.5; 3]);
    /// ```
    pub fn forward(&mut self, inputs: &[f64]) -> Result<Vec<f64>, ProcessError> {
        self.check_inputs(inputs)?;

        for (neuron, &value) in self.neurons[..self.geometry[0]].iter_mut().zip(inputs) {
            neuron.input = value;
            neuron.activation = value;
            neuron.active = value != 0.0;
        }

        for layer in 0..self.geometry.len() - 1 {
            self.propagate_layer(layer);
        }

        Ok(self.outputs())
    }

    /// Same as `Network::forward`, but leaves neurons untouched.
    ///
    /// Uses two buffers the size of the biggest layer:
    /// `[old activations] & [weights] -> calc -> [new activations]`, then swaps them.
    pub fn evaluate(&self, inputs: &[f64]) -> Result<Vec<f64>, ProcessError> {
        self.check_inputs(inputs)?;

        let max_layer_size = self.geometry.iter().copied().max().unwrap_or(0);
        let mut old_buffer = Vec::with_capacity(max_layer_size);
        old_buffer.extend_from_slice(inputs);
        let mut buffer = Vec::with_capacity(max_layer_size);

        for layer in 0..self.geometry.len() - 1 {
            let targets_size = self.geometry[layer + 1];
            let connections =
                &self.connections[self.connection_starts[layer]..self.connection_starts[layer + 1]];

            buffer.clear();
            buffer.extend((0..targets_size).map(|j| {
                sigmoid(Network::weighted_input(
                    old_buffer.iter().copied(),
                    connections,
                    j,
                    targets_size,
                ))
            }));
            mem::swap(&mut buffer, &mut old_buffer);
        }

        Ok(old_buffer)
    }

    /// Samples the first output over a `resolution` x `resolution` grid of cell centers.
    /// Neurons stay untouched.
    pub fn decision_grid(&self, resolution: usize) -> Result<DecisionGrid, ProcessError> {
        if resolution == 0 {
            return Err(ProcessError::EmptyGrid);
        }
        let mut grid = DecisionGrid {
            resolution,
            values: Vec::with_capacity(resolution * resolution),
        };
        for row in 0..resolution {
            for column in 0..resolution {
                let (x, y) = grid.cell_center(column, row);
                let outputs = self.evaluate(&[x, y])?;
                grid.values.push(outputs[0]);
            }
        }
        Ok(grid)
    }

    /// Turns off all highlight flags.
    pub fn clear_highlights(&mut self) {
        for neuron in self.neurons.iter_mut() {
            neuron.active = false;
        }
        for connection in self.connections.iter_mut() {
            connection.active = false;
        }
    }

    /// Consumes `Network` and builds `Trainer` object containing it.
    /// See `Trainer`'s documentation for details.
    pub fn build_trainer(self) -> Trainer {
        Trainer::build(self)
    }
}

/// Error structure for `Network::new`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error(
        "Network must have at least two layers (input and output), \
        but got geometry with len {0}!"
    )]
    BadGeometry(usize),
    #[error("Every layer must have at least one neuron, but layer {0} is empty!")]
    EmptyLayer(usize),
    #[error(
        "Expected {} weights because of provided geometry, but got {}!",
        .0.expected,
        .0.got
    )]
    BadWeights(SizeMismatch),
}

/// Error structure for `Network::forward` and `Network::evaluate`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error("Expected {} input(s), but got {}!", .0.expected, .0.got)]
    BadInputs(SizeMismatch),
    #[error("Decision grid resolution must be at least 1!")]
    EmptyGrid,
}

/// Error structure for collections size mismatch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Expected {expected} values, but got {got}!")]
pub struct SizeMismatch {
    pub expected: usize,
    pub got: usize,
}
