//! Feedforward neural network with backpropagation-based gradient descent training

mod dataset;
mod net;
mod trainer;

pub use dataset::*;
pub use net::*;
pub use trainer::*;
