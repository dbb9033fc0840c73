use pyo3::{prelude::*, wrap_pymodule};

use crate::functions::{ActivationFunction, CurveError, LossFunction};

/// Samples an activation function (or its derivative) as `(x, y)` pairs.
#[pyfunction]
#[pyo3(signature = (name, start = -6.0, end = 6.0, steps = 121, derivative = false))]
pub fn activation_curve(
    name: &str,
    start: f64,
    end: f64,
    steps: usize,
    derivative: bool,
) -> Result<Vec<(f64, f64)>, CurveError> {
    let function: ActivationFunction = name.parse()?;
    let curve = if derivative {
        function.derivative_curve(start..=end, steps)?
    } else {
        function.curve(start..=end, steps)?
    };
    Ok(curve.points)
}

/// Samples a loss function over predictions for a fixed target, as `(prediction, loss)` pairs.
#[pyfunction]
#[pyo3(signature = (name, target = 1.0, start = 0.0, end = 1.0, steps = 101, delta = None))]
pub fn loss_curve(
    name: &str,
    target: f64,
    start: f64,
    end: f64,
    steps: usize,
    delta: Option<f64>,
) -> Result<Vec<(f64, f64)>, CurveError> {
    let function = match (name.parse::<LossFunction>()?, delta) {
        (LossFunction::Huber { .. }, Some(delta)) => LossFunction::huber(delta)?,
        (function, _) => function,
    };
    Ok(function.curve(target, start..=end, steps)?.points)
}

#[pymodule]
fn functions(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(activation_curve, m)?)?;
    m.add_function(wrap_pyfunction!(loss_curve, m)?)?;
    Ok(())
}

pub fn construct_module(m: &PyModule) -> PyResult<()> {
    m.add_wrapped(wrap_pymodule!(functions))?;
    Ok(())
}
