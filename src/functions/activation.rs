use serde::{Deserialize, Serialize};
use std::{fmt, ops::RangeInclusive, str::FromStr};

use super::{sample_curve, Curve, CurveError};

/// Slope of `LeakyRelu` for negative inputs.
pub const LEAKY_RELU_SLOPE: f64 = 0.01;

/// Sigmoid function.
/// Implements the formula:
/// `1 / (1 + exp(-x))`.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Sigmoid derivative function, expressed in terms of sigmoid itself.
/// Implements the formula:
/// `s * (1 - s)`, where `s = sigmoid(x)`.
pub fn sigmoid_derivative(s: f64) -> f64 {
    s * (1.0 - s)
}

/// Activation functions shown on the activation plot page.
/// The network itself always uses `Sigmoid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    Relu,
    LeakyRelu,
    Linear,
}

impl ActivationFunction {
    pub const ALL: [ActivationFunction; 5] = [
        ActivationFunction::Sigmoid,
        ActivationFunction::Tanh,
        ActivationFunction::Relu,
        ActivationFunction::LeakyRelu,
        ActivationFunction::Linear,
    ];

    pub fn apply(self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid(x),
            ActivationFunction::Tanh => x.tanh(),
            ActivationFunction::Relu => x.max(0.0),
            ActivationFunction::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    LEAKY_RELU_SLOPE * x
                }
            }
            ActivationFunction::Linear => x,
        }
    }

    /// Derivative with respect to the raw input `x`.
    pub fn derivative(self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => sigmoid_derivative(sigmoid(x)),
            ActivationFunction::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            // Subgradient 0 at the kink
            ActivationFunction::Relu => {
                if x > 0.0 {
                    1.0
                } else {
                    0.0
                }
            }
            ActivationFunction::LeakyRelu => {
                if x > 0.0 {
                    1.0
                } else {
                    LEAKY_RELU_SLOPE
                }
            }
            ActivationFunction::Linear => 1.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::Relu => "relu",
            ActivationFunction::LeakyRelu => "leaky_relu",
            ActivationFunction::Linear => "linear",
        }
    }

    pub fn curve(self, range: RangeInclusive<f64>, steps: usize) -> Result<Curve, CurveError> {
        sample_curve(range, steps, |x| self.apply(x))
    }

    pub fn derivative_curve(
        self,
        range: RangeInclusive<f64>,
        steps: usize,
    ) -> Result<Curve, CurveError> {
        sample_curve(range, steps, |x| self.derivative(x))
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ActivationFunction {
    type Err = CurveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivationFunction::ALL
            .iter()
            .copied()
            .find(|a| a.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CurveError::UnknownFunction(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sigmoid_is_centered() {
        assert_eq!(sigmoid(0.0), 0.5);
        assert_eq!(sigmoid_derivative(sigmoid(0.0)), 0.25);
        assert!(sigmoid(40.0) > 0.999_999);
        assert!(sigmoid(-40.0) < 1e-6);
    }

    #[test]
    fn derivatives_match_finite_differences() {
        let h = 1e-6;
        for f in ActivationFunction::ALL {
            for &x in &[-2.0, -0.3, 0.7, 2.5] {
                let numeric = (f.apply(x + h) - f.apply(x - h)) / (2.0 * h);
                assert!(
                    (numeric - f.derivative(x)).abs() < 1e-5,
                    "{} at {}: {} vs {}",
                    f,
                    x,
                    numeric,
                    f.derivative(x)
                );
            }
        }
    }

    #[test]
    fn parses_names() {
        for f in ActivationFunction::ALL {
            assert_eq!(f.name().parse::<ActivationFunction>().unwrap(), f);
        }
        assert_eq!(
            "ReLU".parse::<ActivationFunction>().unwrap(),
            ActivationFunction::Relu
        );
        assert!("softmax".parse::<ActivationFunction>().is_err());
    }

    #[test]
    fn relu_curve_is_flat_then_linear() {
        let curve = ActivationFunction::Relu.curve(-1.0..=1.0, 5).unwrap();
        let ys: Vec<f64> = curve.ys().collect();
        assert_eq!(ys, vec![0.0, 0.0, 0.0, 0.5, 1.0]);
    }
}
