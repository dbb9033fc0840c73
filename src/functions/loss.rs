use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, ops::RangeInclusive, str::FromStr};

use super::{sample_curve, Curve, CurveError};
use crate::feedforward::SizeMismatch;

/// Predictions are clamped into `[EPSILON, 1 - EPSILON]` before taking logarithms.
const BCE_EPSILON: f64 = 1e-12;

/// Loss functions shown on the loss plot page.
/// Training always uses `MeanSquared`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LossFunction {
    MeanSquared,
    MeanAbsolute,
    Huber {
        #[serde(deserialize_with = "deserialize_huber_delta")]
        delta: f64,
    },
    BinaryCrossEntropy,
}

/// Huber threshold must be a positive finite number.
pub fn check_huber_delta(delta: f64) -> Result<(), CurveError> {
    if !delta.is_finite() || delta <= 0.0 {
        return Err(CurveError::BadHuberDelta(delta));
    }
    Ok(())
}

fn deserialize_huber_delta<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let delta = f64::deserialize(deserializer)?;
    check_huber_delta(delta).map_err(serde::de::Error::custom)?;
    Ok(delta)
}

impl LossFunction {
    /// Huber loss with the given threshold.
    ///
    /// # Examples
    /// ```
    /// # use nnexplorer::functions::LossFunction;
    /// assert!(LossFunction::huber(0.5).is_ok());
    /// assert!(LossFunction::huber(-1.0).is_err());
    /// ```
    pub fn huber(delta: f64) -> Result<LossFunction, CurveError> {
        check_huber_delta(delta)?;
        Ok(LossFunction::Huber { delta })
    }

    pub fn validate(self) -> Result<(), CurveError> {
        match self {
            LossFunction::Huber { delta } => check_huber_delta(delta),
            _ => Ok(()),
        }
    }

    /// Loss of a single prediction against its target.
    pub fn loss(self, prediction: f64, target: f64) -> f64 {
        let diff = prediction - target;
        match self {
            LossFunction::MeanSquared => diff * diff,
            LossFunction::MeanAbsolute => diff.abs(),
            LossFunction::Huber { delta } => {
                if diff.abs() <= delta {
                    0.5 * diff * diff
                } else {
                    delta * (diff.abs() - 0.5 * delta)
                }
            }
            LossFunction::BinaryCrossEntropy => {
                let p = prediction.clamp(BCE_EPSILON, 1.0 - BCE_EPSILON);
                -(target * p.ln() + (1.0 - target) * (1.0 - p).ln())
            }
        }
    }

    /// Derivative of `loss` with respect to the prediction.
    pub fn gradient(self, prediction: f64, target: f64) -> f64 {
        let diff = prediction - target;
        match self {
            LossFunction::MeanSquared => 2.0 * diff,
            LossFunction::MeanAbsolute => {
                if diff > 0.0 {
                    1.0
                } else if diff < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
            LossFunction::Huber { delta } => {
                if diff > delta {
                    delta
                } else if diff < -delta {
                    -delta
                } else {
                    diff
                }
            }
            LossFunction::BinaryCrossEntropy => {
                let p = prediction.clamp(BCE_EPSILON, 1.0 - BCE_EPSILON);
                (p - target) / (p * (1.0 - p))
            }
        }
    }

    /// Mean loss over paired predictions and targets. Zero for empty slices.
    pub fn mean(self, predictions: &[f64], targets: &[f64]) -> Result<f64, SizeMismatch> {
        if predictions.len() != targets.len() {
            return Err(SizeMismatch {
                expected: predictions.len(),
                got: targets.len(),
            });
        }
        if predictions.is_empty() {
            return Ok(0.0);
        }
        let sum: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &t)| self.loss(p, t))
            .sum();
        Ok(sum / predictions.len() as f64)
    }

    /// Loss as a function of the prediction, for a fixed target.
    pub fn curve(
        self,
        target: f64,
        range: RangeInclusive<f64>,
        steps: usize,
    ) -> Result<Curve, CurveError> {
        self.validate()?;
        sample_curve(range, steps, |p| self.loss(p, target))
    }

    pub fn name(self) -> &'static str {
        match self {
            LossFunction::MeanSquared => "mse",
            LossFunction::MeanAbsolute => "mae",
            LossFunction::Huber { .. } => "huber",
            LossFunction::BinaryCrossEntropy => "bce",
        }
    }
}

impl fmt::Display for LossFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LossFunction::Huber { delta } => write!(f, "huber(delta={})", delta),
            other => f.write_str(other.name()),
        }
    }
}

impl FromStr for LossFunction {
    type Err = CurveError;

    /// Accepts `mse`, `mae`, `bce` and `huber` (with the default delta of 1).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mse" => Ok(LossFunction::MeanSquared),
            "mae" => Ok(LossFunction::MeanAbsolute),
            "huber" => Ok(LossFunction::Huber { delta: 1.0 }),
            "bce" => Ok(LossFunction::BinaryCrossEntropy),
            _ => Err(CurveError::UnknownFunction(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn losses_vanish_on_target() {
        for f in [
            LossFunction::MeanSquared,
            LossFunction::MeanAbsolute,
            LossFunction::Huber { delta: 1.0 },
        ] {
            assert_eq!(f.loss(0.3, 0.3), 0.0);
            assert_eq!(f.gradient(0.3, 0.3), 0.0);
        }
        assert!(LossFunction::BinaryCrossEntropy.loss(1.0, 1.0) < 1e-9);
    }

    #[test]
    fn huber_switches_to_linear() {
        let huber = LossFunction::Huber { delta: 1.0 };
        assert_eq!(huber.loss(0.5, 0.0), 0.125);
        assert_eq!(huber.loss(3.0, 0.0), 2.5);
        assert_eq!(huber.gradient(3.0, 0.0), 1.0);
        assert_eq!(huber.gradient(-3.0, 0.0), -1.0);
    }

    #[test]
    fn bce_stays_finite_at_the_edges() {
        let bce = LossFunction::BinaryCrossEntropy;
        assert!(bce.loss(0.0, 1.0).is_finite());
        assert!(bce.loss(1.0, 0.0).is_finite());
        assert!(bce.gradient(0.0, 1.0).is_finite());
    }

    #[test]
    fn mean_of_squares() {
        let mse = LossFunction::MeanSquared;
        assert_eq!(mse.mean(&[1.0, 0.0], &[0.0, 0.0]), Ok(0.5));
        assert_eq!(mse.mean(&[], &[]), Ok(0.0));
    }

    #[test]
    fn mean_rejects_unpaired_slices() {
        assert_eq!(
            LossFunction::MeanAbsolute.mean(&[1.0, 0.0, 0.5], &[0.0, 0.0]),
            Err(SizeMismatch {
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn huber_delta_must_be_positive() {
        for delta in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert!(matches!(
                LossFunction::huber(delta),
                Err(CurveError::BadHuberDelta(_))
            ));
        }
        for json in [
            r#"{"kind":"huber","delta":-1.0}"#,
            r#"{"kind":"huber","delta":0.0}"#,
        ] {
            assert!(serde_json::from_str::<LossFunction>(json).is_err());
        }
        let parsed: LossFunction = serde_json::from_str(r#"{"kind":"huber","delta":2.0}"#).unwrap();
        assert_eq!(parsed, LossFunction::Huber { delta: 2.0 });
    }

    #[test]
    fn bad_huber_never_panics() {
        // Built directly, bypassing the checked constructor
        let huber = LossFunction::Huber { delta: -1.0 };
        assert!(huber.gradient(0.3, 0.0).is_finite());
        assert!(huber.gradient(f64::NAN, 0.0).is_nan());
        assert!(matches!(
            huber.curve(0.0, 0.0..=1.0, 5),
            Err(CurveError::BadHuberDelta(_))
        ));
        assert!(LossFunction::Huber { delta: f64::NAN }
            .gradient(0.3, 0.0)
            .is_finite());
    }

    #[test]
    fn mse_curve_is_a_parabola() {
        let curve = LossFunction::MeanSquared.curve(0.5, 0.0..=1.0, 3).unwrap();
        assert_eq!(curve.points, vec![(0.0, 0.25), (0.5, 0.0), (1.0, 0.25)]);
    }

    #[test]
    fn parses_short_names() {
        assert_eq!(
            "MSE".parse::<LossFunction>().unwrap(),
            LossFunction::MeanSquared
        );
        assert_eq!(
            "huber".parse::<LossFunction>().unwrap(),
            LossFunction::Huber { delta: 1.0 }
        );
        assert!("hinge".parse::<LossFunction>().is_err());
    }
}
