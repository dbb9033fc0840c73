//! Activation and loss functions, sampled into curves for plotting

pub mod activation;
pub mod loss;

pub use activation::*;
pub use loss::*;

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Evenly sampled points of a scalar function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub points: Vec<(f64, f64)>,
}

impl Curve {
    pub fn xs(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(x, _)| x)
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, y)| y)
    }
}

/// Samples `f` at `steps` evenly spaced points of `range`, both ends included.
///
/// # Returns
/// * `Ok(Curve)` if `steps >= 2` and the range is finite and non-empty;
/// * `Err(CurveError)` otherwise.
///
/// # Examples
/// ```
/// # use nnexplorer::functions::sample_curve;
/// let curve = sample_curve(0.0..=1.0, 3, |x| 2.0 * x).unwrap();
/// assert_eq!(curve.points, vec![(0.0, 0.0), (0.5, 1.0), (1.0, 2.0)]);
/// ```
pub fn sample_curve<F>(
    range: RangeInclusive<f64>,
    steps: usize,
    f: F,
) -> Result<Curve, CurveError>
where
    F: Fn(f64) -> f64,
{
    if steps < 2 {
        return Err(CurveError::TooFewSteps(steps));
    }
    let (start, end) = (*range.start(), *range.end());
    if !start.is_finite() || !end.is_finite() || start >= end {
        return Err(CurveError::BadRange { start, end });
    }

    let step = (end - start) / (steps - 1) as f64;
    let points = (0..steps)
        .map(|i| {
            // Last sample lands exactly on `end`
            let x = if i == steps - 1 {
                end
            } else {
                start + step * i as f64
            };
            (x, f(x))
        })
        .collect();

    Ok(Curve { points })
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CurveError {
    #[error("Curve needs at least 2 samples, but got {0}!")]
    TooFewSteps(usize),
    #[error("Curve range must be finite and increasing, but got {start}..={end}!")]
    BadRange { start: f64, end: f64 },
    #[error("Huber delta must be a positive number, but got {0}!")]
    BadHuberDelta(f64),
    #[error("Unknown function name {0:?}!")]
    UnknownFunction(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_include_both_ends() {
        let curve = sample_curve(-6.0..=6.0, 121, |x| x).unwrap();
        assert_eq!(curve.points.len(), 121);
        assert_eq!(curve.points[0].0, -6.0);
        assert_eq!(curve.points[120].0, 6.0);
        assert!((curve.points[60].0).abs() < 1e-12);
    }

    #[test]
    fn rejects_degenerate_input() {
        assert_eq!(
            sample_curve(0.0..=1.0, 1, |x| x),
            Err(CurveError::TooFewSteps(1))
        );
        assert!(matches!(
            sample_curve(1.0..=1.0, 10, |x| x),
            Err(CurveError::BadRange { .. })
        ));
        assert!(matches!(
            sample_curve(0.0..=f64::INFINITY, 10, |x| x),
            Err(CurveError::BadRange { .. })
        ));
    }
}
