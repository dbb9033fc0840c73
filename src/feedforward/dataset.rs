use rand::Rng;
use serde::{Deserialize, Serialize};
use std::{f64::consts::PI, fmt, str::FromStr};
use thiserror::Error;

/// Generated datasets (except the fixed xor) need at least this many points.
pub const MIN_GENERATED_SIZE: usize = 2;

/// Spiral arms end at this distance from the center.
const SPIRAL_MAX_RADIUS: f64 = 0.45;

/// Angle swept by each spiral arm.
const SPIRAL_SWEEP: f64 = 3.0 * PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    #[default]
    Xor,
    Circle,
    Spiral,
}

impl DatasetKind {
    pub const ALL: [DatasetKind; 3] = [DatasetKind::Xor, DatasetKind::Circle, DatasetKind::Spiral];

    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Xor => "xor",
            DatasetKind::Circle => "circle",
            DatasetKind::Spiral => "spiral",
        }
    }

    /// Number of points `Dataset::generate` returns for the requested size.
    pub fn generated_len(self, size: usize) -> usize {
        match self {
            DatasetKind::Xor => 4,
            DatasetKind::Circle => size,
            DatasetKind::Spiral => size / 2 * 2,
        }
    }

    /// Checks that `size` is enough for this kind of dataset.
    pub fn check_size(self, size: usize) -> Result<(), DatasetError> {
        if self != DatasetKind::Xor && size < MIN_GENERATED_SIZE {
            return Err(DatasetError::TooSmall { kind: self, size });
        }
        Ok(())
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKind {
    type Err = DatasetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DatasetKind::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DatasetError::UnknownKind(s.to_owned()))
    }
}

/// Labeled point of the unit square.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
    /// 0 or 1.
    pub label: u8,
}

impl DataPoint {
    pub fn new(x: f64, y: f64, label: u8) -> DataPoint {
        DataPoint { x, y, label }
    }

    pub fn inputs(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    pub fn targets(&self) -> [f64; 1] {
        [self.label as f64]
    }
}

/// Two-class dataset of 2-D points. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    kind: DatasetKind,
    points: Vec<DataPoint>,
}

impl Dataset {
    /// The four corners of the unit square labeled with their xor.
    pub fn xor() -> Dataset {
        Dataset {
            kind: DatasetKind::Xor,
            points: vec![
                DataPoint::new(0.0, 0.0, 0),
                DataPoint::new(0.0, 1.0, 1),
                DataPoint::new(1.0, 0.0, 1),
                DataPoint::new(1.0, 1.0, 0),
            ],
        }
    }

    /// Generates a dataset of given kind.
    ///
    /// * `Xor` - always the same 4 points, `size` is ignored;
    /// * `Circle` - `size` points around (0.5, 0.5): a radius `r` from [0,1) and an angle are
    /// drawn uniformly, the point lies at `0.5 * r` from the center, inside points (`r < 0.5`)
    /// are class 1;
    /// * `Spiral` - two interleaved arms of `size / 2` points, the second one turned by π.
    /// The radius grows linearly along an arm. First arm is class 0, second is class 1.
    ///
    /// # Examples
    /// ```
    /// # use nnexplorer::feedforward::{Dataset, DatasetKind};
    /// let spiral = Dataset::generate(DatasetKind::Spiral, 101, &mut rand::thread_rng()).unwrap();
    /// assert_eq!(spiral.len(), 100);
    /// ```
    pub fn generate<R: Rng + ?Sized>(
        kind: DatasetKind,
        size: usize,
        rng: &mut R,
    ) -> Result<Dataset, DatasetError> {
        kind.check_size(size)?;

        let points = match kind {
            DatasetKind::Xor => return Ok(Dataset::xor()),
            DatasetKind::Circle => (0..size)
                .map(|_| {
                    let radius: f64 = rng.gen();
                    let angle = rng.gen::<f64>() * 2.0 * PI;
                    DataPoint::new(
                        (0.5 + 0.5 * radius * angle.cos()).clamp(0.0, 1.0),
                        (0.5 + 0.5 * radius * angle.sin()).clamp(0.0, 1.0),
                        if radius < 0.5 { 1 } else { 0 },
                    )
                })
                .collect(),
            DatasetKind::Spiral => {
                let arm_len = size / 2;
                let mut points = Vec::with_capacity(arm_len * 2);
                for i in 0..arm_len {
                    // Starting past the center, so the arms never share a point
                    let t = (i + 1) as f64 / arm_len as f64;
                    let radius = SPIRAL_MAX_RADIUS * t;
                    for arm in 0..2u8 {
                        let angle = SPIRAL_SWEEP * t + PI * arm as f64;
                        points.push(DataPoint::new(
                            0.5 + radius * angle.cos(),
                            0.5 + radius * angle.sin(),
                            arm,
                        ));
                    }
                }
                points
            }
        };

        Ok(Dataset { kind, points })
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of points of each class, `[class 0, class 1]`.
    pub fn class_counts(&self) -> [usize; 2] {
        let ones = self.points.iter().filter(|p| p.label == 1).count();
        [self.points.len() - ones, ones]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("Dataset {kind} needs at least {} points, but got {size}!", MIN_GENERATED_SIZE)]
    TooSmall { kind: DatasetKind, size: usize },
    #[error("Unknown dataset {0:?}, expected one of: xor, circle, spiral!")]
    UnknownKind(String),
}
