use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::DMat4;

use crate::error::{GeometryError, ParseError};

/// Determinant magnitude below which a pose matrix is treated as singular.
const SINGULAR_EPS: f64 = 1e-12;

/// A camera-to-world transform, or the explicit absence of one.
#[derive(Debug, Clone, PartialEq)]
pub enum Pose {
    /// No transform: points stay in the camera frame.
    Identity,
    /// Rigid transform from camera to world coordinates.
    Transform {
        /// The 3x3 rotation block, row-major.
        rotation: [[f64; 3]; 3],
        /// The translation vector.
        translation: [f64; 3],
    },
}

impl Pose {
    /// Build a pose from a row-major 4x4 homogeneous camera-to-world matrix.
    pub fn from_matrix(matrix: &[[f64; 4]; 4]) -> Self {
        let rotation = [
            [matrix[0][0], matrix[0][1], matrix[0][2]],
            [matrix[1][0], matrix[1][1], matrix[1][2]],
            [matrix[2][0], matrix[2][1], matrix[2][2]],
        ];
        let translation = [matrix[0][3], matrix[1][3], matrix[2][3]];
        Pose::Transform {
            rotation,
            translation,
        }
    }

    /// Apply the transform to a point: `R * p + t`.
    #[inline]
    pub fn apply(&self, point: [f64; 3]) -> [f64; 3] {
        match self {
            Pose::Identity => point,
            Pose::Transform {
                rotation: r,
                translation: t,
            } => [
                r[0][0] * point[0] + r[0][1] * point[1] + r[0][2] * point[2] + t[0],
                r[1][0] * point[0] + r[1][1] * point[1] + r[1][2] * point[2] + t[1],
                r[2][0] * point[0] + r[2][1] * point[1] + r[2][2] * point[2] + t[2],
            ],
        }
    }
}

/// Extract the integer timestamp embedded in a frame file name.
///
/// The file's base name without extension must be a base-10 integer.
pub fn frame_timestamp(path: &Path) -> Result<u64, ParseError> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    stem.parse::<u64>()
        .map_err(|_| ParseError::Timestamp(stem.to_string()))
}

/// World-to-camera poses keyed by frame timestamp.
#[derive(Debug, Clone, Default)]
pub struct PoseTable {
    poses: HashMap<u64, [[f64; 4]; 4]>,
}

impl PoseTable {
    /// Load a pose table from a CSV file.
    ///
    /// Each data row holds a timestamp followed by the row-major 4x4
    /// world-to-camera matrix, 17 comma-separated fields in total. A leading
    /// header row is skipped.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut poses = HashMap::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let fields: Vec<&str> = trimmed.split(',').map(str::trim).collect();
            let timestamp = match fields[0].parse::<u64>() {
                Ok(timestamp) => timestamp,
                // header row
                Err(_) if index == 0 => continue,
                Err(err) => {
                    return Err(ParseError::PoseRow {
                        line: index + 1,
                        reason: err.to_string(),
                    })
                }
            };

            if fields.len() != 17 {
                return Err(ParseError::PoseRow {
                    line: index + 1,
                    reason: format!("expected 17 fields, found {}", fields.len()),
                });
            }

            let mut matrix = [[0.0f64; 4]; 4];
            for (i, field) in fields[1..].iter().enumerate() {
                matrix[i / 4][i % 4] = field.parse::<f64>().map_err(|err| ParseError::PoseRow {
                    line: index + 1,
                    reason: format!("{}: {}", field, err),
                })?;
            }
            poses.insert(timestamp, matrix);
        }

        Ok(Self { poses })
    }

    /// Get the number of poses in the table.
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Resolve the camera-to-world pose for a timestamp.
    ///
    /// Returns `Ok(None)` when the table has no entry for the timestamp. The
    /// stored matrix is world-to-camera; the result is its inverse.
    pub fn camera_to_world(&self, timestamp: u64) -> Result<Option<Pose>, GeometryError> {
        let world_to_camera = match self.poses.get(&timestamp) {
            Some(matrix) => matrix,
            None => return Ok(None),
        };

        // from_cols_array_2d reads columns, the stored matrix is row-major
        let matrix = DMat4::from_cols_array_2d(world_to_camera).transpose();
        if matrix.determinant().abs() < SINGULAR_EPS {
            return Err(GeometryError::SingularPose(timestamp));
        }

        let inverse = matrix.inverse().to_cols_array_2d();
        let mut camera_to_world = [[0.0f64; 4]; 4];
        for (col, column) in inverse.iter().enumerate() {
            for (row, value) in column.iter().enumerate() {
                camera_to_world[row][col] = *value;
            }
        }
        Ok(Some(Pose::from_matrix(&camera_to_world)))
    }
}
