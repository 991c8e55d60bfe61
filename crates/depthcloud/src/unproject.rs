use crate::depth::{DepthImage, DepthRange};
use crate::error::FormatError;
use crate::pointcloud::PointCloud;
use crate::pose::Pose;
use crate::raytable::RayTable;

/// Unproject a depth frame into a point cloud.
///
/// Pixels are visited in row-major order and the output preserves that
/// order. A pixel is discarded when either of its ray components is
/// infinite or its decoded distance falls outside `range`; the range check
/// applies to the raw decoded distance, not the reconstructed depth. The
/// camera looks down -z, so the depth along the ray at a pixel with
/// components `(u, v)` and distance `d` is `z = -d / sqrt(u^2 + v^2 + 1)`
/// and the camera-space point is `(u, v, 1) * z`, which `pose` then maps
/// into its target frame.
///
/// # Arguments
///
/// * `depth` - The raw depth frame; dimensions must match the ray table.
/// * `rays` - The per-pixel projection rays for the camera.
/// * `pose` - The camera-to-world pose applied to every kept point.
/// * `range` - The valid distance interval for the camera mode.
///
/// # Returns
///
/// The (possibly empty) point cloud in the pose's target frame.
pub fn unproject(
    depth: &DepthImage,
    rays: &RayTable,
    pose: &Pose,
    range: DepthRange,
) -> Result<PointCloud, FormatError> {
    if depth.width() != rays.width() || depth.height() != rays.height() {
        return Err(FormatError::DimensionMismatch {
            width: rays.width(),
            height: rays.height(),
            found_width: depth.width(),
            found_height: depth.height(),
        });
    }

    let distances = depth.to_distances();
    let mut points = Vec::new();
    for row in 0..depth.height() {
        for col in 0..depth.width() {
            let (u, v) = rays.at(row, col);
            let (x, y) = (f64::from(u), f64::from(v));
            let distance = distances[row * depth.width() + col];

            if x.is_infinite() || y.is_infinite() || !range.contains(distance) {
                continue;
            }

            let z = -distance / (x * x + y * y + 1.0).sqrt();
            points.push(pose.apply([x * z, y * z, z]));
        }
    }

    Ok(PointCloud::new(points))
}
