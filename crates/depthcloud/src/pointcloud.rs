use glam::DVec3;

/// An ordered collection of 3D points, in meters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<[f64; 3]>,
}

impl PointCloud {
    /// Create a point cloud from a list of points.
    pub fn new(points: Vec<[f64; 3]>) -> Self {
        Self { points }
    }

    /// Get the number of points in the point cloud.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the point cloud is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Get as reference the points in the point cloud.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// Append a single point.
    pub fn push(&mut self, point: [f64; 3]) {
        self.points.push(point);
    }

    /// Append all points of another cloud, preserving order.
    pub fn extend(&mut self, other: &PointCloud) {
        self.points.extend_from_slice(&other.points);
    }

    /// Convert a point from [f64; 3] to DVec3.
    fn point_to_dvec3(point: &[f64; 3]) -> DVec3 {
        DVec3::new(point[0], point[1], point[2])
    }

    /// Get the minimum bound of the point cloud.
    pub fn get_min_bound(&self) -> DVec3 {
        if self.points.is_empty() {
            return DVec3::ZERO;
        }
        self.points
            .iter()
            .map(Self::point_to_dvec3)
            .fold(Self::point_to_dvec3(&self.points[0]), |a, b| a.min(b))
    }

    /// Get the maximum bound of the point cloud.
    pub fn get_max_bound(&self) -> DVec3 {
        if self.points.is_empty() {
            return DVec3::ZERO;
        }
        self.points
            .iter()
            .map(Self::point_to_dvec3)
            .fold(Self::point_to_dvec3(&self.points[0]), |a, b| a.max(b))
    }
}
