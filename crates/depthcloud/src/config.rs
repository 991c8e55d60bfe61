use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::depth::{DepthRange, LONG_THROW_RANGE, SHORT_THROW_RANGE};
use crate::error::ConfigError;

/// The two depth sensing modes of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraKind {
    /// Near-range mode with a wide usable interval.
    ShortThrow,
    /// Far-range mode used for spatial mapping.
    LongThrow,
}

impl CameraKind {
    /// Recording folder name inside the workspace.
    pub fn folder_name(&self) -> &'static str {
        match self {
            CameraKind::ShortThrow => "short_throw_depth",
            CameraKind::LongThrow => "long_throw_depth",
        }
    }

    /// File name of the per-pixel projection table for this camera.
    pub fn projection_bin_name(&self) -> String {
        format!("{}_camera_space_projection.bin", self.folder_name())
    }

    /// File name of the sensor pose table for this camera.
    pub fn pose_csv_name(&self) -> String {
        format!("{}.csv", self.folder_name())
    }

    /// Valid distance interval for this camera mode.
    pub fn depth_range(&self) -> DepthRange {
        match self {
            CameraKind::ShortThrow => SHORT_THROW_RANGE,
            CameraKind::LongThrow => LONG_THROW_RANGE,
        }
    }
}

/// What to do with a frame whose timestamp has no pose table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingPosePolicy {
    /// Keep the frame in its camera-local frame (identity transform).
    #[default]
    Identity,
    /// Drop the frame entirely.
    Skip,
    /// Abort the run.
    Fail,
}

impl FromStr for MissingPosePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "identity" => Ok(MissingPosePolicy::Identity),
            "skip" => Ok(MissingPosePolicy::Skip),
            "fail" => Ok(MissingPosePolicy::Fail),
            other => Err(format!(
                "unknown missing-pose policy {:?}, expected identity, skip or fail",
                other
            )),
        }
    }
}

/// Immutable configuration for one processing run.
#[derive(Debug, Clone)]
pub struct ProcessConfig {
    /// Workspace folder holding the recordings; must exist.
    pub workspace_path: PathBuf,
    /// Output folder; the workspace itself when not set.
    pub output_path: Option<PathBuf>,
    /// Suffix appended to per-frame output file names.
    pub output_suffix: String,
    /// Camera folders to process.
    pub cameras: Vec<CameraKind>,
    /// Transform points into the world frame via sensor poses.
    pub use_poses: bool,
    /// Fallback when a frame has no pose entry.
    pub missing_pose: MissingPosePolicy,
    /// Index of the first frame to process.
    pub start_frame: usize,
    /// Number of frames to process; -1 means all remaining.
    pub max_num_frames: i64,
    /// Accumulate every processed frame into one merged cloud.
    pub merge_points: bool,
    /// Reuse already-written output files instead of recomputing.
    pub use_cache: bool,
    /// Rewrite output files that already exist.
    pub overwrite: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            workspace_path: PathBuf::new(),
            output_path: None,
            output_suffix: String::new(),
            cameras: Vec::new(),
            use_poses: true,
            missing_pose: MissingPosePolicy::default(),
            start_frame: 0,
            max_num_frames: -1,
            merge_points: false,
            use_cache: false,
            overwrite: false,
        }
    }
}

impl ProcessConfig {
    /// Folder where outputs are written.
    pub fn output_root(&self) -> &Path {
        self.output_path.as_deref().unwrap_or(&self.workspace_path)
    }

    /// Per-frame file name suffix, including the separator.
    pub fn file_suffix(&self) -> String {
        if self.output_suffix.is_empty() {
            String::new()
        } else {
            format!("_{}", self.output_suffix)
        }
    }

    /// Reject configurations that cannot start processing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cameras.is_empty() {
            return Err(ConfigError::NoCameraSelected);
        }
        if !self.workspace_path.exists() {
            return Err(ConfigError::WorkspaceMissing(self.workspace_path.clone()));
        }
        Ok(())
    }
}
