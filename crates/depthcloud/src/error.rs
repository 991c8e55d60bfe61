use std::path::PathBuf;

/// Errors detected while validating the run configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Neither camera type was selected.
    #[error("no camera selected, enable short-throw and/or long-throw")]
    NoCameraSelected,

    /// The workspace folder does not exist.
    #[error("workspace folder does not exist: {0}")]
    WorkspaceMissing(PathBuf),

    /// The camera folder does not exist inside the workspace.
    #[error("camera folder does not exist: {0}")]
    CameraFolderMissing(PathBuf),
}

/// Errors for malformed binary or text inputs.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    /// Failed to read or write a file.
    #[error("failed to access file. {0}")]
    Io(#[from] std::io::Error),

    /// Failed to decode a depth frame.
    #[error("failed to decode depth frame. {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The depth frame is not 16-bit single channel.
    #[error("depth frame is not 16-bit grayscale: {0}")]
    UnsupportedDepthFormat(PathBuf),

    /// The ray table byte length is not a whole number of 32-bit floats.
    #[error("ray table byte length {0} is not a multiple of 4")]
    RayTableBytes(usize),

    /// The ray table element count does not match the target dimensions.
    #[error("ray table holds {found} floats, expected {expected}")]
    RayTableSize {
        /// Float count implied by the target dimensions (2 * width * height).
        expected: usize,
        /// Float count actually present in the file.
        found: usize,
    },

    /// Frame dimensions do not match the folder ray table.
    #[error("frame is {found_width}x{found_height}, ray table is {width}x{height}")]
    DimensionMismatch {
        /// Ray table width.
        width: usize,
        /// Ray table height.
        height: usize,
        /// Frame width.
        found_width: usize,
        /// Frame height.
        found_height: usize,
    },

    /// A vertex line in a point cloud file could not be parsed.
    #[error("malformed vertex at {path}:{line}")]
    ObjVertex {
        /// File holding the bad line.
        path: PathBuf,
        /// One-based line number.
        line: usize,
    },
}

/// Errors for unparseable text inputs.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// Failed to read the pose table file.
    #[error("failed to read pose table. {0}")]
    Io(#[from] std::io::Error),

    /// The frame file name is not a decimal timestamp.
    #[error("frame name is not a decimal timestamp: {0:?}")]
    Timestamp(String),

    /// A pose table row could not be parsed.
    #[error("malformed pose row at line {line}: {reason}")]
    PoseRow {
        /// One-based line number.
        line: usize,
        /// What went wrong with the row.
        reason: String,
    },
}

/// Errors from pose geometry.
#[derive(Debug, thiserror::Error)]
pub enum GeometryError {
    /// The stored world-to-camera matrix cannot be inverted.
    #[error("singular world-to-camera matrix for timestamp {0}")]
    SingularPose(u64),
}

/// Umbrella error for folder processing.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Invalid run configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Malformed input data.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Unparseable text input.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Pose geometry failure.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Filesystem failure.
    #[error("i/o error. {0}")]
    Io(#[from] std::io::Error),

    /// A frame has no pose entry and the policy forbids a fallback.
    #[error("no pose entry for frame {0}")]
    MissingPose(PathBuf),
}
