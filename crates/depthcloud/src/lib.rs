#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Run configuration and camera presets.
pub mod config;

/// Raw depth frames and distance decoding.
pub mod depth;

/// Error types for the processing pipeline.
pub mod error;

/// Reading and writing depth frames and point cloud files.
pub mod io;

/// Point cloud container.
pub mod pointcloud;

/// Camera poses and the per-frame pose table.
pub mod pose;

/// Folder processing pipeline.
pub mod processor;

/// Per-pixel projection ray tables.
pub mod raytable;

/// Depth frame unprojection.
pub mod unproject;
