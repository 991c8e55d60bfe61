/// OBJ-subset point cloud files.
pub mod obj;

/// 16-bit PGM depth frames.
pub mod pgm;
