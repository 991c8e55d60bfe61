use std::path::Path;

use crate::error::FormatError;

/// Per-pixel projection ray components for one camera.
///
/// The camera ray through pixel (row, col) is proportional to
/// `(u, v, 1)` where `(u, v) = table.at(row, col)`. Pixels outside the
/// calibrated sensor area carry infinite components.
#[derive(Debug, Clone)]
pub struct RayTable {
    width: usize,
    height: usize,
    u: Vec<f32>,
    v: Vec<f32>,
}

impl RayTable {
    /// Parse a ray table from the raw bytes of a projection file.
    ///
    /// The file holds interleaved little-endian `(u, v)` 32-bit float pairs,
    /// one pair per pixel, in column-major pixel order; the parsed table is
    /// transposed so that `at(row, col)` matches image indexing. The float
    /// count must be exactly `2 * width * height`; any mismatch is fatal for
    /// the camera folder.
    pub fn from_bytes(bytes: &[u8], width: usize, height: usize) -> Result<Self, FormatError> {
        if bytes.len() % 4 != 0 {
            return Err(FormatError::RayTableBytes(bytes.len()));
        }

        let floats: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        let expected = 2 * width * height;
        if floats.len() != expected {
            return Err(FormatError::RayTableSize {
                expected,
                found: floats.len(),
            });
        }

        let mut u = vec![0.0f32; width * height];
        let mut v = vec![0.0f32; width * height];
        for col in 0..width {
            for row in 0..height {
                let pair = col * height + row;
                u[row * width + col] = floats[2 * pair];
                v[row * width + col] = floats[2 * pair + 1];
            }
        }

        Ok(Self {
            width,
            height,
            u,
            v,
        })
    }

    /// Read and parse a projection file for the target dimensions.
    pub fn from_file(
        path: impl AsRef<Path>,
        width: usize,
        height: usize,
    ) -> Result<Self, FormatError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes, width, height)
    }

    /// Table width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Table height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Ray components `(u, v)` at a pixel.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> (f32, f32) {
        (
            self.u[row * self.width + col],
            self.v[row * self.width + col],
        )
    }
}
