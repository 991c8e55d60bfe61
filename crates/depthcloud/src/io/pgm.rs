use std::path::Path;

use image::DynamicImage;

use crate::depth::DepthImage;
use crate::error::FormatError;

/// Read a 16-bit single-channel PGM depth frame.
///
/// The PNM decoder applies the big-endian sample order mandated by the PGM
/// header, while the sensor writes its samples little-endian, so decoded
/// words still carry the swapped byte order that
/// [`DepthImage::to_distances`] undoes.
pub fn read_depth_pgm(path: impl AsRef<Path>) -> Result<DepthImage, FormatError> {
    let path = path.as_ref();
    match image::open(path)? {
        DynamicImage::ImageLuma16(frame) => {
            let (width, height) = (frame.width() as usize, frame.height() as usize);
            Ok(DepthImage::new(width, height, frame.into_raw()))
        }
        _ => Err(FormatError::UnsupportedDepthFormat(path.to_path_buf())),
    }
}
