use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::FormatError;
use crate::pointcloud::PointCloud;

/// Comment header written at the top of every point cloud file.
const HEADER: &str = "# OBJ file";

/// Write a point cloud as OBJ vertex lines.
///
/// Coordinates are written with 4 fractional digits, one `v x y z` line per
/// point, after a single comment header line. An empty cloud produces a
/// file holding only the header.
pub fn write_obj(path: impl AsRef<Path>, cloud: &PointCloud) -> Result<(), FormatError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "{}", HEADER)?;
    for point in cloud.points() {
        writeln!(writer, "v {:.4} {:.4} {:.4}", point[0], point[1], point[2])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a point cloud written by [`write_obj`].
///
/// Lines whose first token is the comment marker are skipped, and lines
/// whose first token is not `v` are ignored without error. A `v` line with
/// anything other than three decimal coordinates fails.
pub fn read_obj(path: impl AsRef<Path>) -> Result<PointCloud, FormatError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut points = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {}
            // comments, blank lines and unknown records
            _ => continue,
        }

        let mut point = [0.0f64; 3];
        for coordinate in point.iter_mut() {
            *coordinate = tokens
                .next()
                .and_then(|token| token.parse::<f64>().ok())
                .ok_or_else(|| FormatError::ObjVertex {
                    path: path.to_path_buf(),
                    line: index + 1,
                })?;
        }
        points.push(point);
    }

    Ok(PointCloud::new(points))
}
