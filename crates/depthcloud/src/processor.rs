use std::path::{Path, PathBuf};

use crate::config::{CameraKind, MissingPosePolicy, ProcessConfig};
use crate::depth::DepthImage;
use crate::error::{ConfigError, ProcessError};
use crate::io::{obj, pgm};
use crate::pointcloud::PointCloud;
use crate::pose::{frame_timestamp, Pose, PoseTable};
use crate::raytable::RayTable;
use crate::unproject::unproject;

/// Sequential processor for one camera folder.
///
/// The projection ray table is loaded once, from the dimensions of the
/// first frame that is actually computed, and reused for every later frame
/// in the folder; a frame with different dimensions fails instead of being
/// reshaped. Frames are processed strictly in lexicographic path order.
pub struct FrameProcessor<'a> {
    config: &'a ProcessConfig,
    camera: CameraKind,
    ray_table: Option<RayTable>,
    pose_table: Option<PoseTable>,
    merged: PointCloud,
}

/// Process one camera folder and return the merged cloud.
///
/// The returned cloud is empty unless merging is enabled in the
/// configuration.
pub fn process_folder(
    config: &ProcessConfig,
    camera: CameraKind,
) -> Result<PointCloud, ProcessError> {
    FrameProcessor::new(config, camera).run()
}

impl<'a> FrameProcessor<'a> {
    /// Create a processor for one camera folder.
    pub fn new(config: &'a ProcessConfig, camera: CameraKind) -> Self {
        Self {
            config,
            camera,
            ray_table: None,
            pose_table: None,
            merged: PointCloud::default(),
        }
    }

    /// Run the frame pipeline over the selected window of the folder.
    pub fn run(mut self) -> Result<PointCloud, ProcessError> {
        let camera_folder = self.config.workspace_path.join(self.camera.folder_name());
        if !camera_folder.is_dir() {
            return Err(ConfigError::CameraFolderMissing(camera_folder).into());
        }

        let output_folder = self.config.output_root().join(self.camera.folder_name());
        std::fs::create_dir_all(&output_folder)?;

        if self.config.use_poses {
            let csv_path = self.config.workspace_path.join(self.camera.pose_csv_name());
            let table = PoseTable::from_csv(&csv_path)?;
            log::debug!("loaded {} poses from {}", table.len(), csv_path.display());
            self.pose_table = Some(table);
        }

        let frames = frame_window(
            list_depth_frames(&camera_folder)?,
            self.config.start_frame,
            self.config.max_num_frames,
        );

        let suffix = self.config.file_suffix();
        for (index, frame_path) in frames.iter().enumerate() {
            let stem = frame_path
                .file_stem()
                .and_then(|stem| stem.to_str())
                .unwrap_or_default();
            let output_path = output_folder.join(format!("{}{}.obj", stem, suffix));
            log::info!(
                "frame ({}/{}): {}",
                index + 1,
                frames.len(),
                output_path.display()
            );
            self.process_frame(frame_path, &output_path)?;
        }

        Ok(self.merged)
    }

    fn process_frame(&mut self, frame_path: &Path, output_path: &Path) -> Result<(), ProcessError> {
        let output_exists = output_path.exists();

        let points = if output_exists && self.config.use_cache {
            log::debug!("cache hit: {}", output_path.display());
            obj::read_obj(output_path)?
        } else {
            match self.compute_frame(frame_path)? {
                Some(points) => points,
                // frame dropped by the missing-pose policy or a bad pose
                None => return Ok(()),
            }
        };

        if self.config.merge_points {
            self.merged.extend(&points);
        }
        if !output_exists || self.config.overwrite {
            obj::write_obj(output_path, &points)?;
        }
        Ok(())
    }

    fn compute_frame(&mut self, frame_path: &Path) -> Result<Option<PointCloud>, ProcessError> {
        let pose = match self.resolve_pose(frame_path)? {
            Some(pose) => pose,
            None => return Ok(None),
        };

        let depth = pgm::read_depth_pgm(frame_path)?;
        let range = self.camera.depth_range();
        let rays = self.folder_ray_table(&depth)?;
        let cloud = unproject(&depth, rays, &pose, range)?;
        Ok(Some(cloud))
    }

    fn folder_ray_table(&mut self, depth: &DepthImage) -> Result<&RayTable, ProcessError> {
        if self.ray_table.is_none() {
            let bin_path = self
                .config
                .workspace_path
                .join(self.camera.projection_bin_name());
            let table = RayTable::from_file(&bin_path, depth.width(), depth.height())?;
            log::debug!(
                "loaded {}x{} ray table from {}",
                table.width(),
                table.height(),
                bin_path.display()
            );
            self.ray_table = Some(table);
        }
        match &self.ray_table {
            Some(table) => Ok(table),
            None => unreachable!("ray table initialized above"),
        }
    }

    fn resolve_pose(&self, frame_path: &Path) -> Result<Option<Pose>, ProcessError> {
        let table = match &self.pose_table {
            Some(table) => table,
            None => return Ok(Some(Pose::Identity)),
        };

        let timestamp = match frame_timestamp(frame_path) {
            Ok(timestamp) => timestamp,
            Err(err) => {
                log::warn!("{}: {}", frame_path.display(), err);
                return self.missing_pose(frame_path);
            }
        };

        match table.camera_to_world(timestamp) {
            Ok(Some(pose)) => Ok(Some(pose)),
            Ok(None) => self.missing_pose(frame_path),
            Err(err) => {
                // drop the frame, keep the run alive
                log::warn!("skipping {}: {}", frame_path.display(), err);
                Ok(None)
            }
        }
    }

    fn missing_pose(&self, frame_path: &Path) -> Result<Option<Pose>, ProcessError> {
        match self.config.missing_pose {
            MissingPosePolicy::Identity => {
                log::debug!(
                    "no pose for {}, keeping camera frame",
                    frame_path.display()
                );
                Ok(Some(Pose::Identity))
            }
            MissingPosePolicy::Skip => {
                log::warn!("no pose for {}, skipping frame", frame_path.display());
                Ok(None)
            }
            MissingPosePolicy::Fail => Err(ProcessError::MissingPose(frame_path.to_path_buf())),
        }
    }
}

/// All depth frames in a folder, lexicographically sorted.
fn list_depth_frames(folder: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut frames = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("pgm") {
            frames.push(path);
        }
    }
    frames.sort();
    Ok(frames)
}

/// Restrict the frame list to `[start, start + count)`; a negative count
/// means all remaining frames.
fn frame_window(mut frames: Vec<PathBuf>, start: usize, count: i64) -> Vec<PathBuf> {
    let start = start.min(frames.len());
    frames.drain(..start);
    if count >= 0 {
        frames.truncate(count as usize);
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::path::Path;

    fn write_sensor_pgm(path: &Path, width: usize, height: usize, millimeters: &[u16]) {
        let mut bytes = format!("P5\n{} {}\n65535\n", width, height).into_bytes();
        for value in millimeters {
            bytes.extend_from_slice(&value.to_le_bytes());
        }
        std::fs::write(path, bytes).unwrap();
    }

    fn write_zero_ray_table(workspace: &Path, camera: CameraKind, pixels: usize) {
        let bytes = vec![0u8; pixels * 2 * 4];
        std::fs::write(workspace.join(camera.projection_bin_name()), bytes).unwrap();
    }

    /// A workspace with one 2x2 short-throw frame of 1500 mm samples and an
    /// all-zero ray table.
    fn flat_workspace(dir: &Path) -> ProcessConfig {
        let camera_folder = dir.join("short_throw_depth");
        std::fs::create_dir(&camera_folder).unwrap();
        write_sensor_pgm(&camera_folder.join("1000.pgm"), 2, 2, &[1500; 4]);
        write_zero_ray_table(dir, CameraKind::ShortThrow, 4);

        ProcessConfig {
            workspace_path: dir.to_path_buf(),
            cameras: vec![CameraKind::ShortThrow],
            use_poses: false,
            merge_points: true,
            ..ProcessConfig::default()
        }
    }

    #[test]
    fn test_camera_space_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = flat_workspace(dir.path());

        let merged = process_folder(&config, CameraKind::ShortThrow).unwrap();
        assert_eq!(merged.len(), 4);
        for point in merged.points() {
            assert_relative_eq!(point[0], 0.0);
            assert_relative_eq!(point[1], 0.0);
            assert_relative_eq!(point[2], -1.5);
        }

        let output = dir.path().join("short_throw_depth/1000.obj");
        let written = obj::read_obj(&output).unwrap();
        assert_eq!(written.len(), 4);
        for point in written.points() {
            assert_relative_eq!(point[2], -1.5);
        }
    }

    #[test]
    fn test_cache_hit_bypasses_recompute() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProcessConfig {
            use_cache: true,
            ..flat_workspace(dir.path())
        };

        process_folder(&config, CameraKind::ShortThrow).unwrap();
        let output = dir.path().join("short_throw_depth/1000.obj");
        let first = std::fs::read(&output).unwrap();

        // with the ray table gone, only the cached file can produce points
        std::fs::remove_file(
            dir.path()
                .join(CameraKind::ShortThrow.projection_bin_name()),
        )
        .unwrap();

        let merged = process_folder(&config, CameraKind::ShortThrow).unwrap();
        let second = std::fs::read(&output).unwrap();
        assert_eq!(first, second);
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_existing_output_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let config = flat_workspace(dir.path());

        process_folder(&config, CameraKind::ShortThrow).unwrap();
        let output = dir.path().join("short_throw_depth/1000.obj");
        std::fs::write(&output, "# OBJ file\nv 9.0 9.0 9.0\n").unwrap();

        process_folder(&config, CameraKind::ShortThrow).unwrap();
        let kept = obj::read_obj(&output).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept.points()[0], [9.0, 9.0, 9.0]);

        let overwrite = ProcessConfig {
            overwrite: true,
            ..config
        };
        process_folder(&overwrite, CameraKind::ShortThrow).unwrap();
        let rewritten = obj::read_obj(&output).unwrap();
        assert_eq!(rewritten.len(), 4);
    }

    #[test]
    fn test_output_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProcessConfig {
            output_suffix: "cam".to_string(),
            ..flat_workspace(dir.path())
        };

        process_folder(&config, CameraKind::ShortThrow).unwrap();
        assert!(dir.path().join("short_throw_depth/1000_cam.obj").exists());
    }

    #[test]
    fn test_world_transform_applied() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = flat_workspace(dir.path());
        config.use_poses = true;

        // world-to-camera translates by (0, 0, 1), so camera-to-world
        // shifts the cloud by -1 along z
        std::fs::write(
            dir.path().join("short_throw_depth.csv"),
            "timestamp,m00,m01,m02,m03,m10,m11,m12,m13,m20,m21,m22,m23,m30,m31,m32,m33\n\
             1000,1,0,0,0,0,1,0,0,0,0,1,1,0,0,0,1\n",
        )
        .unwrap();

        let merged = process_folder(&config, CameraKind::ShortThrow).unwrap();
        assert_eq!(merged.len(), 4);
        for point in merged.points() {
            assert_relative_eq!(point[2], -2.5, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_missing_pose_policies() {
        for (policy, expect_points, expect_file) in [
            (MissingPosePolicy::Identity, 4usize, true),
            (MissingPosePolicy::Skip, 0usize, false),
        ] {
            let dir = tempfile::tempdir().unwrap();
            let mut config = flat_workspace(dir.path());
            config.use_poses = true;
            config.missing_pose = policy;

            // pose table without an entry for frame 1000
            std::fs::write(dir.path().join("short_throw_depth.csv"), "\n").unwrap();

            let merged = process_folder(&config, CameraKind::ShortThrow).unwrap();
            assert_eq!(merged.len(), expect_points);
            assert_eq!(
                dir.path().join("short_throw_depth/1000.obj").exists(),
                expect_file
            );
        }

        let dir = tempfile::tempdir().unwrap();
        let mut config = flat_workspace(dir.path());
        config.use_poses = true;
        config.missing_pose = MissingPosePolicy::Fail;
        std::fs::write(dir.path().join("short_throw_depth.csv"), "\n").unwrap();

        assert!(matches!(
            process_folder(&config, CameraKind::ShortThrow),
            Err(ProcessError::MissingPose(_))
        ));
    }

    #[test]
    fn test_singular_pose_skips_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = flat_workspace(dir.path());
        config.use_poses = true;

        std::fs::write(
            dir.path().join("short_throw_depth.csv"),
            "1000,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0\n",
        )
        .unwrap();

        let merged = process_folder(&config, CameraKind::ShortThrow).unwrap();
        assert!(merged.is_empty());
        assert!(!dir.path().join("short_throw_depth/1000.obj").exists());
    }

    #[test]
    fn test_dimension_mismatch_across_frames() {
        let dir = tempfile::tempdir().unwrap();
        let config = flat_workspace(dir.path());
        write_sensor_pgm(
            &dir.path().join("short_throw_depth/2000.pgm"),
            3,
            1,
            &[1500; 3],
        );

        let result = process_folder(&config, CameraKind::ShortThrow);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_camera_folder() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProcessConfig {
            workspace_path: dir.path().to_path_buf(),
            cameras: vec![CameraKind::LongThrow],
            use_poses: false,
            ..ProcessConfig::default()
        };

        assert!(matches!(
            process_folder(&config, CameraKind::LongThrow),
            Err(ProcessError::Config(ConfigError::CameraFolderMissing(_)))
        ));
    }

    #[test]
    fn test_frame_window() {
        let frames: Vec<PathBuf> = ["a", "b", "c", "d", "e"]
            .into_iter()
            .map(PathBuf::from)
            .collect();

        let all = frame_window(frames.clone(), 0, -1);
        assert_eq!(all.len(), 5);

        let middle = frame_window(frames.clone(), 1, 2);
        assert_eq!(middle, vec![PathBuf::from("b"), PathBuf::from("c")]);

        let tail = frame_window(frames.clone(), 3, 5);
        assert_eq!(tail, vec![PathBuf::from("d"), PathBuf::from("e")]);

        let past_end = frame_window(frames, 9, -1);
        assert!(past_end.is_empty());
    }

    #[test]
    fn test_frame_window_applied_to_folder() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = flat_workspace(dir.path());
        for stem in ["2000", "3000"] {
            write_sensor_pgm(
                &dir.path().join(format!("short_throw_depth/{}.pgm", stem)),
                2,
                2,
                &[1500; 4],
            );
        }
        config.start_frame = 1;
        config.max_num_frames = 1;

        process_folder(&config, CameraKind::ShortThrow).unwrap();
        assert!(!dir.path().join("short_throw_depth/1000.obj").exists());
        assert!(dir.path().join("short_throw_depth/2000.obj").exists());
        assert!(!dir.path().join("short_throw_depth/3000.obj").exists());
    }
}
