use std::path::PathBuf;

use argh::FromArgs;

use depthcloud::config::{CameraKind, MissingPosePolicy, ProcessConfig};
use depthcloud::io::obj::write_obj;
use depthcloud::processor::process_folder;

#[derive(FromArgs)]
/// Convert short-throw / long-throw depth recordings into 3D point clouds.
struct Args {
    /// path to the workspace folder used for recording
    #[argh(option)]
    workspace_path: PathBuf,

    /// folder where point clouds are saved, defaults to the workspace
    #[argh(option)]
    output_path: Option<PathBuf>,

    /// save per-frame clouds as [tstamp]_[suffix].obj
    #[argh(option, default = "String::new()")]
    output_suffix: String,

    /// extract point clouds from the short-throw frames
    #[argh(switch)]
    short_throw: bool,

    /// extract point clouds from the long-throw frames
    #[argh(switch)]
    long_throw: bool,

    /// drop sensor poses, leaving each cloud in its camera frame
    #[argh(switch)]
    ignore_sensor_poses: bool,

    /// fallback when a frame has no pose entry: identity, skip or fail
    #[argh(option, default = "MissingPosePolicy::Identity")]
    missing_pose: MissingPosePolicy,

    /// index of the first frame to process
    #[argh(option, default = "0")]
    start_frame: usize,

    /// number of frames to process, -1 for all remaining
    #[argh(option, default = "-1")]
    max_num_frames: i64,

    /// save one merged file per camera with all the points
    #[argh(switch)]
    merge_points: bool,

    /// load already existing output files instead of recomputing
    #[argh(switch)]
    use_cache: bool,

    /// write output files even when they already exist
    #[argh(switch)]
    overwrite: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut cameras = Vec::new();
    if args.short_throw {
        cameras.push(CameraKind::ShortThrow);
    }
    if args.long_throw {
        cameras.push(CameraKind::LongThrow);
    }

    let config = ProcessConfig {
        workspace_path: args.workspace_path,
        output_path: args.output_path,
        output_suffix: args.output_suffix,
        cameras,
        use_poses: !args.ignore_sensor_poses,
        missing_pose: args.missing_pose,
        start_frame: args.start_frame,
        max_num_frames: args.max_num_frames,
        merge_points: args.merge_points,
        use_cache: args.use_cache,
        overwrite: args.overwrite,
    };
    config.validate()?;

    for camera in &config.cameras {
        log::info!("processing '{}' depth folder", camera.folder_name());
        let merged = process_folder(&config, *camera)?;

        if config.merge_points {
            let merged_path = config
                .output_root()
                .join(format!("{}.obj", camera.folder_name()));
            log::info!(
                "saving merged cloud with {} points to {}",
                merged.len(),
                merged_path.display()
            );
            if !merged.is_empty() {
                log::debug!(
                    "merged bounds: {} .. {}",
                    merged.get_min_bound(),
                    merged.get_max_bound()
                );
            }
            write_obj(&merged_path, &merged)?;
        }
    }

    log::info!("done");
    Ok(())
}
