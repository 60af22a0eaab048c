//! trackerd - rehab motion tracker daemon
//!
//! This daemon:
//! 1. Opens a camera with index/backend auto-discovery and fallback
//! 2. Runs the configured landmark detector once per frame
//! 3. Derives pixel coordinates, centimeter distances, and joint angles
//! 4. Writes the latest snapshot and the append-only log for the consumer
//!
//! Stops on Ctrl-C after the in-flight frame's writes complete.

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rehab_tracker::{
    open_auto, LandmarkBackend, ProducerLoop, SnapshotWriter, StubLandmarkBackend, TrackerConfig,
};

#[derive(Parser, Debug)]
#[command(name = "trackerd", about = "Rehab motion tracker daemon")]
struct Args {
    /// JSON config file.
    #[arg(long, env = "TRACKER_CONFIG")]
    config: Option<PathBuf>,

    /// Camera device, "auto" or a stub:// URI.
    #[arg(long)]
    device: Option<String>,

    /// Camera index probed first.
    #[arg(long)]
    camera_index: Option<u32>,

    /// Exercise to track: hand or arm.
    #[arg(long)]
    exercise: Option<String>,

    /// Tracked side: left or right.
    #[arg(long)]
    side: Option<String>,

    /// Directory for latest.json / log.jsonl.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Soft FPS cap (0 disables).
    #[arg(long)]
    fps_limit: Option<u32>,

    /// ONNX landmark model path (requires the backend-tract feature).
    #[arg(long, env = "TRACKER_MODEL")]
    model: Option<PathBuf>,

    /// Presence score below which the model reports no subject.
    #[arg(long)]
    presence_threshold: Option<f32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = TrackerConfig::load(args.config.as_deref())?;
    if let Some(device) = args.device {
        cfg.camera.device = device;
    }
    if let Some(index) = args.camera_index {
        cfg.camera.preferred_index = index;
    }
    if let Some(exercise) = args.exercise {
        cfg.exercise = exercise.parse()?;
    }
    if let Some(side) = args.side {
        cfg.side = side.parse()?;
    }
    if let Some(dir) = args.output_dir {
        cfg.output.dir = dir;
    }
    if let Some(fps) = args.fps_limit {
        cfg.fps_limit = fps;
    }

    log::info!(
        "trackerd {} starting: exercise={} side={} output={}",
        env!("CARGO_PKG_VERSION"),
        cfg.exercise,
        cfg.side.as_str(),
        cfg.output.dir.display()
    );

    // The only startup-fatal condition: no camera candidate succeeds.
    let opened = open_auto(&cfg.camera)?;

    let mut detector = build_detector(args.model.as_deref(), args.presence_threshold, &cfg)?;
    detector.warm_up()?;

    let writer = SnapshotWriter::new(
        cfg.output.latest_path(),
        cfg.output.log_path(),
        cfg.output.strategy,
    );
    log::info!(
        "writing latest={} log={} strategy={:?}",
        cfg.output.latest_path().display(),
        cfg.output.log_path().display(),
        cfg.output.strategy
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })
    .map_err(|e| anyhow!("failed to install Ctrl-C handler: {}", e))?;

    let mut producer = ProducerLoop::new(opened.source, detector, writer, &cfg);
    producer.run(&shutdown)?;

    // Camera and detector release on drop, on every exit path.
    Ok(())
}

fn build_detector(
    model: Option<&std::path::Path>,
    _presence_threshold: Option<f32>,
    _cfg: &TrackerConfig,
) -> Result<Box<dyn LandmarkBackend>> {
    match model {
        None => {
            log::warn!("no landmark model configured, using the stub detector");
            Ok(Box::new(StubLandmarkBackend::empty()))
        }
        #[cfg(feature = "backend-tract")]
        Some(path) => {
            use rehab_tracker::exercise::Exercise;
            let landmark_count = match _cfg.exercise {
                Exercise::Hand => 21,
                Exercise::Arm => 33,
            };
            let mut backend = rehab_tracker::detect::TractLandmarkBackend::new(
                path,
                _cfg.camera.width,
                _cfg.camera.height,
                landmark_count,
            )?;
            if let Some(threshold) = _presence_threshold {
                backend = backend.with_presence_threshold(threshold);
            }
            Ok(Box::new(backend))
        }
        #[cfg(not(feature = "backend-tract"))]
        Some(_) => Err(anyhow!(
            "a model path was given but this build lacks the backend-tract feature"
        )),
    }
}
