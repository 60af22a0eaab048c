//! Daemon configuration.
//!
//! Settings come from an optional JSON config file (path given on the
//! command line or via `TRACKER_CONFIG`), overridden by `TRACKER_*`
//! environment variables, with compiled-in defaults underneath. The merged
//! result is validated once before the daemon starts.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::camera::CameraSettings;
use crate::exercise::{Exercise, Side};
use crate::snapshot::WriteStrategy;

const DEFAULT_FPS_LIMIT: u32 = 30;
const DEFAULT_EXERCISE: Exercise = Exercise::Arm;
const DEFAULT_SIDE: Side = Side::Right;
const DEFAULT_SMOOTHING_WINDOW: usize = 5;
/// Uncalibrated pixel-to-centimeter approximation carried over from the
/// measurement setup; adjust per camera/monitor, never auto-derived.
const DEFAULT_PX_PER_CM: f64 = 37.8;
const DEFAULT_OUTPUT_DIR: &str = "./outputs";
const DEFAULT_LATEST_FILENAME: &str = "latest.json";
const DEFAULT_LOG_FILENAME: &str = "log.jsonl";

#[derive(Debug, Deserialize, Default)]
struct TrackerConfigFile {
    camera: Option<CameraConfigFile>,
    exercise: Option<ExerciseConfigFile>,
    calibration: Option<CalibrationConfigFile>,
    output: Option<OutputConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    preferred_index: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
    fps_limit: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct ExerciseConfigFile {
    kind: Option<String>,
    side: Option<String>,
    smoothing_window: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct CalibrationConfigFile {
    px_per_cm: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct OutputConfigFile {
    dir: Option<PathBuf>,
    latest_filename: Option<String>,
    log_filename: Option<String>,
    strategy: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TrackerConfig {
    pub camera: CameraSettings,
    /// Soft frame-rate cap; 0 disables padding.
    pub fps_limit: u32,
    pub exercise: Exercise,
    pub side: Side,
    pub smoothing_window: usize,
    pub px_per_cm: f64,
    pub output: OutputSettings,
}

#[derive(Clone, Debug)]
pub struct OutputSettings {
    pub dir: PathBuf,
    pub latest_filename: String,
    pub log_filename: String,
    pub strategy: WriteStrategy,
}

impl OutputSettings {
    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(&self.latest_filename)
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.join(&self.log_filename)
    }
}

impl TrackerConfig {
    /// Load configuration: file (explicit path, else `TRACKER_CONFIG`),
    /// then env overrides, then validation.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var("TRACKER_CONFIG").ok().map(PathBuf::from);
        let path = config_path.map(Path::to_path_buf).or(env_path);
        let file_cfg = match path.as_deref() {
            Some(path) => Some(read_config_file(path)?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: TrackerConfigFile) -> Result<Self> {
        // Camera defaults live on `CameraSettings::default()`.
        let base = CameraSettings::default();
        let camera = CameraSettings {
            device: file
                .camera
                .as_ref()
                .and_then(|camera| camera.device.clone())
                .unwrap_or(base.device),
            preferred_index: file
                .camera
                .as_ref()
                .and_then(|camera| camera.preferred_index)
                .unwrap_or(base.preferred_index),
            width: file
                .camera
                .as_ref()
                .and_then(|camera| camera.width)
                .unwrap_or(base.width),
            height: file
                .camera
                .as_ref()
                .and_then(|camera| camera.height)
                .unwrap_or(base.height),
        };
        let fps_limit = file
            .camera
            .as_ref()
            .and_then(|camera| camera.fps_limit)
            .unwrap_or(DEFAULT_FPS_LIMIT);
        let exercise = file
            .exercise
            .as_ref()
            .and_then(|exercise| exercise.kind.as_deref())
            .map(str::parse)
            .transpose()?
            .unwrap_or(DEFAULT_EXERCISE);
        let side = file
            .exercise
            .as_ref()
            .and_then(|exercise| exercise.side.as_deref())
            .map(str::parse)
            .transpose()?
            .unwrap_or(DEFAULT_SIDE);
        let smoothing_window = file
            .exercise
            .and_then(|exercise| exercise.smoothing_window)
            .unwrap_or(DEFAULT_SMOOTHING_WINDOW);
        let px_per_cm = file
            .calibration
            .and_then(|calibration| calibration.px_per_cm)
            .unwrap_or(DEFAULT_PX_PER_CM);
        let output = OutputSettings {
            dir: file
                .output
                .as_ref()
                .and_then(|output| output.dir.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            latest_filename: file
                .output
                .as_ref()
                .and_then(|output| output.latest_filename.clone())
                .unwrap_or_else(|| DEFAULT_LATEST_FILENAME.to_string()),
            log_filename: file
                .output
                .as_ref()
                .and_then(|output| output.log_filename.clone())
                .unwrap_or_else(|| DEFAULT_LOG_FILENAME.to_string()),
            strategy: file
                .output
                .and_then(|output| output.strategy)
                .as_deref()
                .map(str::parse)
                .transpose()?
                .unwrap_or_else(WriteStrategy::platform_default),
        };
        Ok(Self {
            camera,
            fps_limit,
            exercise,
            side,
            smoothing_window,
            px_per_cm,
            output,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(device) = std::env::var("TRACKER_DEVICE") {
            if !device.trim().is_empty() {
                self.camera.device = device;
            }
        }
        if let Ok(index) = std::env::var("TRACKER_CAMERA_INDEX") {
            self.camera.preferred_index = index
                .parse()
                .map_err(|_| anyhow!("TRACKER_CAMERA_INDEX must be an integer"))?;
        }
        if let Ok(fps) = std::env::var("TRACKER_FPS_LIMIT") {
            self.fps_limit = fps
                .parse()
                .map_err(|_| anyhow!("TRACKER_FPS_LIMIT must be an integer"))?;
        }
        if let Ok(exercise) = std::env::var("TRACKER_EXERCISE") {
            if !exercise.trim().is_empty() {
                self.exercise = exercise.parse()?;
            }
        }
        if let Ok(side) = std::env::var("TRACKER_SIDE") {
            if !side.trim().is_empty() {
                self.side = side.parse()?;
            }
        }
        if let Ok(dir) = std::env::var("TRACKER_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output.dir = PathBuf::from(dir);
            }
        }
        if let Ok(px_per_cm) = std::env::var("TRACKER_PX_PER_CM") {
            self.px_per_cm = px_per_cm
                .parse()
                .map_err(|_| anyhow!("TRACKER_PX_PER_CM must be a number"))?;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera resolution must be nonzero"));
        }
        if self.smoothing_window == 0 {
            return Err(anyhow!("smoothing window must be at least 1"));
        }
        if !self.px_per_cm.is_finite() || self.px_per_cm <= 0.0 {
            return Err(anyhow!("px_per_cm must be a positive finite number"));
        }
        if self.output.latest_filename.trim().is_empty()
            || self.output.log_filename.trim().is_empty()
        {
            return Err(anyhow!("output filenames must not be empty"));
        }
        Ok(())
    }
}

fn read_config_file(path: &Path) -> Result<TrackerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}
