//! Rehab motion tracker.
//!
//! Captures live camera frames, runs an external hand/pose landmark detector,
//! derives simple geometric features (pixel coordinates, centimeter distances,
//! joint angles), and persists the latest reading plus an append-only history
//! as JSON for an out-of-band consumer process.
//!
//! # Module Structure
//!
//! - `camera`: frame sources (real devices, synthetic stubs) with
//!   index/backend auto-discovery
//! - `detect`: black-box landmark detector boundary and backends
//! - `features`: pure geometry (normalized -> pixel, distances, angles)
//! - `smooth`: majority-vote label smoothing
//! - `exercise`: per-frame record assembly (hand / arm)
//! - `record`: serialized payload schema
//! - `snapshot`: crash-safe latest-snapshot and append-only log writer
//! - `producer`: the single-threaded per-frame loop that owns everything

use anyhow::Result;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod camera;
pub mod config;
pub mod detect;
pub mod exercise;
pub mod features;
pub mod frame;
pub mod producer;
pub mod record;
pub mod smooth;
pub mod snapshot;

pub use camera::{open_auto, CaptureBackend, FrameSource, OpenedCamera};
pub use config::TrackerConfig;
pub use detect::{Landmark, LandmarkBackend, StubLandmarkBackend, SubjectLandmarks};
pub use exercise::Exercise;
pub use features::PixelPoint;
pub use frame::RgbFrame;
pub use producer::ProducerLoop;
pub use record::{LogRecord, SnapshotPayload, SubjectRecord};
pub use smooth::LabelSmoother;
pub use snapshot::{SnapshotWriter, WriteStrategy};

/// Seconds since the Unix epoch, as a float (payload timestamps).
pub fn now_epoch_s_f64() -> Result<f64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs_f64())
}
