//! Serialized payload schema.
//!
//! `SnapshotPayload` is the wholesale record for one frame: written to the
//! latest-snapshot file every frame and appended (wrapped in `LogRecord`,
//! which adds a wall-clock string) to the JSON Lines history. Records are
//! created fresh per frame and never mutated after assembly.
//!
//! Degenerate measurements serialize as `null`, distinct from zero: a
//! consumer must be able to tell "no angle exists" from "angle is 0".

use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageSize {
    pub w: u32,
    pub h: u32,
}

/// A landmark in pixel space with the detector's visibility score.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PointRecord {
    pub x: i32,
    pub y: i32,
    pub visibility: f32,
}

/// Derived measurements for one detected subject in one frame.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SubjectRecord {
    pub slot: usize,
    /// Smoothed categorical label (hand identity); absent for exercises
    /// that do not label subjects.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub label: Option<String>,
    pub points: BTreeMap<String, PointRecord>,
    pub distances_cm: BTreeMap<String, Option<f64>>,
    pub angles_deg: BTreeMap<String, Option<f64>>,
}

/// The full record for one frame. Written wholesale, no partial updates.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SnapshotPayload {
    /// Unix epoch seconds.
    pub timestamp: f64,
    pub exercise: String,
    pub side: String,
    pub image_size: ImageSize,
    /// Empty when nothing was detected; an empty list is still written so
    /// the consumer's notion of "latest" stays fresh.
    pub subjects: Vec<SubjectRecord>,
}

/// One append-only log line: the payload plus a local-time string.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    pub local_time: String,
    #[serde(flatten)]
    pub payload: SnapshotPayload,
}

impl LogRecord {
    pub fn new(payload: SnapshotPayload) -> Self {
        Self {
            local_time: Local::now().to_rfc3339_opts(SecondsFormat::Millis, false),
            payload,
        }
    }
}
