//! Per-frame record assembly for the supported exercises.
//!
//! The detector is a black box emitting an indexed landmark list per
//! subject; the index tables below follow the MediaPipe hand and pose
//! topologies. Assembly converts one `SubjectLandmarks` into one
//! `SubjectRecord`, or `None` when the subject is unusable (missing or
//! malformed landmarks) - a skipped subject, never a panic.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::detect::SubjectLandmarks;
use crate::features::{distance_cm, to_pixel, vertex_angle, PixelPoint};
use crate::record::{PointRecord, SubjectRecord};
use crate::smooth::LabelSmoother;

/// Hand landmark indices (21-point topology).
mod hand {
    pub const WRIST: usize = 0;
    pub const FINGERTIPS: [(&str, usize); 5] = [
        ("thumb", 4),
        ("index", 8),
        ("middle", 12),
        ("ring", 16),
        ("pinky", 20),
    ];
}

/// Pose landmark indices (33-point topology), per side.
mod pose {
    pub const LEFT: ArmIndices = ArmIndices {
        shoulder: 11,
        elbow: 13,
        wrist: 15,
        hip: 23,
    };
    pub const RIGHT: ArmIndices = ArmIndices {
        shoulder: 12,
        elbow: 14,
        wrist: 16,
        hip: 24,
    };

    pub struct ArmIndices {
        pub shoulder: usize,
        pub elbow: usize,
        pub wrist: usize,
        pub hip: usize,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl FromStr for Side {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "left" => Ok(Side::Left),
            "right" => Ok(Side::Right),
            other => Err(anyhow!("unknown side: {} (expected left|right)", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exercise {
    /// Wrist plus five fingertips, wrist-to-tip distances, smoothed
    /// Left/Right hand label.
    Hand,
    /// Shoulder/elbow/wrist/hip points with shoulder and elbow angles.
    Arm,
}

impl Exercise {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exercise::Hand => "hand",
            Exercise::Arm => "arm",
        }
    }

    /// Assemble the record for one detected subject.
    pub fn assemble(
        &self,
        slot: usize,
        subject: &SubjectLandmarks,
        width: u32,
        height: u32,
        px_per_cm: f64,
        side: Side,
        smoother: &mut LabelSmoother,
    ) -> Option<SubjectRecord> {
        match self {
            Exercise::Hand => hand_subject(slot, subject, width, height, px_per_cm, smoother),
            Exercise::Arm => arm_subject(slot, subject, width, height, side),
        }
    }
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Exercise {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hand" => Ok(Exercise::Hand),
            "arm" => Ok(Exercise::Arm),
            other => Err(anyhow!("unknown exercise: {} (expected hand|arm)", other)),
        }
    }
}

fn point_record(point: PixelPoint, visibility: f32) -> PointRecord {
    PointRecord {
        x: point.x,
        y: point.y,
        visibility,
    }
}

fn hand_subject(
    slot: usize,
    subject: &SubjectLandmarks,
    width: u32,
    height: u32,
    px_per_cm: f64,
    smoother: &mut LabelSmoother,
) -> Option<SubjectRecord> {
    let wrist_lm = subject.get(hand::WRIST)?;
    let wrist = to_pixel(wrist_lm, width, height)?;

    // Screen-side label from the mean landmark x against the frame midline.
    let pixels: Vec<PixelPoint> = subject
        .landmarks
        .iter()
        .filter_map(|lm| to_pixel(lm, width, height))
        .collect();
    if pixels.is_empty() {
        return None;
    }
    let mean_x = pixels.iter().map(|p| f64::from(p.x)).sum::<f64>() / pixels.len() as f64;
    let raw_label = if mean_x < f64::from(width) / 2.0 {
        "Left"
    } else {
        "Right"
    };
    let label = smoother.observe(slot, raw_label);

    let mut points = BTreeMap::new();
    let mut distances = BTreeMap::new();
    points.insert("wrist".to_string(), point_record(wrist, wrist_lm.visibility));
    for (name, index) in hand::FINGERTIPS {
        let Some(tip_lm) = subject.get(index) else {
            continue;
        };
        let Some(tip) = to_pixel(tip_lm, width, height) else {
            continue;
        };
        points.insert(name.to_string(), point_record(tip, tip_lm.visibility));
        distances.insert(name.to_string(), distance_cm(wrist, tip, px_per_cm));
    }

    Some(SubjectRecord {
        slot,
        label: Some(label),
        points,
        distances_cm: distances,
        angles_deg: BTreeMap::new(),
    })
}

fn arm_subject(
    slot: usize,
    subject: &SubjectLandmarks,
    width: u32,
    height: u32,
    side: Side,
) -> Option<SubjectRecord> {
    let indices = match side {
        Side::Left => pose::LEFT,
        Side::Right => pose::RIGHT,
    };

    let joints = [
        ("shoulder", indices.shoulder),
        ("elbow", indices.elbow),
        ("wrist", indices.wrist),
        ("hip", indices.hip),
    ];
    let mut points = BTreeMap::new();
    let mut pixels = [PixelPoint { x: 0, y: 0 }; 4];
    for (i, (name, index)) in joints.iter().enumerate() {
        let lm = subject.get(*index)?;
        let point = to_pixel(lm, width, height)?;
        pixels[i] = point;
        points.insert((*name).to_string(), point_record(point, lm.visibility));
    }
    let [shoulder, elbow, wrist, hip] = pixels;

    let mut angles = BTreeMap::new();
    angles.insert(
        "shoulder".to_string(),
        vertex_angle(elbow, shoulder, hip),
    );
    angles.insert("elbow".to_string(), vertex_angle(shoulder, elbow, wrist));

    Some(SubjectRecord {
        slot,
        label: None,
        points,
        distances_cm: BTreeMap::new(),
        angles_deg: angles,
    })
}
