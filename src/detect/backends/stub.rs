use anyhow::{anyhow, Result};
use std::collections::VecDeque;

use crate::detect::backend::LandmarkBackend;
use crate::detect::result::SubjectLandmarks;
use crate::frame::RgbFrame;

/// Stub backend for testing and camera-less runs.
///
/// Replays a script of per-frame subject lists, or repeats a fixed list
/// forever. A scripted stub that runs out of frames reports zero subjects,
/// mimicking a subject leaving the camera view.
pub struct StubLandmarkBackend {
    mode: Mode,
}

enum Mode {
    Fixed(Vec<SubjectLandmarks>),
    Scripted(VecDeque<Vec<SubjectLandmarks>>),
    Failing {
        subjects: Vec<SubjectLandmarks>,
        fail_on: u64,
        calls: u64,
    },
}

impl StubLandmarkBackend {
    /// Reports zero subjects on every frame.
    pub fn empty() -> Self {
        Self {
            mode: Mode::Fixed(Vec::new()),
        }
    }

    /// Reports the same subjects on every frame.
    pub fn fixed(subjects: Vec<SubjectLandmarks>) -> Self {
        Self {
            mode: Mode::Fixed(subjects),
        }
    }

    /// Replays one subject list per frame, then zero subjects.
    pub fn scripted(frames: Vec<Vec<SubjectLandmarks>>) -> Self {
        Self {
            mode: Mode::Scripted(frames.into()),
        }
    }

    /// Reports `subjects` on every frame except call number `fail_on`
    /// (1-based), which returns an error.
    pub fn failing_on(fail_on: u64, subjects: Vec<SubjectLandmarks>) -> Self {
        Self {
            mode: Mode::Failing {
                subjects,
                fail_on,
                calls: 0,
            },
        }
    }
}

impl LandmarkBackend for StubLandmarkBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _frame: &RgbFrame) -> Result<Vec<SubjectLandmarks>> {
        match &mut self.mode {
            Mode::Fixed(subjects) => Ok(subjects.clone()),
            Mode::Scripted(frames) => Ok(frames.pop_front().unwrap_or_default()),
            Mode::Failing {
                subjects,
                fail_on,
                calls,
            } => {
                *calls += 1;
                if *calls == *fail_on {
                    Err(anyhow!("stub detector failure on call {}", calls))
                } else {
                    Ok(subjects.clone())
                }
            }
        }
    }
}
