use anyhow::Result;

use crate::detect::result::SubjectLandmarks;
use crate::frame::RgbFrame;

/// Landmark detector backend trait.
///
/// Implementations wrap an external model. They receive the mirrored RGB
/// frame read-only and return zero or more detected subjects, each a list
/// of normalized landmarks. Zero subjects is a normal result, not an error;
/// backends reserve `Err` for infrastructure failures (bad tensor shapes,
/// model runtime errors).
pub trait LandmarkBackend {
    /// Backend identifier for logs.
    fn name(&self) -> &'static str;

    /// Run detection on one frame.
    fn detect(&mut self, frame: &RgbFrame) -> Result<Vec<SubjectLandmarks>>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
