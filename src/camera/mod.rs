//! Camera frame sources.
//!
//! Sources produce `RgbFrame` instances for the producer loop:
//! - Real capture devices via `nokhwa` (feature: `camera-nokhwa`)
//! - Stub source (`stub://`, testing and camera-less development)
//!
//! Device discovery walks an ordered backend x index candidate list, opens
//! each candidate, and keeps the first one that yields a readable frame
//! with nonzero dimensions. Exhausting every candidate is the one fatal
//! startup condition of the whole system.

#[cfg(feature = "camera-nokhwa")]
mod nokhwa;
mod stub;

#[cfg(feature = "camera-nokhwa")]
pub use self::nokhwa::NokhwaCamera;
pub use stub::StubCamera;

use anyhow::{anyhow, Result};
use std::fmt;

use crate::frame::RgbFrame;

/// A stream of frames from one opened capture device.
///
/// `Ok(None)` means the stream ended (finite stub scripts); `Err` means the
/// device failed to deliver a frame. Both terminate the producer loop
/// gracefully. Devices are released on drop.
pub trait FrameSource {
    fn name(&self) -> &'static str;

    fn read_frame(&mut self) -> Result<Option<RgbFrame>>;
}

/// Capture backend candidates, in probe order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureBackend {
    Auto,
    V4l2,
    MediaFoundation,
    AvFoundation,
    Stub,
}

impl CaptureBackend {
    /// Platform probe order: the portable auto backend first, then the
    /// native backend for the target OS.
    pub fn candidates() -> Vec<CaptureBackend> {
        let mut order = vec![CaptureBackend::Auto];
        if cfg!(target_os = "linux") {
            order.push(CaptureBackend::V4l2);
        }
        if cfg!(target_os = "windows") {
            order.push(CaptureBackend::MediaFoundation);
        }
        if cfg!(target_os = "macos") {
            order.push(CaptureBackend::AvFoundation);
        }
        order
    }
}

impl fmt::Display for CaptureBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CaptureBackend::Auto => "auto",
            CaptureBackend::V4l2 => "v4l2",
            CaptureBackend::MediaFoundation => "media-foundation",
            CaptureBackend::AvFoundation => "av-foundation",
            CaptureBackend::Stub => "stub",
        };
        f.write_str(name)
    }
}

/// Settings for camera discovery.
#[derive(Clone, Debug)]
pub struct CameraSettings {
    /// `"auto"` for real devices, or a `stub://` URI for synthetic frames.
    pub device: String,
    /// Index probed first; the fallback list covers 0..=4 regardless.
    pub preferred_index: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device: "auto".to_string(),
            preferred_index: 0,
            width: 1280,
            height: 720,
        }
    }
}

/// A successfully opened camera plus the candidate that won.
pub struct OpenedCamera {
    pub source: Box<dyn FrameSource>,
    pub index: u32,
    pub backend: CaptureBackend,
}

/// Preferred index first, then 0..=4, deduplicated.
fn index_order(preferred: u32) -> Vec<u32> {
    let mut order = Vec::new();
    for candidate in std::iter::once(preferred).chain(0..=4) {
        if !order.contains(&candidate) {
            order.push(candidate);
        }
    }
    order
}

/// Open the first camera candidate that produces a readable frame.
///
/// Every candidate gets one trial read; a device that opens but cannot
/// deliver a nonzero-dimension frame is rejected and released. The trial
/// frame is discarded.
pub fn open_auto(settings: &CameraSettings) -> Result<OpenedCamera> {
    let indices = index_order(settings.preferred_index);

    if settings.device.starts_with("stub://") {
        for &index in &indices {
            match try_candidate(
                StubCamera::open(&settings.device, index, settings.width, settings.height),
                CaptureBackend::Stub,
                index,
            ) {
                Some(opened) => return Ok(opened),
                None => continue,
            }
        }
        return Err(anyhow!(
            "no stub camera candidate succeeded for {} (indices {:?})",
            settings.device,
            indices
        ));
    }

    #[cfg(feature = "camera-nokhwa")]
    {
        for backend in CaptureBackend::candidates() {
            for &index in &indices {
                match try_candidate(
                    NokhwaCamera::open(index, backend, settings.width, settings.height),
                    backend,
                    index,
                ) {
                    Some(opened) => return Ok(opened),
                    None => continue,
                }
            }
        }
        Err(anyhow!(
            "no camera could be opened (tried backends {:?} x indices {:?}); \
             check device permissions and that no other app holds the camera",
            CaptureBackend::candidates(),
            indices
        ))
    }

    #[cfg(not(feature = "camera-nokhwa"))]
    Err(anyhow!(
        "device capture requires the camera-nokhwa feature; \
         only stub:// sources are available in this build"
    ))
}

fn try_candidate<S: FrameSource + 'static>(
    opened: Result<S>,
    backend: CaptureBackend,
    index: u32,
) -> Option<OpenedCamera> {
    let mut source = match opened {
        Ok(source) => source,
        Err(e) => {
            log::debug!("camera candidate index={} backend={}: {}", index, backend, e);
            return None;
        }
    };
    match source.read_frame() {
        Ok(Some(frame)) if frame.width > 0 && frame.height > 0 => {
            log::info!(
                "camera opened: index={} backend={} size={}x{}",
                index,
                backend,
                frame.width,
                frame.height
            );
            Some(OpenedCamera {
                source: Box::new(source),
                index,
                backend,
            })
        }
        Ok(_) => {
            log::debug!(
                "camera candidate index={} backend={}: no trial frame",
                index,
                backend
            );
            None
        }
        Err(e) => {
            log::debug!(
                "camera candidate index={} backend={}: trial read failed: {}",
                index,
                backend,
                e
            );
            None
        }
    }
}
