#![cfg(feature = "camera-nokhwa")]

//! Real capture devices via nokhwa.

use anyhow::{anyhow, Result};
use nokhwa::{
    pixel_format::RgbFormat,
    utils::{
        ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
        Resolution,
    },
    Camera,
};

use crate::camera::{CaptureBackend, FrameSource};
use crate::frame::RgbFrame;

pub struct NokhwaCamera {
    camera: Camera,
}

impl NokhwaCamera {
    /// Open one device candidate and start its stream.
    ///
    /// Requested formats are tried in preference order: the configured
    /// resolution first, then whatever the driver offers. Some drivers
    /// reject the exact-resolution request while accepting a looser one.
    pub fn open(index: u32, backend: CaptureBackend, width: u32, height: u32) -> Result<Self> {
        let api = match backend {
            CaptureBackend::Auto => ApiBackend::Auto,
            CaptureBackend::V4l2 => ApiBackend::Video4Linux,
            CaptureBackend::MediaFoundation => ApiBackend::MediaFoundation,
            CaptureBackend::AvFoundation => ApiBackend::AVFoundation,
            CaptureBackend::Stub => {
                return Err(anyhow!("stub backend is not a nokhwa device"));
            }
        };

        let requested = [
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
                Resolution::new(width, height),
                FrameFormat::MJPEG,
                30,
            ))),
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
            RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
        ];

        let mut last_err = None;
        for format in requested {
            match Camera::with_backend(CameraIndex::Index(index), format, api) {
                Ok(mut camera) => match camera.open_stream() {
                    Ok(()) => return Ok(Self { camera }),
                    Err(e) => last_err = Some(e.into()),
                },
                Err(e) => last_err = Some(e.into()),
            }
        }
        Err(last_err
            .unwrap_or_else(|| anyhow!("failed to open camera index {} with any format", index)))
    }
}

impl FrameSource for NokhwaCamera {
    fn name(&self) -> &'static str {
        "nokhwa"
    }

    fn read_frame(&mut self) -> Result<Option<RgbFrame>> {
        let buffer = self.camera.frame()?;
        let decoded = buffer.decode_image::<RgbFormat>()?;
        let (width, height) = (decoded.width(), decoded.height());
        let frame = RgbFrame::new(decoded.into_raw(), width, height)?;
        Ok(Some(frame))
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        if let Err(e) = self.camera.stop_stream() {
            log::debug!("camera stream stop failed on release: {}", e);
        }
    }
}
