//! Synthetic stub camera.
//!
//! Generates deterministic gradient frames without touching real hardware.
//! The URI query string scripts discovery and stream behavior for tests:
//!
//! - `stub://cam` - opens at any index, unlimited frames
//! - `stub://cam?fail_below=2` - indices 0 and 1 refuse to open
//! - `stub://cam?frames=10` - stream ends after ten frames

use anyhow::{anyhow, Result};

use crate::camera::FrameSource;
use crate::frame::RgbFrame;

pub struct StubCamera {
    width: u32,
    height: u32,
    frames_remaining: Option<u64>,
    frame_count: u64,
}

impl StubCamera {
    pub fn open(uri: &str, index: u32, width: u32, height: u32) -> Result<Self> {
        let params = StubParams::parse(uri)?;
        if index < params.fail_below {
            return Err(anyhow!("stub camera index {} unavailable", index));
        }
        log::debug!("stub camera opened: {} index={}", uri, index);
        Ok(Self {
            width,
            height,
            frames_remaining: params.frames,
            frame_count: 0,
        })
    }

    fn generate_pixels(&self) -> Vec<u8> {
        let pixel_count = (self.width as usize) * (self.height as usize) * 3;
        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.frame_count) % 256) as u8;
        }
        pixels
    }
}

impl FrameSource for StubCamera {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn read_frame(&mut self) -> Result<Option<RgbFrame>> {
        if let Some(remaining) = &mut self.frames_remaining {
            if *remaining == 0 {
                return Ok(None);
            }
            *remaining -= 1;
        }
        self.frame_count += 1;
        let frame = RgbFrame::new(self.generate_pixels(), self.width, self.height)?;
        Ok(Some(frame))
    }
}

struct StubParams {
    fail_below: u32,
    frames: Option<u64>,
}

impl StubParams {
    fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("stub://")
            .ok_or_else(|| anyhow!("not a stub camera uri: {}", uri))?;
        let mut params = Self {
            fail_below: 0,
            frames: None,
        };
        let Some((_, query)) = rest.split_once('?') else {
            return Ok(params);
        };
        for pair in query.split('&').filter(|pair| !pair.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("malformed stub parameter: {}", pair))?;
            match key {
                "fail_below" => {
                    params.fail_below = value
                        .parse()
                        .map_err(|_| anyhow!("fail_below must be an integer: {}", value))?;
                }
                "frames" => {
                    params.frames = Some(
                        value
                            .parse()
                            .map_err(|_| anyhow!("frames must be an integer: {}", value))?,
                    );
                }
                other => return Err(anyhow!("unknown stub parameter: {}", other)),
            }
        }
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_frames_with_requested_dimensions() -> Result<()> {
        let mut camera = StubCamera::open("stub://cam", 0, 64, 48)?;
        let frame = camera.read_frame()?.expect("frame");
        assert_eq!(frame.width, 64);
        assert_eq!(frame.height, 48);
        assert_eq!(frame.pixels().len(), 64 * 48 * 3);
        Ok(())
    }

    #[test]
    fn fail_below_rejects_low_indices() {
        assert!(StubCamera::open("stub://cam?fail_below=2", 1, 64, 48).is_err());
        assert!(StubCamera::open("stub://cam?fail_below=2", 2, 64, 48).is_ok());
    }

    #[test]
    fn finite_script_ends_the_stream() -> Result<()> {
        let mut camera = StubCamera::open("stub://cam?frames=2", 0, 8, 8)?;
        assert!(camera.read_frame()?.is_some());
        assert!(camera.read_frame()?.is_some());
        assert!(camera.read_frame()?.is_none());
        assert!(camera.read_frame()?.is_none());
        Ok(())
    }

    #[test]
    fn rejects_malformed_parameters() {
        assert!(StubCamera::open("stub://cam?frames=abc", 0, 8, 8).is_err());
        assert!(StubCamera::open("stub://cam?bogus=1", 0, 8, 8).is_err());
    }
}
