//! Owned RGB frame container.
//!
//! Frames are produced by the camera layer and consumed read-only by the
//! detector backends. The frame is mirrored horizontally before feature
//! extraction so that coordinates match the user-facing orientation.

use anyhow::{anyhow, Result};

/// One captured frame, tightly packed RGB24.
#[derive(Clone, Debug)]
pub struct RgbFrame {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RgbFrame {
    /// Wrap a pixel buffer, rejecting dimension/length mismatches.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!("frame has zero dimension ({}x{})", width, height));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if pixels.len() != expected {
            return Err(anyhow!(
                "expected {} RGB bytes for {}x{}, received {}",
                expected,
                width,
                height,
                pixels.len()
            ));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Flip the frame left-to-right in place.
    pub fn mirror_horizontal(&mut self) {
        let width = self.width as usize;
        for row in self.pixels.chunks_exact_mut(width * 3) {
            let (mut left, mut right) = (0usize, width - 1);
            while left < right {
                for channel in 0..3 {
                    row.swap(left * 3 + channel, right * 3 + channel);
                }
                left += 1;
                right -= 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_dimensions() {
        assert!(RgbFrame::new(vec![], 0, 4).is_err());
        assert!(RgbFrame::new(vec![], 4, 0).is_err());
    }

    #[test]
    fn rejects_length_mismatch() {
        assert!(RgbFrame::new(vec![0u8; 11], 2, 2).is_err());
    }

    #[test]
    fn mirror_swaps_row_pixel_order() -> Result<()> {
        // 3x1 frame: pixels A B C
        let pixels = vec![1, 1, 1, 2, 2, 2, 3, 3, 3];
        let mut frame = RgbFrame::new(pixels, 3, 1)?;
        frame.mirror_horizontal();
        assert_eq!(frame.pixels(), &[3, 3, 3, 2, 2, 2, 1, 1, 1]);
        Ok(())
    }

    #[test]
    fn mirror_is_an_involution() -> Result<()> {
        let pixels: Vec<u8> = (0..4 * 2 * 3).map(|i| i as u8).collect();
        let mut frame = RgbFrame::new(pixels.clone(), 4, 2)?;
        frame.mirror_horizontal();
        frame.mirror_horizontal();
        assert_eq!(frame.pixels(), pixels.as_slice());
        Ok(())
    }
}
