#![cfg(feature = "backend-tract")]

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::backend::LandmarkBackend;
use crate::detect::result::{Landmark, SubjectLandmarks};
use crate::frame::RgbFrame;

/// Tract-based backend running a local ONNX landmark regression model.
///
/// The model is expected to take one NCHW float frame and emit a flat
/// `landmark_count * 3` coordinate tensor (x, y in model-input pixels, z
/// relative depth), optionally followed by a presence score tensor. No
/// network I/O; the model file is read once at startup.
pub struct TractLandmarkBackend {
    model: TypedSimplePlan<TypedModel>,
    width: u32,
    height: u32,
    landmark_count: usize,
    presence_threshold: f32,
}

impl TractLandmarkBackend {
    /// Load an ONNX model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(
        model_path: P,
        width: u32,
        height: u32,
        landmark_count: usize,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, height as usize, width as usize),
                ),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            width,
            height,
            landmark_count,
            presence_threshold: 0.5,
        })
    }

    /// Override the default presence-score threshold.
    pub fn with_presence_threshold(mut self, threshold: f32) -> Self {
        self.presence_threshold = threshold;
        self
    }

    fn build_input(&self, frame: &RgbFrame) -> Result<Tensor> {
        if frame.width != self.width || frame.height != self.height {
            return Err(anyhow!(
                "frame size {}x{} does not match model input {}x{}",
                frame.width,
                frame.height,
                self.width,
                self.height
            ));
        }

        let pixels = frame.pixels();
        let width = self.width as usize;
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, self.height as usize, width),
            |(_, channel, y, x)| {
                let idx = (y * width + x) * 3 + channel;
                pixels[idx] as f32 / 255.0
            },
        );

        Ok(input.into_tensor())
    }

    fn extract_subject(&self, outputs: TVec<TValue>) -> Result<Vec<SubjectLandmarks>> {
        if let Some(score_tensor) = outputs.get(1) {
            let scores = score_tensor
                .to_array_view::<f32>()
                .context("presence output tensor was not f32")?;
            let presence = scores.iter().copied().next().unwrap_or(0.0);
            if presence < self.presence_threshold {
                return Ok(Vec::new());
            }
        }

        let coords_tensor = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?;
        let coords = coords_tensor
            .to_array_view::<f32>()
            .context("landmark output tensor was not f32")?;
        let flat: Vec<f32> = coords.iter().copied().collect();

        let needed = self.landmark_count * 3;
        if flat.len() < needed {
            return Err(anyhow!(
                "landmark output too short: expected {} values, received {}",
                needed,
                flat.len()
            ));
        }

        let landmarks = flat[..needed]
            .chunks_exact(3)
            .map(|triple| Landmark {
                x: triple[0] / self.width as f32,
                y: triple[1] / self.height as f32,
                z: triple[2],
                visibility: 1.0,
            })
            .collect();

        Ok(vec![SubjectLandmarks::new(landmarks)])
    }
}

impl LandmarkBackend for TractLandmarkBackend {
    fn name(&self) -> &'static str {
        "tract"
    }

    fn detect(&mut self, frame: &RgbFrame) -> Result<Vec<SubjectLandmarks>> {
        let input = self.build_input(frame)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;
        self.extract_subject(outputs)
    }
}
