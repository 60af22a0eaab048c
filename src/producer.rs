//! Frame producer loop.
//!
//! One logical thread owns the camera source, the detector instance, the
//! smoothing state, and the writer for the lifetime of the loop; there is
//! no parallelism inside this system. The only concurrent party is the
//! external reader of the snapshot files, which the writer's atomicity
//! guarantee covers.
//!
//! Error policy (per frame): everything is reduced to a warn line and the
//! loop moves on. The loop itself ends on frame-source exhaustion, a frame
//! read failure, or a cooperative shutdown request - always after the
//! in-flight frame's writes complete, never mid-write.

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::camera::FrameSource;
use crate::config::TrackerConfig;
use crate::detect::{LandmarkBackend, SubjectLandmarks};
use crate::exercise::{Exercise, Side};
use crate::frame::RgbFrame;
use crate::now_epoch_s_f64;
use crate::record::{ImageSize, LogRecord, SnapshotPayload};
use crate::smooth::LabelSmoother;
use crate::snapshot::SnapshotWriter;

pub struct ProducerLoop {
    source: Box<dyn FrameSource>,
    detector: Box<dyn LandmarkBackend>,
    writer: SnapshotWriter,
    smoother: LabelSmoother,
    exercise: Exercise,
    side: Side,
    px_per_cm: f64,
    fps_limit: u32,
    frames_processed: u64,
}

impl ProducerLoop {
    pub fn new(
        source: Box<dyn FrameSource>,
        detector: Box<dyn LandmarkBackend>,
        writer: SnapshotWriter,
        cfg: &TrackerConfig,
    ) -> Self {
        Self {
            source,
            detector,
            writer,
            smoother: LabelSmoother::new(cfg.smoothing_window),
            exercise: cfg.exercise,
            side: cfg.side,
            px_per_cm: cfg.px_per_cm,
            fps_limit: cfg.fps_limit,
            frames_processed: 0,
        }
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Run until the source ends, a read fails, or `shutdown` is set.
    ///
    /// The shutdown flag is checked once per iteration (cooperative, not
    /// preemptive), so the current frame always finishes its writes. The
    /// camera and detector are released when the loop owner drops.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<()> {
        log::info!(
            "producer running: exercise={} side={} detector={} source={}",
            self.exercise,
            self.side.as_str(),
            self.detector.name(),
            self.source.name()
        );

        loop {
            if shutdown.load(Ordering::Relaxed) {
                log::info!("shutdown requested, stopping");
                break;
            }
            let iteration_start = Instant::now();

            let mut frame = match self.source.read_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("frame source ended");
                    break;
                }
                Err(e) => {
                    log::warn!("frame read failed: {}", e);
                    break;
                }
            };

            // Match the user-facing orientation before any geometry.
            frame.mirror_horizontal();

            match self.detector.detect(&frame) {
                Ok(subjects) => {
                    if let Err(e) = self.persist_frame(&frame, &subjects) {
                        log::warn!("frame skipped: {}", e);
                    } else {
                        self.frames_processed += 1;
                    }
                }
                Err(e) => log::warn!("detector failed, frame skipped: {}", e),
            }

            self.pace(iteration_start);
        }

        log::info!("producer stopped after {} frames", self.frames_processed);
        Ok(())
    }

    fn persist_frame(
        &mut self,
        frame: &RgbFrame,
        subjects: &[SubjectLandmarks],
    ) -> Result<()> {
        let mut records = Vec::with_capacity(subjects.len());
        for (slot, subject) in subjects.iter().enumerate() {
            match self.exercise.assemble(
                slot,
                subject,
                frame.width,
                frame.height,
                self.px_per_cm,
                self.side,
                &mut self.smoother,
            ) {
                Some(record) => records.push(record),
                None => log::debug!("subject {} unusable, skipped", slot),
            }
        }

        // Zero detections still produce a payload: the consumer must see a
        // fresh "nothing visible" rather than a stale reading.
        let payload = SnapshotPayload {
            timestamp: now_epoch_s_f64()?,
            exercise: self.exercise.as_str().to_string(),
            side: self.side.as_str().to_string(),
            image_size: ImageSize {
                w: frame.width,
                h: frame.height,
            },
            subjects: records,
        };

        if let Err(e) = self.writer.write_latest(&payload) {
            log::warn!("latest snapshot write failed: {}", e);
        }
        if let Err(e) = self.writer.append_log(&LogRecord::new(payload)) {
            log::warn!("log append failed: {}", e);
        }
        Ok(())
    }

    /// Soft frame-rate cap: pad the iteration to 1/fps_limit. Advisory
    /// throttling only; frames are never dropped to hit the cap.
    fn pace(&self, iteration_start: Instant) {
        if self.fps_limit == 0 {
            return;
        }
        let min_duration = Duration::from_secs_f64(1.0 / f64::from(self.fps_limit));
        let elapsed = iteration_start.elapsed();
        if elapsed < min_duration {
            std::thread::sleep(min_duration - elapsed);
        }
    }
}
