//! Frame sampling loop that feeds detections to the classifier.
//!
//! Decoding video and running the face model are left to the caller, behind
//! [`EmbeddingProvider`]. The loop samples a fixed stride of frames, turns
//! each detection into an [`Observation`], and classifies them strictly in
//! detection order on the calling thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::classifier::{Classifier, Decision};
use crate::error::{FaceClusterError, Result};
use crate::observation::{Embedding, Observation};
use crate::region::FaceBox;
use crate::store::ClusterStore;

/// Frame dimensions, needed to plan face crops.
pub trait FrameInfo {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
}

/// Finds faces in a frame and embeds them.
pub trait EmbeddingProvider {
    type Frame: FrameInfo;

    /// Returns zero or more detections, in detector order.
    fn detect(&mut self, frame: &Self::Frame) -> Result<Vec<Detection>>;
}

/// One face found by an [`EmbeddingProvider`].
#[derive(Debug, Clone)]
pub struct Detection {
    pub bbox: Option<FaceBox>,
    pub embedding: Vec<f32>,
}

/// Decides which frames are analysed and when to stop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampler {
    frame_rate: f64,
    every: u64,
    stop_after: Option<f64>,
}

impl Sampler {
    /// Samples `captures_per_second` frames per second of a
    /// `frame_rate` stream, stopping after `stop_after` seconds if set.
    pub fn new(frame_rate: f64, captures_per_second: u32, stop_after: Option<f64>) -> Result<Self> {
        if !frame_rate.is_finite() || frame_rate <= 0.0 {
            return Err(FaceClusterError::InvalidConfig(format!(
                "frame rate must be positive, got {frame_rate}"
            )));
        }
        if captures_per_second == 0 {
            return Err(FaceClusterError::InvalidConfig(
                "captures per second must be positive".into(),
            ));
        }
        if let Some(s) = stop_after {
            if !s.is_finite() || s <= 0.0 {
                return Err(FaceClusterError::InvalidConfig(format!(
                    "stop time must be positive, got {s}"
                )));
            }
        }
        let every = (frame_rate.round() as u64 / captures_per_second as u64).max(1);
        Ok(Self {
            frame_rate,
            every,
            stop_after,
        })
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Number of frames between two samples.
    pub fn every(&self) -> u64 {
        self.every
    }

    /// `frame_id` is 1-based.
    pub fn should_sample(&self, frame_id: u64) -> bool {
        frame_id % self.every == 0
    }

    /// Stream time of `frame_id`, rounded to milliseconds.
    pub fn seconds(&self, frame_id: u64) -> f64 {
        (frame_id as f64 / self.frame_rate * 1000.0).round() / 1000.0
    }

    pub fn past_stop(&self, seconds: f64) -> bool {
        self.stop_after.is_some_and(|s| seconds > s)
    }
}

/// Counters for one [`Ingest::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    pub frames_read: u64,
    pub frames_sampled: u64,
    pub observations: u64,
    pub matched: u64,
    pub created: u64,
    pub deferred: u64,
    pub rejected: u64,
    pub cancelled: bool,
}

/// Drives frames through an [`EmbeddingProvider`] and the classifier.
pub struct Ingest {
    sampler: Sampler,
    cancel: Arc<AtomicBool>,
}

impl Ingest {
    pub fn new(sampler: Sampler) -> Self {
        Self {
            sampler,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the loop before the next frame when set.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Runs until the frames run out, the stop time passes, or the cancel
    /// flag is raised.
    ///
    /// Malformed detections are logged and skipped. Frame source and
    /// provider errors abort the run; everything classified so far stays in
    /// `store`.
    pub fn run<P, I>(
        &self,
        frames: I,
        provider: &mut P,
        classifier: &Classifier,
        store: &mut ClusterStore,
    ) -> Result<IngestStats>
    where
        P: EmbeddingProvider,
        I: IntoIterator<Item = Result<P::Frame>>,
    {
        let mut stats = IngestStats::default();
        let mut frame_id: u64 = 0;

        for frame in frames {
            if self.cancel.load(Ordering::Relaxed) {
                stats.cancelled = true;
                break;
            }
            let frame = frame?;
            frame_id += 1;
            stats.frames_read += 1;
            if !self.sampler.should_sample(frame_id) {
                continue;
            }
            let seconds = self.sampler.seconds(frame_id);
            if self.sampler.past_stop(seconds) {
                break;
            }

            let start = Instant::now();
            let detections = provider.detect(&frame)?;
            stats.frames_sampled += 1;
            let faces = detections.len();

            for (i, det) in detections.into_iter().enumerate() {
                stats.observations += 1;
                let label = format!("frame{frame_id:06}-{i}");
                let obs = match observation(det, seconds, &label, &frame) {
                    Ok(o) => o,
                    Err(e) => {
                        warn!(label = %label, error = %e, "detection discarded");
                        stats.rejected += 1;
                        continue;
                    }
                };
                match classifier.classify(store, obs) {
                    Ok(Decision::Matched(_)) => stats.matched += 1,
                    Ok(Decision::Created(_)) => stats.created += 1,
                    Ok(Decision::Deferred) => stats.deferred += 1,
                    Err(e) if e.is_invalid_input() => {
                        warn!(label = %label, error = %e, "detection discarded");
                        stats.rejected += 1;
                    }
                    Err(e) => return Err(e),
                }
            }

            info!(
                frame = frame_id,
                seconds,
                elapsed_ms = start.elapsed().as_millis() as u64,
                faces,
                store = %store,
                "frame processed"
            );
        }

        Ok(stats)
    }
}

fn observation<F: FrameInfo>(det: Detection, seconds: f64, label: &str, frame: &F) -> Result<Observation> {
    let embedding = Embedding::new(det.embedding)?;
    let mut obs = Observation::new(seconds, label, embedding);
    if let Some(plan) = det
        .bbox
        .and_then(|b| b.crop_plan(frame.width(), frame.height()))
    {
        obs = obs.with_region(plan);
    }
    Ok(obs)
}
