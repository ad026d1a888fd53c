//! Target acquisition: one best target per frame.

use std::time::Instant;

use ptz_models::{PixelBox, TargetObservation};
use tracing::{debug, warn};

use crate::detector::TargetDetector;
use crate::frame::Frame;

/// Outcome of running the detector over one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Acquisition {
    /// The largest detected box.
    Target(TargetObservation),
    /// The detector ran and found nothing usable.
    NoTarget,
    /// The detector errored. Callers treat this as "no target" for the tick.
    DetectorFailed(String),
}

impl Acquisition {
    /// The observation, if a target was acquired.
    pub fn observation(&self) -> Option<TargetObservation> {
        match self {
            Acquisition::Target(obs) => Some(*obs),
            _ => None,
        }
    }
}

/// Wraps a detector and picks the largest box out of each frame.
pub struct TargetAcquisition<D: TargetDetector> {
    detector: D,
}

impl<D: TargetDetector> TargetAcquisition<D> {
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    /// Detect and select. Boxes with zero width or height are ignored.
    pub async fn acquire(&mut self, frame: &Frame, now: Instant) -> Acquisition {
        let boxes = match self.detector.detect(frame).await {
            Ok(boxes) => boxes,
            Err(e) => {
                warn!(detector = self.detector.name(), "Detection failed: {}", e);
                return Acquisition::DetectorFailed(e.to_string());
            }
        };

        let candidates: Vec<PixelBox> = boxes.into_iter().filter(|b| b.area() > 0).collect();
        match PixelBox::largest(&candidates) {
            Some(best) => {
                debug!(
                    candidates = candidates.len(),
                    width = best.width,
                    height = best.height,
                    "Target acquired"
                );
                Acquisition::Target(TargetObservation::from_box(&best, now))
            }
            None => Acquisition::NoTarget,
        }
    }
}
