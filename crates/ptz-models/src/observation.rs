use std::time::Instant;

use crate::geometry::{PixelBox, PixelPoint};

/// A single target sighting, consumed once by the controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetObservation {
    /// Target center in frame pixels
    pub center: PixelPoint,
    /// Apparent width in pixels
    pub width: u32,
    /// Apparent height in pixels
    pub height: u32,
    /// When the frame carrying this target was processed
    pub timestamp: Instant,
}

impl TargetObservation {
    /// Observation from a detection box.
    pub fn from_box(bbox: &PixelBox, timestamp: Instant) -> Self {
        Self {
            center: bbox.center(),
            width: bbox.width,
            height: bbox.height,
            timestamp,
        }
    }

    /// Observation from an operator click. Clicks have no extent.
    pub fn from_click(point: PixelPoint, timestamp: Instant) -> Self {
        Self {
            center: point,
            width: 0,
            height: 0,
            timestamp,
        }
    }

    /// Apparent area in pixels.
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}
