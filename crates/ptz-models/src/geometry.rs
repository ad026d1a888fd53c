//! Pixel-space geometry.

use serde::{Deserialize, Serialize};

/// A point in frame pixel coordinates (origin top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

impl PixelPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Componentwise absolute distance to `other`.
    pub fn abs_diff(&self, other: &PixelPoint) -> (u32, u32) {
        (self.x.abs_diff(other.x), self.y.abs_diff(other.y))
    }
}

/// Axis-aligned detection box in pixel coordinates.
///
/// This is the wire shape detectors report: `{x, y, width, height}` with
/// `(x, y)` the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    /// Left edge x-coordinate
    pub x: i32,
    /// Top edge y-coordinate
    pub y: i32,
    /// Box width
    pub width: u32,
    /// Box height
    pub height: u32,
}

impl PixelBox {
    /// Create a new pixel box.
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box area in pixels.
    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Center point, rounded toward the top-left like integer pixel math.
    ///
    /// Saturates at `i32::MAX` for boxes reaching past the coordinate range.
    #[inline]
    pub fn center(&self) -> PixelPoint {
        PixelPoint {
            x: self.x.saturating_add_unsigned(self.width / 2),
            y: self.y.saturating_add_unsigned(self.height / 2),
        }
    }

    /// Pick the box with the largest area. Ties keep the first one seen.
    pub fn largest(boxes: &[PixelBox]) -> Option<PixelBox> {
        boxes.iter().copied().fold(None, |best, candidate| match best {
            Some(b) if b.area() >= candidate.area() => Some(b),
            _ => Some(candidate),
        })
    }
}
