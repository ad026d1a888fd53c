//! Actuator pose and mechanical limits.

use serde::{Deserialize, Serialize};

/// Pan/tilt position in actuator-native units (servo degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuatorPose {
    /// Horizontal axis
    pub pan: f64,
    /// Vertical axis
    pub tilt: f64,
}

impl ActuatorPose {
    pub fn new(pan: f64, tilt: f64) -> Self {
        Self { pan, tilt }
    }

    /// Offset this pose by `(d_pan, d_tilt)`.
    pub fn offset(&self, d_pan: f64, d_tilt: f64) -> Self {
        Self {
            pan: self.pan + d_pan,
            tilt: self.tilt + d_tilt,
        }
    }

    /// Integer pose as sent over the wire. Rounds to nearest.
    pub fn to_wire(&self) -> (i32, i32) {
        (self.pan.round() as i32, self.tilt.round() as i32)
    }
}

impl std::fmt::Display for ActuatorPose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "pan={:.1} tilt={:.1}", self.pan, self.tilt)
    }
}

/// Safe travel range of both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseLimits {
    pub pan_min: f64,
    pub pan_max: f64,
    pub tilt_min: f64,
    pub tilt_max: f64,
}

impl Default for PoseLimits {
    fn default() -> Self {
        Self {
            pan_min: 30.0,
            pan_max: 290.0,
            tilt_min: 45.0, // keeps the head from tipping back too far
            tilt_max: 240.0,
        }
    }
}

impl PoseLimits {
    /// Clamp a pose into the whole-degree range inside the limits.
    ///
    /// The bounds are `ceil(min)..=floor(max)`, so the pose still lies within
    /// the limits after [`ActuatorPose::to_wire`] rounds it.
    pub fn clamp(&self, pose: ActuatorPose) -> ActuatorPose {
        ActuatorPose {
            pan: pose.pan.clamp(self.pan_min.ceil(), self.pan_max.floor()),
            tilt: pose.tilt.clamp(self.tilt_min.ceil(), self.tilt_max.floor()),
        }
    }

    /// Check whether a pose is within limits.
    pub fn contains(&self, pose: &ActuatorPose) -> bool {
        (self.pan_min..=self.pan_max).contains(&pose.pan)
            && (self.tilt_min..=self.tilt_max).contains(&pose.tilt)
    }

    /// Limits are usable when they are finite and each range holds at least
    /// one whole degree.
    pub fn is_valid(&self) -> bool {
        [self.pan_min, self.pan_max, self.tilt_min, self.tilt_max]
            .iter()
            .all(|v| v.is_finite())
            && self.pan_min.ceil() <= self.pan_max.floor()
            && self.tilt_min.ceil() <= self.tilt_max.floor()
    }
}
