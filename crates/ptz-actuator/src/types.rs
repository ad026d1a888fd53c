//! Actuator wire types.

use ptz_models::ActuatorPose;
use serde::{Deserialize, Serialize};

/// Pose as reported by `GET /status` and echoed by `POST /control`.
///
/// Firmware reports integers; any JSON number is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PoseReport {
    pub pan: f64,
    pub tilt: f64,
}

impl From<PoseReport> for ActuatorPose {
    fn from(report: PoseReport) -> Self {
        ActuatorPose::new(report.pan, report.tilt)
    }
}

/// Form body for `POST /control`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlRequest {
    pub pan: i32,
    pub tilt: i32,
}

impl From<&ActuatorPose> for ControlRequest {
    fn from(pose: &ActuatorPose) -> Self {
        let (pan, tilt) = pose.to_wire();
        Self { pan, tilt }
    }
}
