//! The actuator seam the controller talks through.

use async_trait::async_trait;
use ptz_models::ActuatorPose;

use crate::error::ActuatorResult;

/// Request/response channel to a pan/tilt actuator.
///
/// Every call is a single bounded round trip. Implementations keep no pose
/// state and never retry; the caller decides what a failure means.
#[async_trait]
pub trait ActuatorLink: Send + Sync {
    /// Fetch the pose the actuator currently reports.
    async fn query_pose(&self) -> ActuatorResult<ActuatorPose>;

    /// Command an absolute pose. The pose must already be clamped.
    ///
    /// Returns the pose the actuator confirmed.
    async fn set_pose(&self, pose: ActuatorPose) -> ActuatorResult<ActuatorPose>;

    /// Link name for logging.
    fn name(&self) -> &str;
}
