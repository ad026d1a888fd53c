//! Shared data models for the pan/tilt tracker.
//!
//! This crate provides Serde-serializable types for:
//! - Actuator poses and their mechanical limits
//! - Pixel geometry (points and detection boxes)
//! - Target observations handed to the controller
//! - Tracking modes and the operator command surface

pub mod command;
pub mod geometry;
pub mod mode;
pub mod observation;
pub mod pose;

// Re-export common types
pub use command::{CommandParseError, OperatorCommand, OperatorEvent};
pub use geometry::{PixelBox, PixelPoint};
pub use mode::TrackingMode;
pub use observation::TargetObservation;
pub use pose::{ActuatorPose, PoseLimits};
