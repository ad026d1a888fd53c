//! HTTP link to the remote pan/tilt actuator.
//!
//! The actuator (an ESP32-class board driving two servos) exposes two
//! endpoints:
//! - `GET /status` returning `{"pan": int, "tilt": int}`
//! - `POST /control` taking form fields `pan` and `tilt`, answering with
//!   the confirmed pose
//!
//! Calls are bounded by a short timeout and surface typed errors.

pub mod client;
pub mod error;
pub mod link;
pub mod types;

pub use client::{ActuatorConfig, HttpActuatorLink};
pub use error::{ActuatorError, ActuatorResult};
pub use link::ActuatorLink;
pub use types::{ControlRequest, PoseReport};
