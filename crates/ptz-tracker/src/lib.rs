//! Closed-loop pan/tilt tracking.
//!
//! Keeps a target centered by issuing incremental pose commands to a remote
//! pan/tilt actuator. Targets come from operator clicks (manual aim) or from
//! a detector (auto-track); zoom scales both the dead zone and the
//! correction gain, and a lost target triggers a one-shot return to center.

pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod mode;
pub mod runner;
pub mod sink;
pub mod status;

pub use commands::CommandQueue;
pub use config::{AxisGains, TrackerConfig};
pub use controller::{MoveOutcome, TrackingController};
pub use error::{TrackerError, TrackerResult};
pub use mode::{ModeManager, RecoveryState};
pub use runner::{RunSummary, StopReason, TrackingLoop};
pub use sink::{FrameSink, LogSink, NullSink};
pub use status::{ControllerState, TrackerStatus};
