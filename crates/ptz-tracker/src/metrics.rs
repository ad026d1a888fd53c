//! Tracker metrics.

use metrics::{counter, gauge};

/// Metric name constants for consistency.
pub mod names {
    /// Pose commands the actuator confirmed, by reason.
    pub const MOVES_TOTAL: &str = "ptz_moves_total";

    /// Failed actuator calls, by operation and error kind.
    pub const ACTUATOR_ERRORS_TOTAL: &str = "ptz_actuator_errors_total";

    /// Lost-target recoveries started.
    pub const RECOVERIES_TOTAL: &str = "ptz_recoveries_total";

    /// Current software zoom level.
    pub const ZOOM_LEVEL: &str = "ptz_zoom_level";

    /// Loop ticks processed.
    pub const TICKS_TOTAL: &str = "ptz_ticks_total";

    /// Detector errors treated as "no target".
    pub const DETECTOR_FAILURES_TOTAL: &str = "ptz_detector_failures_total";
}

/// Record a confirmed move.
pub fn record_move(reason: &'static str) {
    counter!(names::MOVES_TOTAL, "reason" => reason).increment(1);
}

/// Record a failed actuator call.
pub fn record_actuator_error(operation: &'static str, kind: &'static str) {
    counter!(
        names::ACTUATOR_ERRORS_TOTAL,
        "operation" => operation,
        "kind" => kind
    )
    .increment(1);
}

pub fn record_recovery() {
    counter!(names::RECOVERIES_TOTAL).increment(1);
}

pub fn set_zoom_level(level: f64) {
    gauge!(names::ZOOM_LEVEL).set(level);
}

pub fn record_tick(mode: &'static str) {
    counter!(names::TICKS_TOTAL, "mode" => mode).increment(1);
}

pub fn record_detector_failure(detector: &'static str) {
    counter!(names::DETECTOR_FAILURES_TOTAL, "detector" => detector).increment(1);
}
