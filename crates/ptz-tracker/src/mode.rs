//! Mode switching and lost-target bookkeeping.

use std::time::{Duration, Instant};

use ptz_models::TrackingMode;
use tracing::info;

/// Lost-target window state.
///
/// `recovering` flips to true at most once per loss episode and is cleared
/// when a target reappears, the mode changes, or the operator recenters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryState {
    pub last_target_seen: Instant,
    pub recovering: bool,
}

impl RecoveryState {
    /// Open a window at `now`.
    pub fn new(now: Instant) -> Self {
        Self {
            last_target_seen: now,
            recovering: false,
        }
    }

    /// A target was seen.
    pub fn mark_seen(&mut self, now: Instant) {
        self.last_target_seen = now;
        self.recovering = false;
    }

    /// Restart the window without a sighting.
    pub fn restart(&mut self, now: Instant) {
        self.mark_seen(now);
    }

    /// Time since the last sighting (or restart).
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.last_target_seen)
    }

    /// Whether the window is over and recovery has not run yet.
    pub fn is_due(&self, now: Instant, timeout: Duration) -> bool {
        !self.recovering && self.elapsed(now) > timeout
    }

    /// Time left before recovery, `None` once recovering.
    pub fn remaining(&self, now: Instant, timeout: Duration) -> Option<Duration> {
        if self.recovering {
            None
        } else {
            Some(timeout.saturating_sub(self.elapsed(now)))
        }
    }
}

/// Owns the active tracking mode.
#[derive(Debug, Clone)]
pub struct ModeManager {
    mode: TrackingMode,
}

impl ModeManager {
    /// Start in `mode`.
    pub fn new(mode: TrackingMode) -> Self {
        Self { mode }
    }

    /// Active mode.
    pub fn mode(&self) -> TrackingMode {
        self.mode
    }

    /// Whether the detector drives the actuator.
    pub fn is_auto(&self) -> bool {
        self.mode == TrackingMode::AutoTrack
    }

    /// Switch to the other mode and restart the lost-target window.
    pub fn toggle(&mut self, recovery: &mut RecoveryState, now: Instant) -> TrackingMode {
        self.mode = self.mode.toggled();
        recovery.restart(now);
        info!(mode = %self.mode, "Tracking mode changed");
        self.mode
    }
}
