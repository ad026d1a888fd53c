//! Status snapshot for overlays and logs.

use ptz_models::{ActuatorPose, PixelPoint, TrackingMode};
use ptz_vision::TargetSizeClass;
use serde::Serialize;

/// Controller state machine position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// Manual aim, waiting for clicks.
    #[default]
    Idle,
    /// Auto-track with no target, still inside the timeout window.
    Seeking,
    /// Timed out and recentered; waiting for a target.
    Recovering,
    /// Following a target.
    Tracking,
}

/// Target/dead-zone area ratios inside this band read as well framed.
pub const AREA_RATIO_BAND: (f64, f64) = (0.1, 2.0);

/// Everything a display needs to draw the tracker's state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerStatus {
    pub mode: TrackingMode,
    pub state: ControllerState,
    pub zoom_level: f64,
    /// Correction speed relative to zoom 1.0
    pub speed_factor: f64,
    pub dead_zone_px: u32,
    pub auto_zoom: bool,
    pub last_pose: Option<ActuatorPose>,
    /// Last clicked point in manual aim
    pub manual_target: Option<PixelPoint>,
    /// Time left before recovery while seeking
    pub seek_remaining_ms: Option<u64>,
    pub target_size: Option<TargetSizeClass>,
    /// Target area over the dead-zone square area
    pub target_area_ratio: Option<f64>,
}

impl TrackerStatus {
    /// Whether the tracked target's area ratio is inside [`AREA_RATIO_BAND`].
    pub fn area_ratio_in_band(&self) -> Option<bool> {
        self.target_area_ratio
            .map(|r| r >= AREA_RATIO_BAND.0 && r <= AREA_RATIO_BAND.1)
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} {:?} zoom={:.1}x speed={:.2} dz={}px auto_zoom={}",
            self.mode,
            self.state,
            self.zoom_level,
            self.speed_factor,
            self.dead_zone_px,
            if self.auto_zoom { "on" } else { "off" }
        );
        if let Some(pose) = self.last_pose {
            line.push_str(&format!(" pose={}", pose));
        }
        if let Some(ms) = self.seek_remaining_ms {
            line.push_str(&format!(" seek={:.1}s", ms as f64 / 1000.0));
        }
        if let Some(ratio) = self.target_area_ratio {
            line.push_str(&format!(" ratio={:.2}", ratio));
        }
        line
    }
}

/// Target area over the dead-zone square `(2 * dead_zone)^2`.
pub fn area_ratio(target_area: u64, dead_zone_px: u32) -> Option<f64> {
    let side = 2 * dead_zone_px as u64;
    let dz_area = side * side;
    if dz_area == 0 {
        None
    } else {
        Some(target_area as f64 / dz_area as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_ratio() {
        assert_eq!(area_ratio(160 * 160, 80), Some(1.0));
        assert_eq!(area_ratio(100, 0), None);
    }

    #[test]
    fn test_summary_and_band() {
        let status = TrackerStatus {
            mode: TrackingMode::AutoTrack,
            state: ControllerState::Seeking,
            zoom_level: 2.0,
            speed_factor: 0.5,
            dead_zone_px: 40,
            auto_zoom: true,
            last_pose: Some(ActuatorPose::new(90.0, 150.0)),
            manual_target: None,
            seek_remaining_ms: Some(2500),
            target_size: None,
            target_area_ratio: Some(0.05),
        };
        let line = status.summary();
        assert!(line.contains("auto_track"));
        assert!(line.contains("zoom=2.0x"));
        assert!(line.contains("seek=2.5s"));
        assert_eq!(status.area_ratio_in_band(), Some(false));
    }
}
