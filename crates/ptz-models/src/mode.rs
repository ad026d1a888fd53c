use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which input drives the actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TrackingMode {
    /// Operator clicks a point and the head slews to it.
    #[default]
    ManualAim,
    /// The detector's largest target is followed continuously.
    AutoTrack,
}

impl TrackingMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            TrackingMode::ManualAim => TrackingMode::AutoTrack,
            TrackingMode::AutoTrack => TrackingMode::ManualAim,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrackingMode::ManualAim => "manual_aim",
            TrackingMode::AutoTrack => "auto_track",
        }
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "manual" | "manual_aim" | "click" => Ok(TrackingMode::ManualAim),
            "auto" | "auto_track" | "face" => Ok(TrackingMode::AutoTrack),
            other => Err(format!("unknown tracking mode: {other}")),
        }
    }
}
