//! Tracker configuration.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ptz_actuator::ActuatorConfig;
use ptz_models::{ActuatorPose, PixelPoint, PoseLimits, TrackingMode};
use ptz_vision::{HttpDetectorConfig, ZoomConfig};
use tracing::warn;

use crate::error::{TrackerError, TrackerResult};

/// Per-axis correction gain in degrees per pixel of error at zoom 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisGains {
    pub pan: f64,
    pub tilt: f64,
}

impl AxisGains {
    /// Gains for pan and tilt.
    pub const fn new(pan: f64, tilt: f64) -> Self {
        Self { pan, tilt }
    }

    fn is_valid(&self) -> bool {
        self.pan.is_finite() && self.tilt.is_finite() && self.pan > 0.0 && self.tilt > 0.0
    }
}

/// Tracker configuration.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Frame width in pixels
    pub frame_width: u32,
    /// Frame height in pixels
    pub frame_height: u32,
    /// Servo limits
    pub limits: PoseLimits,
    /// Pose used by center-now and lost-target recovery
    pub center_pose: ActuatorPose,
    /// Gains while auto-tracking
    pub auto_gains: AxisGains,
    /// Gains for manual aim clicks
    pub manual_gains: AxisGains,
    /// Minimum time between manual-aim moves (zero = every click moves)
    pub manual_move_interval: Duration,
    /// Minimum time between auto-track moves
    pub auto_move_interval: Duration,
    /// How long a target may be missing before recovery
    pub no_target_timeout: Duration,
    /// Auto-zoom enabled at startup
    pub auto_zoom: bool,
    /// Mode at startup
    pub start_mode: TrackingMode,
    /// Minimum tick period; zero runs as fast as frames arrive
    pub tick_interval: Duration,
    /// Zoom engine settings
    pub zoom: ZoomConfig,
    /// Actuator link settings
    pub actuator: ActuatorConfig,
    /// Directory of frames for the image-sequence source
    pub frame_dir: Option<PathBuf>,
    /// Loop the image sequence
    pub frame_loop: bool,
    /// Camera index for live capture
    pub camera_index: i32,
    /// Haar cascade file for face detection
    pub cascade_path: Option<String>,
    /// Remote detector, when configured
    pub detector: Option<HttpDetectorConfig>,
    /// Prometheus listen address, when metrics are wanted
    pub metrics_addr: Option<String>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            frame_width: 1280,
            frame_height: 720,
            limits: PoseLimits::default(),
            center_pose: ActuatorPose::new(90.0, 150.0),
            auto_gains: AxisGains::new(0.04, 0.02),
            manual_gains: AxisGains::new(0.15, 0.15),
            manual_move_interval: Duration::ZERO,
            auto_move_interval: Duration::from_millis(300),
            no_target_timeout: Duration::from_secs(5),
            auto_zoom: true,
            start_mode: TrackingMode::ManualAim,
            tick_interval: Duration::from_millis(33),
            zoom: ZoomConfig::default(),
            actuator: ActuatorConfig::default(),
            frame_dir: None,
            frame_loop: false,
            camera_index: 0,
            cascade_path: None,
            detector: None,
            metrics_addr: None,
        }
    }
}

impl TrackerConfig {
    /// Create config from environment variables.
    ///
    /// Unset or unparseable values fall back to their defaults.
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            frame_width: env_or("PTZ_FRAME_WIDTH", d.frame_width),
            frame_height: env_or("PTZ_FRAME_HEIGHT", d.frame_height),
            limits: PoseLimits {
                pan_min: env_or("PTZ_PAN_MIN", d.limits.pan_min),
                pan_max: env_or("PTZ_PAN_MAX", d.limits.pan_max),
                tilt_min: env_or("PTZ_TILT_MIN", d.limits.tilt_min),
                tilt_max: env_or("PTZ_TILT_MAX", d.limits.tilt_max),
            },
            center_pose: ActuatorPose::new(
                env_or("PTZ_CENTER_PAN", d.center_pose.pan),
                env_or("PTZ_CENTER_TILT", d.center_pose.tilt),
            ),
            auto_gains: d.auto_gains,
            manual_gains: d.manual_gains,
            manual_move_interval: env_ms("PTZ_MANUAL_MOVE_INTERVAL_MS", d.manual_move_interval),
            auto_move_interval: env_ms("PTZ_AUTO_MOVE_INTERVAL_MS", d.auto_move_interval),
            no_target_timeout: env_ms("PTZ_NO_TARGET_TIMEOUT_MS", d.no_target_timeout),
            auto_zoom: env_bool("PTZ_AUTO_ZOOM", d.auto_zoom),
            start_mode: start_mode_from_env(d.start_mode),
            tick_interval: env_ms("PTZ_TICK_INTERVAL_MS", d.tick_interval),
            zoom: ZoomConfig::from_env(),
            actuator: ActuatorConfig::from_env(),
            frame_dir: std::env::var("PTZ_FRAME_DIR").ok().map(PathBuf::from),
            frame_loop: env_bool("PTZ_FRAME_LOOP", d.frame_loop),
            camera_index: env_or("PTZ_CAMERA_INDEX", d.camera_index),
            cascade_path: std::env::var("PTZ_CASCADE_PATH").ok(),
            detector: HttpDetectorConfig::from_env(),
            metrics_addr: std::env::var("PTZ_METRICS_ADDR").ok(),
        }
    }

    /// Frame center in pixels.
    pub fn frame_center(&self) -> PixelPoint {
        PixelPoint::new((self.frame_width / 2) as i32, (self.frame_height / 2) as i32)
    }

    /// Minimum interval between moves for a mode.
    pub fn move_interval(&self, mode: TrackingMode) -> Duration {
        match mode {
            TrackingMode::ManualAim => self.manual_move_interval,
            TrackingMode::AutoTrack => self.auto_move_interval,
        }
    }

    /// Correction gains for a mode.
    pub fn gains(&self, mode: TrackingMode) -> AxisGains {
        match mode {
            TrackingMode::ManualAim => self.manual_gains,
            TrackingMode::AutoTrack => self.auto_gains,
        }
    }

    /// Check the configuration before the loop starts.
    pub fn validate(&self) -> TrackerResult<()> {
        if self.frame_width == 0 || self.frame_height == 0 {
            return Err(TrackerError::config(format!(
                "frame size must be non-zero, got {}x{}",
                self.frame_width, self.frame_height
            )));
        }
        if !self.limits.is_valid() {
            return Err(TrackerError::config(format!(
                "invalid pose limits: {:?}",
                self.limits
            )));
        }
        if !self.limits.contains(&self.center_pose) {
            return Err(TrackerError::config(format!(
                "center pose {} is outside the limits",
                self.center_pose
            )));
        }
        if !self.auto_gains.is_valid() || !self.manual_gains.is_valid() {
            return Err(TrackerError::config("gains must be positive and finite"));
        }
        self.zoom.validate().map_err(TrackerError::Config)?;
        self.actuator.base()?;
        Ok(())
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn start_mode_from_env(default: TrackingMode) -> TrackingMode {
    match std::env::var("PTZ_START_MODE") {
        Ok(raw) => TrackingMode::from_str(&raw).unwrap_or_else(|_| {
            warn!("Unknown PTZ_START_MODE '{}', using {}", raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn env_ms(key: &str, default: Duration) -> Duration {
    Duration::from_millis(env_or(key, default.as_millis() as u64))
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => match v.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}
