//! Software zoom and zoom-derived control parameters.
//!
//! The zoom level drives three things:
//! - the centered crop+rescale applied to every frame before detection
//! - the dead zone around frame center (shrinks as zoom grows)
//! - the correction sensitivity scale `1 / level` (a pixel is a larger
//!   angle when zoomed in, so corrections get smaller)
//!
//! Auto-zoom is a two-threshold regulator on the target's apparent width.
//! It steps in when the target is too small and out when it is too large,
//! at most once per `auto_interval`. There is no hysteresis band, so a
//! target hovering at a threshold can make the level toggle.

use std::time::{Duration, Instant};

use image::imageops::{self, FilterType};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::frame::Frame;

/// Zoom configuration.
#[derive(Debug, Clone)]
pub struct ZoomConfig {
    /// Lowest zoom level (1.0 = full frame)
    pub min_level: f64,
    /// Highest zoom level
    pub max_level: f64,
    /// Manual zoom step
    pub step: f64,
    /// Auto-zoom step
    pub auto_step: f64,
    /// Dead zone half-size at level 1.0, in pixels
    pub base_dead_zone: u32,
    /// Dead zone never shrinks below this
    pub min_dead_zone: u32,
    /// Zoom in when the target is narrower than this
    pub min_target_width: u32,
    /// Zoom out when the target is wider than this
    pub max_target_width: u32,
    /// Minimum time between auto-zoom adjustments
    pub auto_interval: Duration,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_level: 1.0,
            max_level: 5.0,
            step: 0.2,
            auto_step: 0.1,
            base_dead_zone: 80,
            min_dead_zone: 20,
            min_target_width: 80,
            max_target_width: 400,
            auto_interval: Duration::from_secs(1),
        }
    }
}

impl ZoomConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min_level: env_or("PTZ_ZOOM_MIN", defaults.min_level),
            max_level: env_or("PTZ_ZOOM_MAX", defaults.max_level),
            step: env_or("PTZ_ZOOM_STEP", defaults.step),
            auto_step: env_or("PTZ_AUTO_ZOOM_STEP", defaults.auto_step),
            base_dead_zone: env_or("PTZ_DEAD_ZONE_BASE", defaults.base_dead_zone),
            min_dead_zone: defaults.min_dead_zone,
            min_target_width: env_or("PTZ_TARGET_WIDTH_MIN", defaults.min_target_width),
            max_target_width: env_or("PTZ_TARGET_WIDTH_MAX", defaults.max_target_width),
            auto_interval: Duration::from_millis(env_or(
                "PTZ_AUTO_ZOOM_INTERVAL_MS",
                defaults.auto_interval.as_millis() as u64,
            )),
        }
    }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), String> {
        if !(self.min_level.is_finite() && self.max_level.is_finite()) {
            return Err("zoom levels must be finite".to_string());
        }
        if self.min_level <= 0.0 {
            return Err(format!("zoom min must be positive, got {}", self.min_level));
        }
        if self.min_level > self.max_level {
            return Err(format!(
                "zoom min {} exceeds zoom max {}",
                self.min_level, self.max_level
            ));
        }
        if self.step <= 0.0 || self.auto_step <= 0.0 {
            return Err("zoom steps must be positive".to_string());
        }
        if self.min_target_width > self.max_target_width {
            return Err(format!(
                "target width min {} exceeds max {}",
                self.min_target_width, self.max_target_width
            ));
        }
        Ok(())
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// How a target's apparent width compares to the auto-zoom thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSizeClass {
    TooSmall,
    Ideal,
    TooLarge,
}

/// Zoom state and the parameters derived from it.
#[derive(Debug, Clone)]
pub struct ZoomEngine {
    config: ZoomConfig,
    level: f64,
    dead_zone_px: u32,
    last_auto_adjust: Option<Instant>,
}

impl ZoomEngine {
    /// Create an engine at level 1.0 (clamped into the configured range).
    pub fn new(config: ZoomConfig) -> Self {
        let mut engine = Self {
            level: 1.0,
            dead_zone_px: config.base_dead_zone,
            last_auto_adjust: None,
            config,
        };
        engine.reset();
        engine
    }

    pub fn config(&self) -> &ZoomConfig {
        &self.config
    }

    /// Current zoom level.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Current dead zone half-size in pixels.
    pub fn dead_zone_px(&self) -> u32 {
        self.dead_zone_px
    }

    /// Correction gain multiplier for the current level.
    pub fn sensitivity_scale(&self) -> f64 {
        1.0 / self.level
    }

    /// Dead zone for an arbitrary level: `max(min, round(base / level))`.
    pub fn dead_zone_for(&self, level: f64) -> u32 {
        let scaled = (self.config.base_dead_zone as f64 / level).round() as u32;
        scaled.max(self.config.min_dead_zone)
    }

    /// Move the level by `delta`, clamped to the configured range.
    ///
    /// Returns the new level.
    pub fn adjust_level(&mut self, delta: f64) -> f64 {
        let next = (self.level + delta).clamp(self.config.min_level, self.config.max_level);
        self.set(next);
        self.level
    }

    /// One manual zoom-in step.
    pub fn zoom_in(&mut self) -> f64 {
        self.adjust_level(self.config.step)
    }

    /// One manual zoom-out step.
    pub fn zoom_out(&mut self) -> f64 {
        self.adjust_level(-self.config.step)
    }

    /// Back to level 1.0.
    pub fn reset(&mut self) {
        let home = 1.0_f64.clamp(self.config.min_level, self.config.max_level);
        self.set(home);
    }

    /// Auto-zoom regulation step for a target of `target_width` pixels.
    ///
    /// Returns true when the level changed.
    pub fn auto_adjust(&mut self, target_width: u32, now: Instant) -> bool {
        if let Some(last) = self.last_auto_adjust {
            if now.saturating_duration_since(last) < self.config.auto_interval {
                return false;
            }
        }

        let cfg = &self.config;
        let next = if target_width < cfg.min_target_width && self.level < cfg.max_level {
            Some((self.level + cfg.auto_step).min(cfg.max_level))
        } else if target_width > cfg.max_target_width && self.level > cfg.min_level {
            Some((self.level - cfg.auto_step).max(cfg.min_level))
        } else {
            None
        };

        match next {
            Some(level) => {
                let direction = if level > self.level { "in" } else { "out" };
                self.set(level);
                self.last_auto_adjust = Some(now);
                info!(
                    zoom = self.level,
                    target_width,
                    dead_zone = self.dead_zone_px,
                    "Auto-zoom {}",
                    direction
                );
                true
            }
            None => false,
        }
    }

    /// Classify a target width against the auto-zoom thresholds.
    pub fn classify(&self, target_width: u32) -> TargetSizeClass {
        if target_width < self.config.min_target_width {
            TargetSizeClass::TooSmall
        } else if target_width > self.config.max_target_width {
            TargetSizeClass::TooLarge
        } else {
            TargetSizeClass::Ideal
        }
    }

    /// Centered crop window `(x, y, width, height)` for a frame of the given size.
    pub fn crop_window(&self, width: u32, height: u32) -> (u32, u32, u32, u32) {
        if self.level <= 1.0 {
            return (0, 0, width, height);
        }
        let crop_w = ((width as f64 / self.level) as u32).clamp(1, width.max(1));
        let crop_h = ((height as f64 / self.level) as u32).clamp(1, height.max(1));
        (
            (width - crop_w) / 2,
            (height - crop_h) / 2,
            crop_w,
            crop_h,
        )
    }

    /// Apply the software zoom: centered crop, then rescale to the input size.
    pub fn apply_crop(&self, frame: Frame) -> Frame {
        let (width, height) = frame.dimensions();
        if self.level <= 1.0 || width == 0 || height == 0 {
            return frame;
        }

        let (x, y, crop_w, crop_h) = self.crop_window(width, height);
        let cropped = imageops::crop_imm(&frame, x, y, crop_w, crop_h).to_image();
        imageops::resize(&cropped, width, height, FilterType::Triangle)
    }

    fn set(&mut self, level: f64) {
        self.level = level;
        self.dead_zone_px = self.dead_zone_for(level);
        debug!(
            zoom = self.level,
            dead_zone = self.dead_zone_px,
            "Zoom level set"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn engine() -> ZoomEngine {
        ZoomEngine::new(ZoomConfig::default())
    }

    #[test]
    fn test_initial_state() {
        let zoom = engine();
        assert_eq!(zoom.level(), 1.0);
        assert_eq!(zoom.dead_zone_px(), 80);
        assert_eq!(zoom.sensitivity_scale(), 1.0);
    }

    #[test]
    fn test_dead_zone_floor_and_monotonic() {
        let zoom = engine();
        let mut previous = u32::MAX;
        let mut level = 1.0;
        while level <= 5.0 {
            let dz = zoom.dead_zone_for(level);
            assert!(dz >= 20, "dead zone {dz} below floor at {level}");
            assert!(dz <= previous, "dead zone grew at {level}");
            previous = dz;
            level += 0.05;
        }
        assert_eq!(zoom.dead_zone_for(5.0), 20);
        assert_eq!(zoom.dead_zone_for(3.0), 27);
    }

    #[test]
    fn test_adjust_level_clamps() {
        let mut zoom = engine();
        for _ in 0..100 {
            zoom.zoom_in();
            assert!(zoom.level() <= 5.0);
        }
        assert_eq!(zoom.level(), 5.0);
        assert_eq!(zoom.dead_zone_px(), 20);

        assert_eq!(zoom.adjust_level(-100.0), 1.0);
        zoom.zoom_out();
        assert_eq!(zoom.level(), 1.0);
    }

    #[test]
    fn test_reset() {
        let mut zoom = engine();
        zoom.adjust_level(2.0);
        assert_eq!(zoom.dead_zone_px(), 27);
        zoom.reset();
        assert_eq!(zoom.level(), 1.0);
        assert_eq!(zoom.dead_zone_px(), 80);
    }

    #[test]
    fn test_auto_zoom_in_on_small_target() {
        let mut zoom = engine();
        let now = Instant::now();
        assert!(zoom.auto_adjust(60, now));
        assert!((zoom.level() - 1.1).abs() < 1e-9);
        assert_eq!(zoom.dead_zone_px(), 73);
    }

    #[test]
    fn test_auto_zoom_out_on_large_target() {
        let mut zoom = engine();
        zoom.adjust_level(1.0);
        assert!(zoom.auto_adjust(450, Instant::now()));
        assert!((zoom.level() - 1.9).abs() < 1e-9);
    }

    #[test]
    fn test_auto_zoom_noop_inside_band_and_at_limits() {
        let mut zoom = engine();
        let now = Instant::now();
        assert!(!zoom.auto_adjust(200, now));
        // Already at minimum, large target cannot zoom out further.
        assert!(!zoom.auto_adjust(500, now));
        assert_eq!(zoom.level(), 1.0);
    }

    #[test]
    fn test_auto_zoom_rate_limited() {
        let mut zoom = engine();
        let t0 = Instant::now();
        assert!(zoom.auto_adjust(60, t0));
        assert!(!zoom.auto_adjust(60, t0 + Duration::from_millis(500)));
        assert!((zoom.level() - 1.1).abs() < 1e-9);
        assert!(zoom.auto_adjust(60, t0 + Duration::from_millis(1001)));
        assert!((zoom.level() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_auto_zoom_never_leaves_bounds() {
        let mut zoom = engine();
        let mut now = Instant::now();
        for i in 0..200 {
            let width = if i % 3 == 0 { 500 } else { 10 };
            zoom.auto_adjust(width, now);
            assert!((1.0..=5.0).contains(&zoom.level()));
            assert!(zoom.dead_zone_px() >= 20);
            now += Duration::from_millis(1100);
        }
    }

    #[test]
    fn test_classify() {
        let zoom = engine();
        assert_eq!(zoom.classify(60), TargetSizeClass::TooSmall);
        assert_eq!(zoom.classify(80), TargetSizeClass::Ideal);
        assert_eq!(zoom.classify(400), TargetSizeClass::Ideal);
        assert_eq!(zoom.classify(401), TargetSizeClass::TooLarge);
    }

    #[test]
    fn test_crop_window() {
        let mut zoom = engine();
        assert_eq!(zoom.crop_window(1280, 720), (0, 0, 1280, 720));
        zoom.adjust_level(1.0);
        assert_eq!(zoom.crop_window(1280, 720), (320, 180, 640, 360));
    }

    #[test]
    fn test_apply_crop_identity_at_level_one() {
        let zoom = engine();
        let frame = Frame::from_fn(64, 48, |x, y| Rgb([x as u8, y as u8, 0]));
        let out = zoom.apply_crop(frame.clone());
        assert_eq!(out, frame);
    }

    #[test]
    fn test_apply_crop_keeps_resolution_and_magnifies_center() {
        let mut zoom = engine();
        zoom.adjust_level(1.0);
        // Left half black, right half white: a 2x zoom keeps the split at the center.
        let frame = Frame::from_fn(64, 48, |x, _| {
            if x < 32 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let out = zoom.apply_crop(frame);
        assert_eq!(out.dimensions(), (64, 48));
        assert_eq!(out.get_pixel(2, 24), &Rgb([0, 0, 0]));
        assert_eq!(out.get_pixel(61, 24), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_validate() {
        assert!(ZoomConfig::default().validate().is_ok());
        let bad = ZoomConfig {
            min_level: 3.0,
            max_level: 2.0,
            ..ZoomConfig::default()
        };
        assert!(bad.validate().is_err());
        let zero = ZoomConfig {
            min_level: 0.0,
            ..ZoomConfig::default()
        };
        assert!(zero.validate().is_err());
    }
}
