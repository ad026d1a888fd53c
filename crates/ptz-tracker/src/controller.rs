//! Closed-loop tracking controller.
//!
//! The controller owns every piece of mutable tracking state: zoom, mode,
//! the lost-target window, the move timer and the pose cache. It is driven
//! one tick at a time and talks to the actuator through [`ActuatorLink`],
//! awaiting each call before the next, so at most one command is in flight.
//!
//! Per observation in auto-track:
//! 1. skip if the target is inside the dead zone on both axes
//! 2. skip if the last move was too recent
//! 3. query the pose, add `error * gain / zoom`, clamp, command it
//! 4. run one auto-zoom regulation step
//!
//! Manual aim skips step 1 and uses the manual gains.

use std::time::{Duration, Instant};

use ptz_actuator::{ActuatorError, ActuatorLink};
use ptz_models::{
    ActuatorPose, OperatorCommand, OperatorEvent, PixelPoint, TargetObservation, TrackingMode,
};
use ptz_vision::ZoomEngine;
use tracing::{debug, error, info, warn};

use crate::config::TrackerConfig;
use crate::metrics;
use crate::mode::{ModeManager, RecoveryState};
use crate::status::{area_ratio, ControllerState, TrackerStatus};

/// What happened to one correction attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The actuator confirmed this pose.
    Moved(ActuatorPose),
    /// Target inside the dead zone; nothing sent.
    WithinDeadZone,
    /// Last move too recent; nothing sent.
    RateLimited,
    /// Pose query failed; nothing sent.
    QueryFailed(String),
    /// The move command failed.
    CommandFailed(String),
}

impl MoveOutcome {
    /// The confirmed pose, if the actuator moved.
    pub fn moved(&self) -> Option<ActuatorPose> {
        match self {
            MoveOutcome::Moved(pose) => Some(*pose),
            _ => None,
        }
    }
}

/// Tracking controller over an actuator link.
pub struct TrackingController<L: ActuatorLink> {
    link: L,
    config: TrackerConfig,
    frame_center: PixelPoint,
    zoom: ZoomEngine,
    modes: ModeManager,
    recovery: RecoveryState,
    state: ControllerState,
    auto_zoom: bool,
    last_move: Option<Instant>,
    last_pose: Option<ActuatorPose>,
    last_observation: Option<TargetObservation>,
    manual_target: Option<PixelPoint>,
    exit_requested: bool,
}

impl<L: ActuatorLink> TrackingController<L> {
    /// Create a controller in the configured start mode.
    ///
    /// `now` opens the first lost-target window.
    pub fn new(link: L, config: TrackerConfig, now: Instant) -> Self {
        let modes = ModeManager::new(config.start_mode);
        let state = initial_state(modes.mode());
        let zoom = ZoomEngine::new(config.zoom.clone());
        metrics::set_zoom_level(zoom.level());
        Self {
            link,
            frame_center: config.frame_center(),
            zoom,
            modes,
            recovery: RecoveryState::new(now),
            state,
            auto_zoom: config.auto_zoom,
            last_move: None,
            last_pose: None,
            last_observation: None,
            manual_target: None,
            exit_requested: false,
            config,
        }
    }

    /// Active tracking mode.
    pub fn mode(&self) -> TrackingMode {
        self.modes.mode()
    }

    /// Current controller state.
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Zoom engine, for cropping the next frame.
    pub fn zoom(&self) -> &ZoomEngine {
        &self.zoom
    }

    /// Lost-target window.
    pub fn recovery(&self) -> &RecoveryState {
        &self.recovery
    }

    /// Whether auto-zoom regulation is on.
    pub fn auto_zoom_enabled(&self) -> bool {
        self.auto_zoom
    }

    /// Last pose the actuator confirmed.
    pub fn last_pose(&self) -> Option<ActuatorPose> {
        self.last_pose
    }

    /// Whether the operator asked to exit.
    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// The actuator link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Whether this tick should run the detector.
    pub fn wants_detection(&self) -> bool {
        self.modes.is_auto()
    }

    /// Feed the tick's detection result. Ignored outside auto-track.
    pub async fn on_observation(
        &mut self,
        observation: Option<TargetObservation>,
        now: Instant,
    ) -> Option<MoveOutcome> {
        if !self.modes.is_auto() {
            return None;
        }

        match observation {
            Some(obs) => {
                self.state = ControllerState::Tracking;
                self.recovery.mark_seen(now);
                self.last_observation = Some(obs);

                let outcome = self.correct(&obs, TrackingMode::AutoTrack, now).await;

                if self.auto_zoom && self.zoom.auto_adjust(obs.width, now) {
                    metrics::set_zoom_level(self.zoom.level());
                }
                Some(outcome)
            }
            None => {
                self.last_observation = None;
                if self.recovery.recovering {
                    self.state = ControllerState::Recovering;
                    None
                } else if self.recovery.is_due(now, self.config.no_target_timeout) {
                    Some(self.recover().await)
                } else {
                    self.state = ControllerState::Seeking;
                    None
                }
            }
        }
    }

    /// Manual aim at a clicked point. Ignored outside manual aim.
    pub async fn on_click(&mut self, point: PixelPoint, now: Instant) -> Option<MoveOutcome> {
        if self.modes.is_auto() {
            debug!(x = point.x, y = point.y, "Click ignored while auto-tracking");
            return None;
        }
        self.manual_target = Some(point);
        let obs = TargetObservation::from_click(point, now);
        Some(self.correct(&obs, TrackingMode::ManualAim, now).await)
    }

    /// Send the center pose and restart the lost-target window.
    pub async fn center_now(&mut self, now: Instant) -> MoveOutcome {
        self.manual_target = None;
        self.recovery.restart(now);
        self.state = initial_state(self.modes.mode());
        info!("Centering on operator request");
        self.send_center("center").await
    }

    /// Switch modes, clearing the click marker and the last observation.
    pub fn toggle_mode(&mut self, now: Instant) -> TrackingMode {
        let mode = self.modes.toggle(&mut self.recovery, now);
        self.manual_target = None;
        self.last_observation = None;
        self.state = initial_state(mode);
        mode
    }

    /// Step zoom in. Returns the new level.
    pub fn zoom_in(&mut self) -> f64 {
        let level = self.zoom.zoom_in();
        self.log_zoom("in");
        level
    }

    /// Step zoom out. Returns the new level.
    pub fn zoom_out(&mut self) -> f64 {
        let level = self.zoom.zoom_out();
        self.log_zoom("out");
        level
    }

    /// Back to zoom 1.0.
    pub fn zoom_reset(&mut self) -> f64 {
        self.zoom.reset();
        self.log_zoom("reset");
        self.zoom.level()
    }

    /// Flip auto-zoom. Returns whether it is now on.
    pub fn toggle_auto_zoom(&mut self) -> bool {
        self.auto_zoom = !self.auto_zoom;
        info!(auto_zoom = self.auto_zoom, "Auto-zoom toggled");
        self.auto_zoom
    }

    /// Apply one operator command.
    pub async fn apply_command(&mut self, command: OperatorCommand, now: Instant) {
        match command {
            OperatorCommand::ToggleMode => {
                self.toggle_mode(now);
            }
            OperatorCommand::CenterNow => {
                self.center_now(now).await;
            }
            OperatorCommand::ZoomIn => {
                self.zoom_in();
            }
            OperatorCommand::ZoomOut => {
                self.zoom_out();
            }
            OperatorCommand::ZoomReset => {
                self.zoom_reset();
            }
            OperatorCommand::ToggleAutoZoom => {
                self.toggle_auto_zoom();
            }
            OperatorCommand::Exit => {
                info!("Exit requested");
                self.exit_requested = true;
            }
        }
    }

    /// Apply one operator event (command or click).
    pub async fn apply_event(&mut self, event: OperatorEvent, now: Instant) {
        match event {
            OperatorEvent::Command { command } => self.apply_command(command, now).await,
            OperatorEvent::Click { point } => {
                self.on_click(point, now).await;
            }
        }
    }

    /// Snapshot for overlays.
    pub fn status(&self, now: Instant) -> TrackerStatus {
        let dead_zone_px = self.zoom.dead_zone_px();
        let seek_remaining_ms = match self.state {
            ControllerState::Seeking => self
                .recovery
                .remaining(now, self.config.no_target_timeout)
                .map(|d| d.as_millis() as u64),
            _ => None,
        };
        let tracked = self
            .last_observation
            .filter(|_| self.state == ControllerState::Tracking);

        TrackerStatus {
            mode: self.modes.mode(),
            state: self.state,
            zoom_level: self.zoom.level(),
            speed_factor: self.zoom.sensitivity_scale(),
            dead_zone_px,
            auto_zoom: self.auto_zoom,
            last_pose: self.last_pose,
            manual_target: self.manual_target,
            seek_remaining_ms,
            target_size: tracked.map(|obs| self.zoom.classify(obs.width)),
            target_area_ratio: tracked.and_then(|obs| area_ratio(obs.area(), dead_zone_px)),
        }
    }

    /// Release the link at shutdown.
    pub fn into_link(self) -> L {
        self.link
    }

    async fn correct(
        &mut self,
        obs: &TargetObservation,
        mode: TrackingMode,
        now: Instant,
    ) -> MoveOutcome {
        if mode == TrackingMode::AutoTrack {
            let (dx, dy) = obs.center.abs_diff(&self.frame_center);
            let dead_zone = self.zoom.dead_zone_px();
            if dx <= dead_zone && dy <= dead_zone {
                return MoveOutcome::WithinDeadZone;
            }
        }

        if !interval_elapsed(self.last_move, now, self.config.move_interval(mode)) {
            return MoveOutcome::RateLimited;
        }

        let current = match self.link.query_pose().await {
            Ok(pose) => pose,
            Err(e) => {
                warn!(link = self.link.name(), "Pose query failed, skipping move: {}", e);
                metrics::record_actuator_error("query_pose", e.kind());
                return MoveOutcome::QueryFailed(e.to_string());
            }
        };

        let target = self.corrected_pose(current, obs.center, mode);
        match self.link.set_pose(target).await {
            Ok(confirmed) => {
                self.last_move = Some(now);
                self.last_pose = Some(confirmed);
                metrics::record_move(mode.as_str());
                debug!(
                    pan = confirmed.pan,
                    tilt = confirmed.tilt,
                    zoom = self.zoom.level(),
                    "Moved"
                );
                MoveOutcome::Moved(confirmed)
            }
            Err(e) => {
                self.report_command_error(&e);
                MoveOutcome::CommandFailed(e.to_string())
            }
        }
    }

    /// `current + error * gain / zoom`, clamped to the limits.
    fn corrected_pose(
        &self,
        current: ActuatorPose,
        point: PixelPoint,
        mode: TrackingMode,
    ) -> ActuatorPose {
        let gains = self.config.gains(mode);
        let scale = self.zoom.sensitivity_scale();
        let diff_x = f64::from(self.frame_center.x) - f64::from(point.x);
        let diff_y = f64::from(point.y) - f64::from(self.frame_center.y);
        self.config.limits.clamp(current.offset(
            diff_x * gains.pan * scale,
            diff_y * gains.tilt * scale,
        ))
    }

    async fn recover(&mut self) -> MoveOutcome {
        warn!(
            timeout_ms = self.config.no_target_timeout.as_millis() as u64,
            "Target lost, returning to center"
        );
        let outcome = self.send_center("recovery").await;
        self.zoom.reset();
        metrics::set_zoom_level(self.zoom.level());
        metrics::record_recovery();
        self.recovery.recovering = true;
        self.state = ControllerState::Recovering;
        outcome
    }

    async fn send_center(&mut self, reason: &'static str) -> MoveOutcome {
        let center = self.config.limits.clamp(self.config.center_pose);
        match self.link.set_pose(center).await {
            Ok(confirmed) => {
                self.last_pose = Some(confirmed);
                metrics::record_move(reason);
                MoveOutcome::Moved(confirmed)
            }
            Err(e) => {
                self.report_command_error(&e);
                MoveOutcome::CommandFailed(e.to_string())
            }
        }
    }

    fn report_command_error(&self, e: &ActuatorError) {
        if e.is_retryable() {
            warn!(link = self.link.name(), "Move command failed: {}", e);
        } else {
            error!(link = self.link.name(), "Move command rejected: {}", e);
        }
        metrics::record_actuator_error("set_pose", e.kind());
    }

    fn log_zoom(&self, action: &str) {
        metrics::set_zoom_level(self.zoom.level());
        info!(
            zoom = self.zoom.level(),
            dead_zone = self.zoom.dead_zone_px(),
            "Zoom {}",
            action
        );
    }
}

fn initial_state(mode: TrackingMode) -> ControllerState {
    match mode {
        TrackingMode::ManualAim => ControllerState::Idle,
        TrackingMode::AutoTrack => ControllerState::Seeking,
    }
}

/// A zero interval never limits.
fn interval_elapsed(last: Option<Instant>, now: Instant, interval: Duration) -> bool {
    if interval.is_zero() {
        return true;
    }
    last.map_or(true, |t| now.saturating_duration_since(t) > interval)
}
