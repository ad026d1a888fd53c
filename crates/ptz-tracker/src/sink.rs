//! Frame sinks: where processed frames and status go for display.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use ptz_vision::Frame;
use tracing::info;

use crate::status::TrackerStatus;

/// Consumer of the zoomed frame and status snapshot, once per tick.
///
/// Sinks are for humans only; nothing they do feeds back into control.
#[async_trait]
pub trait FrameSink: Send {
    async fn present(&mut self, frame: &Frame, status: &TrackerStatus);

    fn name(&self) -> &'static str;
}

/// Logs the status line at most once per period.
pub struct LogSink {
    period: Duration,
    last: Option<Instant>,
    presented: u64,
}

impl LogSink {
    /// Log at most once per `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last: None,
            presented: 0,
        }
    }

    /// Frames seen so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

#[async_trait]
impl FrameSink for LogSink {
    async fn present(&mut self, frame: &Frame, status: &TrackerStatus) {
        self.presented += 1;
        let now = Instant::now();
        let due = self
            .last
            .map_or(true, |t| now.saturating_duration_since(t) >= self.period);
        if due {
            self.last = Some(now);
            let (width, height) = frame.dimensions();
            info!(width, height, frames = self.presented, "{}", status.summary());
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

/// Drops everything.
#[derive(Debug, Default)]
pub struct NullSink;

#[async_trait]
impl FrameSink for NullSink {
    async fn present(&mut self, _frame: &Frame, _status: &TrackerStatus) {}

    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::ControllerState;
    use ptz_models::TrackingMode;

    fn status() -> TrackerStatus {
        TrackerStatus {
            mode: TrackingMode::ManualAim,
            state: ControllerState::Idle,
            zoom_level: 1.0,
            speed_factor: 1.0,
            dead_zone_px: 80,
            auto_zoom: true,
            last_pose: None,
            manual_target: None,
            seek_remaining_ms: None,
            target_size: None,
            target_area_ratio: None,
        }
    }

    #[test]
    fn test_log_sink_counts_every_frame() {
        let mut sink = LogSink::new(Duration::from_secs(3600));
        let frame = Frame::new(8, 8);
        for _ in 0..3 {
            tokio_test::block_on(sink.present(&frame, &status()));
        }
        assert_eq!(sink.presented(), 3);
        assert!(sink.last.is_some());
    }
}
