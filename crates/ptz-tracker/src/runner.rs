//! The tracking loop.
//!
//! One tick per frame, run to completion before the next:
//! operator input → frame → zoom crop → detection → control → sink.

use std::time::{Duration, Instant};

use ptz_actuator::ActuatorLink;
use ptz_vision::{Acquisition, FrameSource, TargetAcquisition, TargetDetector, VisionError};
use tracing::{error, info};

use crate::commands::CommandQueue;
use crate::controller::TrackingController;
use crate::metrics;
use crate::sink::FrameSink;

/// Why the loop stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The operator asked to exit.
    ExitRequested,
    /// The frame source has no more frames.
    SourceExhausted,
    /// The frame source failed.
    SourceFailed(String),
}

/// Loop summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub stop: StopReason,
}

/// Owns every loop resource and runs ticks until told to stop.
pub struct TrackingLoop<L: ActuatorLink, D: TargetDetector> {
    controller: TrackingController<L>,
    source: Box<dyn FrameSource>,
    acquisition: TargetAcquisition<D>,
    sink: Box<dyn FrameSink>,
    commands: CommandQueue,
    tick_interval: Duration,
}

impl<L: ActuatorLink, D: TargetDetector> TrackingLoop<L, D> {
    /// Assemble a loop with no tick pacing.
    pub fn new(
        controller: TrackingController<L>,
        source: Box<dyn FrameSource>,
        detector: D,
        sink: Box<dyn FrameSink>,
        commands: CommandQueue,
    ) -> Self {
        Self {
            controller,
            source,
            acquisition: TargetAcquisition::new(detector),
            sink,
            commands,
            tick_interval: Duration::ZERO,
        }
    }

    /// Pace ticks to at most one per `interval`.
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    /// The controller driven by this loop.
    pub fn controller(&self) -> &TrackingController<L> {
        &self.controller
    }

    /// Run until exit or frame source failure, then release the source.
    ///
    /// Returns the controller so the caller can tear down the link.
    pub async fn run(mut self) -> (RunSummary, TrackingController<L>) {
        info!(
            source = self.source.name(),
            detector = self.acquisition.detector_name(),
            sink = self.sink.name(),
            mode = %self.controller.mode(),
            "Tracking loop started"
        );

        let mut ticks = 0u64;
        let stop = loop {
            let started = Instant::now();

            if let Err(e) = self.tick(started).await {
                break match e {
                    VisionError::SourceExhausted => {
                        info!("Frame source exhausted");
                        StopReason::SourceExhausted
                    }
                    other => {
                        error!("Frame acquisition failed: {}", other);
                        StopReason::SourceFailed(other.to_string())
                    }
                };
            }
            ticks += 1;

            if self.controller.exit_requested() {
                break StopReason::ExitRequested;
            }

            let elapsed = started.elapsed();
            if elapsed < self.tick_interval {
                tokio::time::sleep(self.tick_interval - elapsed).await;
            }
        };

        self.source.release();
        info!(ticks, ?stop, "Tracking loop stopped");
        (RunSummary { ticks, stop }, self.controller)
    }

    /// One tick. Only frame acquisition errors escape.
    async fn tick(&mut self, started: Instant) -> Result<(), VisionError> {
        for event in self.commands.drain() {
            self.controller.apply_event(event, started).await;
        }

        let frame = self.source.next_frame().await?;
        let frame = self.controller.zoom().apply_crop(frame);
        let now = Instant::now();

        if self.controller.wants_detection() {
            let acquisition = self.acquisition.acquire(&frame, now).await;
            if let Acquisition::DetectorFailed(_) = acquisition {
                metrics::record_detector_failure(self.acquisition.detector_name());
            }
            self.controller
                .on_observation(acquisition.observation(), now)
                .await;
        }

        metrics::record_tick(self.controller.mode().as_str());
        let status = self.controller.status(now);
        self.sink.present(&frame, &status).await;
        Ok(())
    }
}
