//! End-to-end loop runs over an on-disk frame sequence.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use image::{Rgb, RgbImage};
use ptz_actuator::{ActuatorError, ActuatorLink, ActuatorResult};
use ptz_models::{ActuatorPose, OperatorCommand, OperatorEvent, PixelBox, PixelPoint, TrackingMode};
use ptz_tracker::{CommandQueue, NullSink, StopReason, TrackerConfig, TrackingController, TrackingLoop};
use ptz_vision::{Frame, ImageSequenceSource, NullDetector, TargetDetector, VisionError, VisionResult};

#[derive(Clone, Default)]
struct RecordingLink(Arc<Mutex<Vec<ActuatorPose>>>);

impl RecordingLink {
    fn sent(&self) -> Vec<ActuatorPose> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl ActuatorLink for RecordingLink {
    async fn query_pose(&self) -> ActuatorResult<ActuatorPose> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .last()
            .copied()
            .unwrap_or(ActuatorPose::new(90.0, 150.0)))
    }

    async fn set_pose(&self, pose: ActuatorPose) -> ActuatorResult<ActuatorPose> {
        self.0.lock().unwrap().push(pose);
        Ok(pose)
    }

    fn name(&self) -> &str {
        "recording"
    }
}

struct FixedDetector(Vec<PixelBox>);

#[async_trait]
impl TargetDetector for FixedDetector {
    async fn detect(&mut self, _frame: &Frame) -> VisionResult<Vec<PixelBox>> {
        Ok(self.0.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

struct BrokenDetector;

#[async_trait]
impl TargetDetector for BrokenDetector {
    async fn detect(&mut self, _frame: &Frame) -> VisionResult<Vec<PixelBox>> {
        Err(VisionError::detector_failure("model not loaded"))
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

fn write_frames(dir: &Path, count: usize) {
    for i in 0..count {
        RgbImage::from_pixel(32, 18, Rgb([0, 0, 0]))
            .save(dir.join(format!("{i:04}.png")))
            .unwrap();
    }
}

fn source(dir: &Path) -> Box<ImageSequenceSource> {
    Box::new(ImageSequenceSource::open(dir).unwrap())
}

#[tokio::test]
async fn test_click_then_exit_stops_after_one_tick() {
    let frames = tempfile::tempdir().unwrap();
    write_frames(frames.path(), 5);

    let link = RecordingLink::default();
    let controller =
        TrackingController::new(link.clone(), TrackerConfig::default(), Instant::now());
    let (tx, commands) = CommandQueue::new();
    tx.send(OperatorEvent::Click {
        point: PixelPoint::new(740, 360),
    })
    .await
    .unwrap();
    tx.send(OperatorCommand::Exit.into()).await.unwrap();

    let tracking = TrackingLoop::new(
        controller,
        source(frames.path()),
        NullDetector,
        Box::new(NullSink),
        commands,
    );
    let (summary, _) = tracking.run().await;

    assert_eq!(summary.stop, StopReason::ExitRequested);
    assert_eq!(summary.ticks, 1);
    let sent = link.sent();
    assert_eq!(sent.len(), 1);
    assert!((sent[0].pan - 75.0).abs() < 1e-9, "{sent:?}");
}

#[tokio::test]
async fn test_auto_track_until_source_exhausted() {
    let frames = tempfile::tempdir().unwrap();
    write_frames(frames.path(), 3);

    let link = RecordingLink::default();
    let config = TrackerConfig {
        start_mode: TrackingMode::AutoTrack,
        auto_move_interval: Duration::from_secs(60),
        auto_zoom: false,
        ..TrackerConfig::default()
    };
    let controller = TrackingController::new(link.clone(), config, Instant::now());
    let (_tx, commands) = CommandQueue::new();

    let tracking = TrackingLoop::new(
        controller,
        source(frames.path()),
        FixedDetector(vec![
            PixelBox::new(10, 10, 20, 20),
            PixelBox::new(950, 310, 100, 100),
        ]),
        Box::new(NullSink),
        commands,
    );
    let (summary, controller) = tracking.run().await;

    assert_eq!(summary.stop, StopReason::SourceExhausted);
    assert_eq!(summary.ticks, 3);
    // one move, the rest rate limited
    assert_eq!(link.sent().len(), 1);
    assert_eq!(controller.status(Instant::now()).state, ptz_tracker::ControllerState::Tracking);
}

#[tokio::test]
async fn test_detector_failure_counts_as_lost_target() {
    let frames = tempfile::tempdir().unwrap();
    write_frames(frames.path(), 4);

    let link = RecordingLink::default();
    let config = TrackerConfig {
        start_mode: TrackingMode::AutoTrack,
        no_target_timeout: Duration::ZERO,
        ..TrackerConfig::default()
    };
    let start = Instant::now() - Duration::from_millis(10);
    let controller = TrackingController::new(link.clone(), config, start);
    let (_tx, commands) = CommandQueue::new();

    let tracking = TrackingLoop::new(
        controller,
        source(frames.path()),
        BrokenDetector,
        Box::new(NullSink),
        commands,
    );
    let (summary, controller) = tracking.run().await;

    assert_eq!(summary.ticks, 4);
    assert_eq!(link.sent(), vec![ActuatorPose::new(90.0, 150.0)]);
    assert!(controller.recovery().recovering);
}

#[tokio::test]
async fn test_unreachable_actuator_is_not_fatal() {
    struct DeadLink;

    #[async_trait]
    impl ActuatorLink for DeadLink {
        async fn query_pose(&self) -> ActuatorResult<ActuatorPose> {
            Err(ActuatorError::unreachable("connection refused"))
        }

        async fn set_pose(&self, _pose: ActuatorPose) -> ActuatorResult<ActuatorPose> {
            Err(ActuatorError::unreachable("connection refused"))
        }

        fn name(&self) -> &str {
            "dead"
        }
    }

    let frames = tempfile::tempdir().unwrap();
    write_frames(frames.path(), 3);

    let config = TrackerConfig {
        start_mode: TrackingMode::AutoTrack,
        ..TrackerConfig::default()
    };
    let controller = TrackingController::new(DeadLink, config, Instant::now());
    let (_tx, commands) = CommandQueue::new();

    let tracking = TrackingLoop::new(
        controller,
        source(frames.path()),
        FixedDetector(vec![PixelBox::new(1100, 600, 90, 90)]),
        Box::new(NullSink),
        commands,
    );
    let (summary, _) = tracking.run().await;

    assert_eq!(summary.stop, StopReason::SourceExhausted);
    assert_eq!(summary.ticks, 3);
}
