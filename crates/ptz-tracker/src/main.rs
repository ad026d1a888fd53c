//! Pan/tilt tracker binary.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::Context;
use metrics_exporter_prometheus::PrometheusBuilder;
use ptz_actuator::{ActuatorLink, HttpActuatorLink};
use ptz_tracker::commands::{spawn_ctrl_c, spawn_line_reader};
use ptz_tracker::logging::init_tracing;
use ptz_tracker::{
    CommandQueue, LogSink, StopReason, TrackerConfig, TrackingController, TrackingLoop,
};
use ptz_vision::{
    FrameSource, HttpDetector, ImageSequenceSource, NullDetector, TargetDetector,
};
use tokio::io::BufReader;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .ok();

    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting ptz-tracker");

    if let Err(e) = run().await {
        error!("Tracker failed: {:#}", e);
        std::process::exit(1);
    }

    info!("Tracker shutdown complete");
    // The stdin reader may still be parked in a blocking read.
    std::process::exit(0);
}

async fn run() -> anyhow::Result<()> {
    let config = TrackerConfig::from_env();
    config.validate().context("invalid configuration")?;
    info!("Tracker config: {:?}", config);

    if let Some(addr) = &config.metrics_addr {
        let addr: SocketAddr = addr
            .parse()
            .with_context(|| format!("invalid PTZ_METRICS_ADDR '{addr}'"))?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to start Prometheus exporter")?;
        info!("Metrics exporter listening on {}", addr);
    }

    let link = HttpActuatorLink::new(config.actuator.clone())
        .context("failed to create actuator link")?;
    match link.query_pose().await {
        Ok(pose) => info!("Actuator reachable at {}", pose),
        Err(e) => warn!("Actuator not answering yet: {}", e),
    }

    let source = build_source(&config)?;
    let detector = build_detector(&config)?;

    let (tx, commands) = CommandQueue::new();
    spawn_line_reader(BufReader::new(tokio::io::stdin()), tx.clone());
    spawn_ctrl_c(tx);

    let controller = TrackingController::new(link, config.clone(), Instant::now());
    let tracking = TrackingLoop::new(
        controller,
        source,
        detector,
        Box::new(LogSink::new(Duration::from_secs(1))),
        commands,
    )
    .with_tick_interval(config.tick_interval);

    let (summary, controller) = tracking.run().await;
    drop(controller.into_link());

    match summary.stop {
        StopReason::SourceFailed(reason) => {
            anyhow::bail!("frame source failed after {} ticks: {}", summary.ticks, reason)
        }
        stop => {
            info!(ticks = summary.ticks, ?stop, "Tracking finished");
            Ok(())
        }
    }
}

fn build_source(config: &TrackerConfig) -> anyhow::Result<Box<dyn FrameSource>> {
    if let Some(dir) = &config.frame_dir {
        let source = ImageSequenceSource::open(dir)
            .with_context(|| format!("failed to open frame directory {}", dir.display()))?
            .looping(config.frame_loop)
            .with_resolution(config.frame_width, config.frame_height);
        return Ok(Box::new(source));
    }

    camera_source(config)
}

#[cfg(feature = "opencv")]
fn camera_source(config: &TrackerConfig) -> anyhow::Result<Box<dyn FrameSource>> {
    let camera = ptz_vision::CameraSource::open(
        config.camera_index,
        config.frame_width,
        config.frame_height,
    )
    .context("failed to open camera")?;
    Ok(Box::new(camera))
}

#[cfg(not(feature = "opencv"))]
fn camera_source(_config: &TrackerConfig) -> anyhow::Result<Box<dyn FrameSource>> {
    anyhow::bail!("no frame source: set PTZ_FRAME_DIR or build with the `opencv` feature")
}

fn build_detector(config: &TrackerConfig) -> anyhow::Result<Box<dyn TargetDetector>> {
    if let Some(detector) = &config.detector {
        info!("Using detection service at {}", detector.base_url);
        let detector = HttpDetector::new(detector.clone())
            .context("failed to create detector client")?;
        return Ok(Box::new(detector));
    }

    if let Some(detector) = cascade_detector(config)? {
        return Ok(detector);
    }

    warn!("No detector configured; auto-track will never see a target");
    Ok(Box::new(NullDetector))
}

#[cfg(feature = "opencv")]
fn cascade_detector(config: &TrackerConfig) -> anyhow::Result<Option<Box<dyn TargetDetector>>> {
    let Some(path) = &config.cascade_path else {
        return Ok(None);
    };
    info!("Using Haar cascade {}", path);
    let detector =
        ptz_vision::CascadeDetector::load(path).context("failed to load face cascade")?;
    Ok(Some(Box::new(detector)))
}

#[cfg(not(feature = "opencv"))]
fn cascade_detector(config: &TrackerConfig) -> anyhow::Result<Option<Box<dyn TargetDetector>>> {
    if config.cascade_path.is_some() {
        warn!("PTZ_CASCADE_PATH is set but this build has no `opencv` feature");
    }
    Ok(None)
}
