//! Vision side of the tracker.
//!
//! This crate provides:
//! - Frame sources (image directory, OpenCV camera behind the `opencv` feature)
//! - The software zoom engine and its derived dead zone / sensitivity
//! - Target detectors (HTTP service, Haar cascade, null) and largest-box selection

pub mod acquisition;
#[cfg(feature = "opencv")]
pub mod camera;
pub mod detector;
pub mod error;
pub mod frame;
pub mod source;
pub mod zoom;

pub use acquisition::{Acquisition, TargetAcquisition};
pub use detector::{HttpDetector, HttpDetectorConfig, NullDetector, TargetDetector};
pub use error::{VisionError, VisionResult};
pub use frame::Frame;
pub use source::{FrameSource, ImageSequenceSource};
pub use zoom::{TargetSizeClass, ZoomConfig, ZoomEngine};

#[cfg(feature = "opencv")]
pub use camera::{CameraSource, CascadeDetector};
