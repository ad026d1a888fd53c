//! Error types for frame and detection operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for vision operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// Errors that can occur while acquiring frames or detecting targets.
#[derive(Debug, Error)]
pub enum VisionError {
    #[error("Target detection failed: {0}")]
    DetectorFailure(String),

    #[error("Frame acquisition failed: {0}")]
    FrameAcquisition(String),

    #[error("Frame source exhausted")]
    SourceExhausted,

    #[error("No frames found in {0}")]
    EmptySource(PathBuf),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl VisionError {
    /// Create a detector failure error.
    pub fn detector_failure(message: impl Into<String>) -> Self {
        Self::DetectorFailure(message.into())
    }

    /// Create a frame acquisition error.
    pub fn frame_acquisition(message: impl Into<String>) -> Self {
        Self::FrameAcquisition(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error means the frame source cannot deliver any more frames.
    pub fn is_acquisition_failure(&self) -> bool {
        matches!(
            self,
            VisionError::FrameAcquisition(_)
                | VisionError::SourceExhausted
                | VisionError::EmptySource(_)
        )
    }
}
