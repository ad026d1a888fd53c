//! Target detectors.
//!
//! A detector turns a frame into zero or more pixel boxes. How it does that
//! is its own business; the tracker only relies on the box geometry.

use std::time::Duration;

use async_trait::async_trait;
use ptz_models::PixelBox;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{VisionError, VisionResult};
use crate::frame::{encode_jpeg, Frame};

/// Face/object detector.
#[async_trait]
pub trait TargetDetector: Send {
    /// Detect targets in a frame. An empty vector means nothing was found.
    async fn detect(&mut self, frame: &Frame) -> VisionResult<Vec<PixelBox>>;

    /// Detector name for logging.
    fn name(&self) -> &'static str;
}

#[async_trait]
impl<T: TargetDetector + ?Sized> TargetDetector for Box<T> {
    async fn detect(&mut self, frame: &Frame) -> VisionResult<Vec<PixelBox>> {
        (**self).detect(frame).await
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Detector that never finds anything. Used when only manual aim is wanted.
#[derive(Debug, Clone, Default)]
pub struct NullDetector;

#[async_trait]
impl TargetDetector for NullDetector {
    async fn detect(&mut self, _frame: &Frame) -> VisionResult<Vec<PixelBox>> {
        Ok(Vec::new())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

/// Configuration for the remote detection service.
#[derive(Debug, Clone)]
pub struct HttpDetectorConfig {
    /// Base URL of the detection service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// JPEG quality for uploaded frames
    pub jpeg_quality: u8,
}

impl Default for HttpDetectorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_millis(500),
            jpeg_quality: 80,
        }
    }
}

impl HttpDetectorConfig {
    /// Create config from environment variables. `None` when no URL is set.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("PTZ_DETECTOR_URL").ok()?;
        Some(Self {
            base_url,
            timeout: Duration::from_millis(
                std::env::var("PTZ_DETECTOR_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(500),
            ),
            ..Self::default()
        })
    }
}

/// Response of `POST /detect`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectResponse {
    #[serde(default)]
    pub boxes: Vec<PixelBox>,
}

/// Detector backed by an HTTP detection service.
///
/// Frames are uploaded as a JPEG multipart field named `frame`.
pub struct HttpDetector {
    http: Client,
    config: HttpDetectorConfig,
}

impl HttpDetector {
    pub fn new(config: HttpDetectorConfig) -> VisionResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| VisionError::internal(format!("detector client: {e}")))?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl TargetDetector for HttpDetector {
    async fn detect(&mut self, frame: &Frame) -> VisionResult<Vec<PixelBox>> {
        let url = format!("{}/detect", self.config.base_url.trim_end_matches('/'));
        let jpeg = encode_jpeg(frame, self.config.jpeg_quality)?;

        let part = Part::bytes(jpeg)
            .file_name("frame.jpg")
            .mime_str("image/jpeg")
            .map_err(|e| VisionError::detector_failure(e.to_string()))?;
        let form = Form::new().part("frame", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| VisionError::detector_failure(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::detector_failure(format!(
                "detector returned {}: {}",
                status, body
            )));
        }

        let parsed: DetectResponse = response
            .json()
            .await
            .map_err(|e| VisionError::detector_failure(format!("invalid detector response: {e}")))?;

        debug!("Detector returned {} boxes", parsed.boxes.len());
        Ok(parsed.boxes)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_null_detector_finds_nothing() {
        let mut detector = NullDetector;
        assert!(detector.detect(&Frame::new(4, 4)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_http_detector_parses_boxes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "boxes": [
                    {"x": 10, "y": 20, "width": 30, "height": 40, "score": 0.9},
                    {"x": 100, "y": 120, "width": 90, "height": 90}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut detector = HttpDetector::new(HttpDetectorConfig {
            base_url: server.uri(),
            ..HttpDetectorConfig::default()
        })
        .unwrap();

        let boxes = detector.detect(&Frame::new(32, 32)).await.unwrap();
        assert_eq!(
            boxes,
            vec![PixelBox::new(10, 20, 30, 40), PixelBox::new(100, 120, 90, 90)]
        );
    }

    #[tokio::test]
    async fn test_http_detector_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/detect"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let mut detector = HttpDetector::new(HttpDetectorConfig {
            base_url: server.uri(),
            ..HttpDetectorConfig::default()
        })
        .unwrap();

        assert!(matches!(
            detector.detect(&Frame::new(8, 8)).await,
            Err(VisionError::DetectorFailure(_))
        ));
    }
}
