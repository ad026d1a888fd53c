//! Actuator HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use ptz_models::ActuatorPose;
use reqwest::{Client, Response};
use tracing::{debug, warn};
use url::Url;

use crate::error::{ActuatorError, ActuatorResult};
use crate::link::ActuatorLink;
use crate::types::{ControlRequest, PoseReport};

/// Configuration for the actuator link.
#[derive(Debug, Clone)]
pub struct ActuatorConfig {
    /// Base URL of the actuator board
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.43.185".to_string(),
            timeout: Duration::from_secs(2),
        }
    }
}

impl ActuatorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("PTZ_ACTUATOR_URL")
                .unwrap_or_else(|_| "http://192.168.43.185".to_string()),
            timeout: Duration::from_millis(
                std::env::var("PTZ_ACTUATOR_TIMEOUT_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2000),
            ),
        }
    }

    /// Parse the base URL. A bare host or IP is treated as `http://`.
    pub fn base(&self) -> ActuatorResult<Url> {
        let raw = self.base_url.trim();
        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{raw}")
        };
        Url::parse(&with_scheme)
            .map_err(|e| ActuatorError::InvalidConfig(format!("{}: {e}", self.base_url)))
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

/// Actuator link over HTTP.
pub struct HttpActuatorLink {
    http: Client,
    config: ActuatorConfig,
    status_url: Url,
    control_url: Url,
}

impl HttpActuatorLink {
    /// Create a new link.
    pub fn new(config: ActuatorConfig) -> ActuatorResult<Self> {
        let base = config.base()?;
        let status_url = base
            .join("/status")
            .map_err(|e| ActuatorError::InvalidConfig(e.to_string()))?;
        let control_url = base
            .join("/control")
            .map_err(|e| ActuatorError::InvalidConfig(e.to_string()))?;

        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ActuatorError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            http,
            config,
            status_url,
            control_url,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ActuatorResult<Self> {
        Self::new(ActuatorConfig::from_env())
    }

    pub fn config(&self) -> &ActuatorConfig {
        &self.config
    }

    async fn read_pose(&self, response: Response) -> ActuatorResult<ActuatorPose> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Actuator responded {}: {}", status, body);
            return Err(ActuatorError::bad_response(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ActuatorError::from_reqwest(e, self.config.timeout_ms()))?;
        let report: PoseReport = serde_json::from_str(&body)
            .map_err(|e| ActuatorError::bad_response(format!("{e}: {body}")))?;

        if !report.pan.is_finite() || !report.tilt.is_finite() {
            return Err(ActuatorError::bad_response(format!(
                "non-finite pose: {body}"
            )));
        }
        Ok(report.into())
    }
}

#[async_trait]
impl ActuatorLink for HttpActuatorLink {
    async fn query_pose(&self) -> ActuatorResult<ActuatorPose> {
        debug!("Querying actuator status at {}", self.status_url);

        let response = self
            .http
            .get(self.status_url.clone())
            .send()
            .await
            .map_err(|e| ActuatorError::from_reqwest(e, self.config.timeout_ms()))?;

        self.read_pose(response).await
    }

    async fn set_pose(&self, pose: ActuatorPose) -> ActuatorResult<ActuatorPose> {
        let request = ControlRequest::from(&pose);
        debug!(
            pan = request.pan,
            tilt = request.tilt,
            "Sending actuator control to {}", self.control_url
        );

        let response = self
            .http
            .post(self.control_url.clone())
            .form(&request)
            .send()
            .await
            .map_err(|e| ActuatorError::from_reqwest(e, self.config.timeout_ms()))?;

        self.read_pose(response).await
    }

    fn name(&self) -> &str {
        &self.config.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ActuatorConfig::default();
        assert_eq!(config.base_url, "http://192.168.43.185");
        assert_eq!(config.timeout, Duration::from_secs(2));
    }

    #[test]
    fn test_bare_ip_gets_http_scheme() {
        let config = ActuatorConfig {
            base_url: "10.0.0.7".to_string(),
            ..ActuatorConfig::default()
        };
        assert_eq!(config.base().unwrap().as_str(), "http://10.0.0.7/");
    }

    #[test]
    fn test_endpoint_urls() {
        let link = HttpActuatorLink::new(ActuatorConfig {
            base_url: "http://10.0.0.7:8080".to_string(),
            ..ActuatorConfig::default()
        })
        .unwrap();
        assert_eq!(link.status_url.as_str(), "http://10.0.0.7:8080/status");
        assert_eq!(link.control_url.as_str(), "http://10.0.0.7:8080/control");
    }

    #[test]
    fn test_invalid_url() {
        let result = HttpActuatorLink::new(ActuatorConfig {
            base_url: "http://".to_string(),
            ..ActuatorConfig::default()
        });
        assert!(matches!(result, Err(ActuatorError::InvalidConfig(_))));
    }
}
