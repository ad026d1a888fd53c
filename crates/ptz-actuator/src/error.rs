//! Actuator link error types.

use thiserror::Error;

pub type ActuatorResult<T> = Result<T, ActuatorError>;

#[derive(Debug, Error)]
pub enum ActuatorError {
    #[error("Actuator unreachable: {0}")]
    Unreachable(String),

    #[error("Actuator timed out after {0} ms")]
    Timeout(u64),

    #[error("Bad actuator response: {0}")]
    BadResponse(String),

    #[error("Invalid actuator config: {0}")]
    InvalidConfig(String),
}

impl ActuatorError {
    pub fn bad_response(msg: impl Into<String>) -> Self {
        Self::BadResponse(msg.into())
    }

    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::Unreachable(msg.into())
    }

    /// Classify a transport error. `timeout_ms` is the budget that was applied.
    pub fn from_reqwest(err: reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_decode() || err.is_status() {
            Self::BadResponse(err.to_string())
        } else {
            Self::Unreachable(err.to_string())
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ActuatorError::Unreachable(_) => "unreachable",
            ActuatorError::Timeout(_) => "timeout",
            ActuatorError::BadResponse(_) => "bad_response",
            ActuatorError::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Whether a later attempt could succeed. The link itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ActuatorError::Unreachable(_) | ActuatorError::Timeout(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_labels() {
        assert_eq!(ActuatorError::Timeout(2000).kind(), "timeout");
        assert_eq!(ActuatorError::unreachable("refused").kind(), "unreachable");
        assert_eq!(ActuatorError::bad_response("garbage").kind(), "bad_response");
    }

    #[test]
    fn test_retryable() {
        assert!(ActuatorError::Timeout(2000).is_retryable());
        assert!(ActuatorError::unreachable("refused").is_retryable());
        assert!(!ActuatorError::bad_response("garbage").is_retryable());
        assert!(!ActuatorError::InvalidConfig("url".into()).is_retryable());
    }
}
