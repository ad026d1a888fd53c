//! Tracker error types.

use thiserror::Error;

pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Actuator error: {0}")]
    Actuator(#[from] ptz_actuator::ActuatorError),
}

impl TrackerError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ptz_actuator::ActuatorError;

    #[test]
    fn test_messages() {
        assert_eq!(
            TrackerError::config("bad").to_string(),
            "Configuration error: bad"
        );
        let err = TrackerError::from(ActuatorError::InvalidConfig("no url".into()));
        assert_eq!(
            err.to_string(),
            "Actuator error: Invalid actuator config: no url"
        );
    }
}
