//! Operator command surface.
//!
//! Commands arrive as short text lines (one key or word per line) so any
//! front end can drive the tracker: a terminal, a socket, a test harness.
//!
//! | Input              | Command            |
//! |--------------------|--------------------|
//! | `space`, `m`       | toggle mode        |
//! | `c`                | center now         |
//! | `+`, `=`           | zoom in one step   |
//! | `-`                | zoom out one step  |
//! | `r`                | zoom reset         |
//! | `a`                | toggle auto-zoom   |
//! | `q`                | exit               |
//! | `click <x> <y>`    | manual aim         |

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

use crate::geometry::PixelPoint;

/// Discrete operator command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorCommand {
    ToggleMode,
    CenterNow,
    ZoomIn,
    ZoomOut,
    ZoomReset,
    ToggleAutoZoom,
    Exit,
}

/// Anything the operator can send in one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperatorEvent {
    Command { command: OperatorCommand },
    Click { point: PixelPoint },
}

impl From<OperatorCommand> for OperatorEvent {
    fn from(command: OperatorCommand) -> Self {
        OperatorEvent::Command { command }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandParseError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Invalid click coordinates: {0}")]
    InvalidClick(String),
}

impl FromStr for OperatorCommand {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A bare space is the mode key, so only trim line endings here.
        let raw = s.trim_end_matches(['\r', '\n']);
        if raw == " " {
            return Ok(OperatorCommand::ToggleMode);
        }
        match raw.trim().to_lowercase().as_str() {
            "" => Err(CommandParseError::Empty),
            "space" | "m" | "mode" => Ok(OperatorCommand::ToggleMode),
            "c" | "center" => Ok(OperatorCommand::CenterNow),
            "+" | "=" | "zoom-in" => Ok(OperatorCommand::ZoomIn),
            "-" | "zoom-out" => Ok(OperatorCommand::ZoomOut),
            "r" | "zoom-reset" => Ok(OperatorCommand::ZoomReset),
            "a" | "auto-zoom" => Ok(OperatorCommand::ToggleAutoZoom),
            "q" | "quit" | "exit" => Ok(OperatorCommand::Exit),
            other => Err(CommandParseError::Unknown(other.to_string())),
        }
    }
}

impl FromStr for OperatorEvent {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        if parts.next().map(str::to_lowercase).as_deref() == Some("click") {
            let coords: Vec<&str> = parts.collect();
            let parsed = match coords.as_slice() {
                [x, y] => x.parse::<i32>().ok().zip(y.parse::<i32>().ok()),
                _ => None,
            };
            return parsed
                .map(|(x, y)| OperatorEvent::Click {
                    point: PixelPoint::new(x, y),
                })
                .ok_or_else(|| CommandParseError::InvalidClick(coords.join(" ")));
        }
        s.parse::<OperatorCommand>().map(OperatorEvent::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        let cases = [
            (" ", OperatorCommand::ToggleMode),
            ("space", OperatorCommand::ToggleMode),
            ("c", OperatorCommand::CenterNow),
            ("+", OperatorCommand::ZoomIn),
            ("=", OperatorCommand::ZoomIn),
            ("-", OperatorCommand::ZoomOut),
            ("R", OperatorCommand::ZoomReset),
            ("a", OperatorCommand::ToggleAutoZoom),
            ("q\n", OperatorCommand::Exit),
        ];
        for (input, expected) in cases {
            assert_eq!(input.parse::<OperatorCommand>().unwrap(), expected, "{input:?}");
        }
    }

    #[test]
    fn test_unknown_and_empty() {
        assert_eq!(
            "x".parse::<OperatorCommand>(),
            Err(CommandParseError::Unknown("x".into()))
        );
        assert_eq!("\n".parse::<OperatorCommand>(), Err(CommandParseError::Empty));
    }

    #[test]
    fn test_click_event() {
        assert_eq!(
            "click 320 240".parse::<OperatorEvent>().unwrap(),
            OperatorEvent::Click {
                point: PixelPoint::new(320, 240)
            }
        );
        assert!(matches!(
            "click 320".parse::<OperatorEvent>(),
            Err(CommandParseError::InvalidClick(_))
        ));
        assert!(matches!(
            "click a b".parse::<OperatorEvent>(),
            Err(CommandParseError::InvalidClick(_))
        ));
    }

    #[test]
    fn test_command_event() {
        assert_eq!(
            "c".parse::<OperatorEvent>().unwrap(),
            OperatorEvent::Command {
                command: OperatorCommand::CenterNow
            }
        );
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_string(&OperatorEvent::from(OperatorCommand::ZoomIn)).unwrap();
        assert_eq!(json, r#"{"type":"command","command":"zoom_in"}"#);
    }
}
