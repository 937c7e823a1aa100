//! Inbound client commands.
//!
//! Each client message is a JSON object carrying one recognized key. When
//! several are present the first in precedence order wins:
//! `led_index`, `servo`, `rc_motor`, `status`. Only `led_index` inspects
//! its value; the others act on the key alone.

use core::fmt;

use serde_json::{Map, Value};

/// A parsed client request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCommand {
    /// Flip one zone light. The index is not range-checked here; the
    /// controller ignores out-of-range zones.
    ToggleLight(i64),
    ToggleServo,
    ToggleRcMotor,
    /// Liveness check, answered to the requester only.
    Status,
}

/// Why a message was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Not valid JSON.
    Malformed(String),
    /// Valid JSON, but not an object.
    NotAnObject,
    /// None of the recognized keys is present.
    UnknownCommand,
    /// A recognized key carries a value of the wrong type.
    BadArgument(&'static str),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(detail) => write!(f, "malformed JSON: {detail}"),
            Self::NotAnObject => write!(f, "message must be a JSON object"),
            Self::UnknownCommand => write!(f, "no recognized command key"),
            Self::BadArgument(key) => write!(f, "invalid value for '{key}'"),
        }
    }
}

impl std::error::Error for CommandError {}

impl ClientCommand {
    /// Parse one client message.
    pub fn parse(text: &str) -> Result<Self, CommandError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| CommandError::Malformed(e.to_string()))?;
        match value {
            Value::Object(map) => Self::from_object(&map),
            _ => Err(CommandError::NotAnObject),
        }
    }

    fn from_object(map: &Map<String, Value>) -> Result<Self, CommandError> {
        if let Some(index) = map.get("led_index") {
            return index
                .as_i64()
                // Integers past i64 are out of range like any other.
                .or_else(|| index.as_u64().map(|_| i64::MAX))
                .map(Self::ToggleLight)
                .ok_or(CommandError::BadArgument("led_index"));
        }
        if map.contains_key("servo") {
            return Ok(Self::ToggleServo);
        }
        if map.contains_key("rc_motor") {
            return Ok(Self::ToggleRcMotor);
        }
        if map.contains_key("status") {
            return Ok(Self::Status);
        }
        Err(CommandError::UnknownCommand)
    }
}
