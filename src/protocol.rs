//! Wire protocol spoken with the rover's control endpoint.
//!
//! Every frame is a JSON object with a `type` tag:
//!
//! - Outbound (client -> rover): `{"type": "voice_command", "command": "<intent>"}`
//! - Inbound (rover -> client): `{"type": "command_result", "message": "<text>"}`
//!
//! Any other inbound `type` is well-formed but ignored, so newer rover
//! firmware can add message kinds without breaking older clients.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Tag of the only inbound message kind this client acts on.
pub const COMMAND_RESULT: &str = "command_result";

/// Errors raised while building or parsing protocol frames.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("intent must not be empty")]
    EmptyIntent,
    #[error("invalid JSON frame: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("frame is not a JSON object")]
    NotAnObject,
    #[error("frame has no string `type` field")]
    MissingType,
}

/// A requested action: one of the button tokens (`forward`, `backward`,
/// `left`, `right`, `stop`) or an arbitrary recognized phrase.
///
/// Unrecognized tokens are passed through to the rover unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Intent(String);

impl Intent {
    pub fn new(token: impl Into<String>) -> Result<Self, ProtocolError> {
        let token = token.into();
        if token.is_empty() {
            return Err(ProtocolError::EmptyIntent);
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Intent {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Intent> for String {
    fn from(intent: Intent) -> Self {
        intent.0
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Client -> rover frame. One is built per send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    VoiceCommand { command: Intent },
}

impl OutboundMessage {
    pub fn intent(&self) -> &Intent {
        match self {
            Self::VoiceCommand { command } => command,
        }
    }

    /// Serialize to the JSON text carried in a WebSocket text frame.
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Typed result of parsing an inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedEvent {
    CommandResult { message: String },
    /// Well-formed frame with a `type` this client does not act on.
    Ignored { kind: String },
}

#[derive(Deserialize)]
struct CommandResultBody {
    #[serde(default)]
    message: String,
}

/// Build the outbound envelope for an intent. Total: never fails.
pub fn encode(intent: Intent) -> OutboundMessage {
    OutboundMessage::VoiceCommand { command: intent }
}

/// Parse one inbound frame.
///
/// Accepts raw bytes so both text and binary WebSocket frames go through the
/// same path. A `command_result` without a `message` decodes with an empty
/// message.
pub fn decode(raw: &[u8]) -> Result<DecodedEvent, ProtocolError> {
    let value: serde_json::Value = serde_json::from_slice(raw)?;
    let obj = value.as_object().ok_or(ProtocolError::NotAnObject)?;
    let kind = obj
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or(ProtocolError::MissingType)?
        .to_string();

    if kind == COMMAND_RESULT {
        let body: CommandResultBody = serde_json::from_value(value)?;
        return Ok(DecodedEvent::CommandResult {
            message: body.message,
        });
    }

    Ok(DecodedEvent::Ignored { kind })
}
