//! Inbound event envelopes.
//!
//! Every frame from the service is one JSON object keyed by a `type`
//! discriminator. Known kinds decode into a [`StreamEvent`] variant; kinds
//! this client does not understand become [`StreamEvent::Ignored`] so newer
//! services stay compatible.

use super::types::Message;
use crate::error::{Error, Result};
use serde::Deserialize;
use serde_json::Value;

/// Discriminators this client knows how to decode.
pub const KNOWN_KINDS: &[&str] = &[
    "round_start",
    "round_end",
    "debate_complete",
    "stream_start",
    "stream_delta",
    "stream_end",
    "message",
    "typing",
];

/// One decoded inbound envelope.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    RoundStart {
        round: u32,
        #[serde(default)]
        total_rounds: Option<u32>,
    },
    RoundEnd {
        #[serde(default)]
        round: Option<u32>,
    },
    DebateComplete {
        #[serde(default)]
        total_rounds: Option<u32>,
    },
    StreamStart {
        data: Message,
    },
    StreamDelta {
        agent: String,
        delta: String,
    },
    StreamEnd {
        #[serde(default)]
        agent: Option<String>,
    },
    Message {
        data: Message,
    },
    Typing {
        agent: String,
        status: bool,
    },
    /// A well-formed envelope of a kind this client does not handle
    #[serde(skip_deserializing)]
    Ignored { kind: String },
}

impl StreamEvent {
    /// Decodes a single text frame.
    ///
    /// Returns an error when the frame is not a JSON object with a string
    /// `type`, or when a known kind is missing required fields.
    pub fn decode(frame: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(frame)?;
        Self::from_value(value)
    }

    /// Decodes an already-parsed envelope.
    pub fn from_value(value: Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::protocol("envelope has no string `type` discriminator"))?;

        if !KNOWN_KINDS.contains(&kind) {
            return Ok(StreamEvent::Ignored {
                kind: kind.to_string(),
            });
        }

        let kind = kind.to_string();
        serde_json::from_value(value)
            .map_err(|e| Error::protocol(format!("malformed `{}` envelope: {}", kind, e)))
    }

    /// The wire discriminator for this event.
    pub fn kind(&self) -> &str {
        match self {
            StreamEvent::RoundStart { .. } => "round_start",
            StreamEvent::RoundEnd { .. } => "round_end",
            StreamEvent::DebateComplete { .. } => "debate_complete",
            StreamEvent::StreamStart { .. } => "stream_start",
            StreamEvent::StreamDelta { .. } => "stream_delta",
            StreamEvent::StreamEnd { .. } => "stream_end",
            StreamEvent::Message { .. } => "message",
            StreamEvent::Typing { .. } => "typing",
            StreamEvent::Ignored { kind } => kind.as_str(),
        }
    }
}
