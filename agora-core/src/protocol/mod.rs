//! Wire protocol spoken with the debate service.
//!
//! Inbound traffic is a sequence of [`StreamEvent`] envelopes; outbound
//! traffic is a single [`OutboundRequest`] per submitted topic. There is no
//! handshake, heartbeat or acknowledgement.

mod event;
mod types;

pub use event::{StreamEvent, KNOWN_KINDS};
pub use types::*;

use crate::error::Result;

/// Serializes an outbound request into a text frame.
pub fn encode_request(request: &OutboundRequest) -> Result<String> {
    Ok(serde_json::to_string(request)?)
}

/// Parses a text frame back into an outbound request.
pub fn decode_request(frame: &str) -> Result<OutboundRequest> {
    Ok(serde_json::from_str(frame)?)
}
