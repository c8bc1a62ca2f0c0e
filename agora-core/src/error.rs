//! Error handling for the debate client.
//!
//! This module provides a centralized error type and result alias for all
//! client operations. Transport failures, malformed inbound envelopes and
//! refused submissions each get their own variant so callers can decide
//! whether to log, surface, or silently drop them.
//!
//! # Examples
//!
//! ```rust
//! use agora_core::error::{Error, Result};
//!
//! fn validate_summarizer(id: &str) -> Result<()> {
//!     if id.trim().is_empty() {
//!         return Err(Error::validation("summarizer cannot be empty"));
//!     }
//!     Ok(())
//! }
//! ```

use std::io;
use thiserror::Error;

/// Reasons a submission or send is refused before it reaches the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The topic is empty or whitespace only
    EmptyTopic,
    /// A debate is already in flight
    DebateInProgress,
    /// The transport is not open
    NotConnected,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Rejection::EmptyTopic => "topic is empty",
            Rejection::DebateInProgress => "a debate is already in progress",
            Rejection::NotConnected => "not connected to the debate service",
        };
        f.write_str(reason)
    }
}

/// Comprehensive error type for client operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Envelope shape errors (missing discriminator, wrong field types)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Connection and networking errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Outbound request could not be handed to the transport
    #[error("Send error: {0}")]
    Send(String),

    /// I/O operation failures
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Data validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A guard refused the operation
    #[error("Rejected: {0}")]
    Rejected(Rejection),

    /// Catch-all for other errors
    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Convenience type alias for Results with client errors.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Creates a new protocol error with the given message.
    ///
    /// # Examples
    /// ```
    /// use agora_core::error::Error;
    ///
    /// let err = Error::protocol("envelope has no type");
    /// ```
    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    /// Creates a new connection error with the given message.
    pub fn connection(msg: impl Into<String>) -> Self {
        Error::Connection(msg.into())
    }

    /// Creates a new validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Returns the rejection reason if this error came from a guard.
    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Error::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
