//! Agora Debate Client
//! Keeps a local model of a streamed multi-agent debate in sync with the
//! debate service and drives the connection it arrives on.

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod input;
pub mod logging;
pub mod protocol;
pub mod session;

// Re-export commonly used types
pub use client::{Command, DebateClient};
pub use config::{ClientConfig, ConnectionConfig, DebateSettings};
pub use connection::{ConnectionManager, Connector, WsConnector};
pub use error::{Error, Rejection, Result};
pub use protocol::{Message, OutboundRequest, Role, StreamEvent};
pub use session::{Session, SessionSnapshot};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constants() {
        assert!(!VERSION.is_empty());
    }
}
