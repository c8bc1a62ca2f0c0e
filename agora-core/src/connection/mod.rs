//! Connection module owns the transport lifecycle.
//!
//! This module provides functionality for:
//! - Opening the duplex connection to the debate service
//! - Surfacing open and close transitions as system notices
//! - Guarding outbound sends on the connection state
//! - Optional, bounded reconnection
//!
//! The transport itself sits behind the [`Connector`] trait so the manager
//! can be driven by a real WebSocket ([`WsConnector`]) or by in-memory
//! channels in tests.
//!
//! # Examples
//!
//! ```rust,no_run
//! use agora_core::config::ClientConfig;
//! use agora_core::connection::{ConnectionManager, WsConnector};
//! use agora_core::session::Session;
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let config = ClientConfig::default();
//! let mut session = Session::new();
//! let mut manager = ConnectionManager::new(
//!     config.endpoint.clone(),
//!     config.connection.clone(),
//!     Arc::new(WsConnector),
//! );
//!
//! if manager.connect(&mut session).await.is_ok() {
//!     assert!(session.is_connected());
//! }
//! # }
//! ```

use crate::config::ConnectionConfig;
use crate::error::{Error, Rejection, Result};
use crate::protocol::{encode_request, OutboundRequest};
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{debug, info, warn};

mod metrics;
mod websocket;

pub use metrics::{ConnectionMetrics, ConnectionStats};
pub use websocket::WsConnector;

/// Notice appended when the transport opens.
pub const CONNECTED_NOTICE: &str =
    "Connected to AI Debate Platform. Start a topic to see agents debate!";
/// Notice appended when the transport is lost.
pub const DISCONNECTED_NOTICE: &str = "Disconnected from server.";

/// Lifecycle state of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Something the transport reports to the manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// One inbound text frame
    Frame(String),
    /// The peer closed the connection
    Closed,
    /// The connection failed
    Error(String),
}

/// Channel ends of an open transport.
#[derive(Debug)]
pub struct TransportHandle {
    /// Outbound text frames
    pub outbound: mpsc::Sender<String>,
    /// Inbound events, in the order the peer sent them
    pub inbound: mpsc::Receiver<TransportEvent>,
}

/// Opens transports. Implementations own all I/O.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &str, buffer_size: usize) -> Result<TransportHandle>;
}

/// Drives one connection to the debate service.
pub struct ConnectionManager {
    endpoint: String,
    config: ConnectionConfig,
    connector: Arc<dyn Connector>,
    state: ConnectionState,
    transport: Option<TransportHandle>,
    reconnect_attempts: u32,
    metrics: Arc<ConnectionMetrics>,
}

impl ConnectionManager {
    pub fn new(
        endpoint: impl Into<String>,
        config: ConnectionConfig,
        connector: Arc<dyn Connector>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            config,
            connector,
            state: ConnectionState::Disconnected,
            transport: None,
            reconnect_attempts: 0,
            metrics: Arc::new(ConnectionMetrics::new()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn metrics(&self) -> Arc<ConnectionMetrics> {
        self.metrics.clone()
    }

    /// Opens the transport. Does nothing if already connecting or connected.
    ///
    /// A failed attempt leaves the manager disconnected, appends the
    /// disconnection notice, and returns the transport error.
    pub async fn connect(&mut self, session: &mut Session) -> Result<()> {
        if self.state != ConnectionState::Disconnected {
            debug!(state = ?self.state, "connect ignored");
            return Ok(());
        }

        self.state = ConnectionState::Connecting;
        info!(endpoint = %self.endpoint, "connecting");

        match self
            .connector
            .connect(&self.endpoint, self.config.buffer_size)
            .await
        {
            Ok(handle) => {
                self.transport = Some(handle);
                self.state = ConnectionState::Connected;
                self.reconnect_attempts = 0;
                self.metrics.record_open();
                session.set_connected(true);
                session.push_notice(CONNECTED_NOTICE);
                info!(endpoint = %self.endpoint, "connected");
                Ok(())
            }
            Err(e) => {
                self.state = ConnectionState::Disconnected;
                self.metrics.record_error();
                session.set_connected(false);
                session.push_notice(DISCONNECTED_NOTICE);
                warn!(endpoint = %self.endpoint, error = %e, "connect failed");
                Err(e)
            }
        }
    }

    /// Waits for the next transport event.
    ///
    /// Returns [`TransportEvent::Closed`] when no transport is open or the
    /// transport's channel has ended.
    pub async fn recv(&mut self) -> TransportEvent {
        let Some(transport) = self.transport.as_mut() else {
            return TransportEvent::Closed;
        };

        match transport.inbound.recv().await {
            Some(event) => {
                if let TransportEvent::Frame(_) = event {
                    self.metrics.record_received();
                }
                event
            }
            None => TransportEvent::Closed,
        }
    }

    /// Records that the transport closed or failed.
    pub fn handle_closed(&mut self, session: &mut Session, reason: Option<&str>) {
        if self.state == ConnectionState::Disconnected && self.transport.is_none() {
            return;
        }

        if let Some(reason) = reason {
            self.metrics.record_error();
            warn!(reason, "connection lost");
        } else {
            info!("connection closed");
        }

        self.transport = None;
        self.state = ConnectionState::Disconnected;
        session.set_connected(false);
        session.push_notice(DISCONNECTED_NOTICE);
    }

    /// Sends a request. Refused unless connected; there is no acknowledgement.
    pub async fn send(&mut self, request: &OutboundRequest) -> Result<()> {
        let transport = match (self.state, self.transport.as_ref()) {
            (ConnectionState::Connected, Some(transport)) => transport,
            _ => return Err(Error::Rejected(Rejection::NotConnected)),
        };

        let frame = encode_request(request)?;
        transport
            .outbound
            .send(frame)
            .await
            .map_err(|e| Error::Send(format!("Failed to send request: {}", e)))?;

        self.metrics.record_sent();
        debug!(rounds = request.rounds, summarizer = %request.summarizer, "request sent");
        Ok(())
    }

    /// Tears the connection down from any state, releasing the transport.
    pub fn disconnect(&mut self, session: &mut Session) {
        let was_connected = self.state == ConnectionState::Connected;
        self.transport = None;
        self.state = ConnectionState::Disconnected;

        if was_connected {
            info!("disconnected by client");
            session.set_connected(false);
            session.push_notice(DISCONNECTED_NOTICE);
        }
    }

    /// Retries the connection with exponential backoff, up to
    /// `max_reconnects` attempts. Returns true once connected.
    pub async fn reconnect(&mut self, session: &mut Session) -> bool {
        while self.reconnect_attempts < self.config.max_reconnects {
            let delay = backoff_delay(self.config.reconnect_delay, self.reconnect_attempts);
            self.reconnect_attempts += 1;
            info!(
                attempt = self.reconnect_attempts,
                max = self.config.max_reconnects,
                ?delay,
                "reconnecting"
            );
            time::sleep(delay).await;

            if self.connect(session).await.is_ok() {
                return true;
            }
        }
        false
    }
}

/// `base * 2^attempt`, saturating at [`Duration::MAX`].
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.checked_mul(2u32.saturating_pow(attempt))
        .unwrap_or(Duration::MAX)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

    /// Service side of an in-memory transport.
    pub struct ServerEnd {
        pub events: mpsc::Sender<TransportEvent>,
        pub requests: mpsc::Receiver<String>,
    }

    impl ServerEnd {
        pub async fn send_json(&self, value: serde_json::Value) {
            self.events
                .send(TransportEvent::Frame(value.to_string()))
                .await
                .unwrap();
        }
    }

    /// Connector backed by channels; each successful connect yields a
    /// [`ServerEnd`] to the test.
    pub struct MemoryConnector {
        ends: mpsc::UnboundedSender<ServerEnd>,
        refuse: AtomicBool,
        attempts: AtomicU32,
    }

    impl MemoryConnector {
        pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<ServerEnd>) {
            let (tx, rx) = mpsc::unbounded_channel();
            let connector = Arc::new(Self {
                ends: tx,
                refuse: AtomicBool::new(false),
                attempts: AtomicU32::new(0),
            });
            (connector, rx)
        }

        pub fn set_refuse(&self, refuse: bool) {
            self.refuse.store(refuse, Ordering::SeqCst);
        }

        pub fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Connector for MemoryConnector {
        async fn connect(&self, _url: &str, buffer_size: usize) -> Result<TransportHandle> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.refuse.load(Ordering::SeqCst) {
                return Err(Error::connection("connection refused"));
            }

            let (events_tx, events_rx) = mpsc::channel(buffer_size);
            let (requests_tx, requests_rx) = mpsc::channel(buffer_size);
            let _ = self.ends.send(ServerEnd {
                events: events_tx,
                requests: requests_rx,
            });

            Ok(TransportHandle {
                outbound: requests_tx,
                inbound: events_rx,
            })
        }
    }
}
