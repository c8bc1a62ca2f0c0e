//! The debate client event loop.
//!
//! [`DebateClient::run`] is the single consumer of both user commands and
//! transport events. Each trigger is handled to completion before the next
//! one is polled, and a fresh [`SessionSnapshot`] is published afterwards.

use crate::config::{ClientConfig, DebateSettings};
use crate::connection::{ConnectionManager, ConnectionMetrics, Connector, TransportEvent};
use crate::error::Result;
use crate::input::InputController;
use crate::session::{DispatchOutcome, EventDispatcher, Session, SessionSnapshot};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

/// User actions accepted by the client loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open the connection if it is not already open
    Connect,
    /// Submit a debate topic
    Submit(String),
    /// Replace the settings used for the next submission
    Configure(DebateSettings),
    /// Close the connection but keep the loop running
    Disconnect,
    /// Close the connection and stop the loop
    Shutdown,
}

/// Owns all client state and drives it from one task.
pub struct DebateClient {
    session: Session,
    dispatcher: EventDispatcher,
    connection: ConnectionManager,
    input: InputController,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl DebateClient {
    pub fn new(config: ClientConfig, connector: Arc<dyn Connector>) -> Self {
        let session = Session::new();
        let (snapshots, _) = watch::channel(session.snapshot());
        Self {
            connection: ConnectionManager::new(config.endpoint, config.connection, connector),
            input: InputController::new(config.settings),
            dispatcher: EventDispatcher::new(),
            session,
            snapshots,
        }
    }

    /// Receives a snapshot after every handled trigger.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn connection(&self) -> &ConnectionManager {
        &self.connection
    }

    pub fn metrics(&self) -> Arc<ConnectionMetrics> {
        self.connection.metrics()
    }

    /// Runs until [`Command::Shutdown`] or until every command sender is gone.
    pub async fn run(mut self, mut commands: mpsc::Receiver<Command>) -> Result<()> {
        info!(endpoint = %self.connection.endpoint(), "debate client started");

        loop {
            let keep_running = tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => false,
                },
                event = self.connection.recv(), if self.connection.is_connected() => {
                    self.handle_transport(event).await;
                    true
                }
            };

            self.publish();
            if !keep_running {
                break;
            }
        }

        self.connection.disconnect(&mut self.session);
        self.publish();
        info!(
            dropped = self.dispatcher.dropped(),
            "debate client stopped"
        );
        Ok(())
    }

    /// Applies one user command. Returns false when the loop should stop.
    pub async fn handle_command(&mut self, command: Command) -> bool {
        debug!(?command, "handling command");
        match command {
            Command::Connect => {
                if let Err(e) = self.connection.connect(&mut self.session).await {
                    warn!(error = %e, "could not connect");
                }
            }
            Command::Submit(topic) => {
                self.input.set_buffer(topic);
                if let Err(e) = self
                    .input
                    .submit(&mut self.session, &mut self.connection)
                    .await
                {
                    warn!(error = %e, "submission refused");
                }
            }
            Command::Configure(settings) => {
                if let Err(e) = self.input.configure(settings, &self.session) {
                    warn!(error = %e, "settings not applied");
                }
            }
            Command::Disconnect => self.connection.disconnect(&mut self.session),
            Command::Shutdown => return false,
        }
        true
    }

    /// Applies one transport event.
    pub async fn handle_transport(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Frame(frame) => {
                if let DispatchOutcome::Dropped(reason) =
                    self.dispatcher.dispatch_frame(&frame, &mut self.session)
                {
                    debug!(?reason, "event dropped");
                }
            }
            TransportEvent::Closed => {
                self.connection.handle_closed(&mut self.session, None);
                self.try_reconnect().await;
            }
            TransportEvent::Error(reason) => {
                self.connection
                    .handle_closed(&mut self.session, Some(&reason));
                self.try_reconnect().await;
            }
        }
    }

    async fn try_reconnect(&mut self) {
        // Publish the disconnect before any backoff delay.
        self.publish();
        if self.connection.reconnect(&mut self.session).await {
            info!("reconnected");
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.session.snapshot());
    }
}
