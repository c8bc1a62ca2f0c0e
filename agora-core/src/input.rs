//! Topic entry and submission guards.

use crate::config::DebateSettings;
use crate::connection::ConnectionManager;
use crate::error::{Error, Rejection, Result};
use crate::protocol::OutboundRequest;
use crate::session::Session;
use tracing::info;

/// Holds the pending topic and the settings the next request will carry.
#[derive(Debug, Clone, Default)]
pub struct InputController {
    buffer: String,
    settings: DebateSettings,
}

impl InputController {
    pub fn new(settings: DebateSettings) -> Self {
        Self {
            buffer: String::new(),
            settings,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn set_buffer(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    pub fn settings(&self) -> &DebateSettings {
        &self.settings
    }

    /// Replaces the settings. Locked while a debate is running.
    pub fn configure(&mut self, settings: DebateSettings, session: &Session) -> Result<()> {
        if session.is_debating() {
            return Err(Error::Rejected(Rejection::DebateInProgress));
        }
        settings.validate()?;
        self.settings = settings;
        Ok(())
    }

    /// Checks whether the buffered topic may be submitted right now.
    pub fn check(&self, session: &Session) -> Result<()> {
        if self.buffer.trim().is_empty() {
            return Err(Error::Rejected(Rejection::EmptyTopic));
        }
        if session.is_debating() {
            return Err(Error::Rejected(Rejection::DebateInProgress));
        }
        if !session.is_connected() {
            return Err(Error::Rejected(Rejection::NotConnected));
        }
        Ok(())
    }

    /// Packages the buffered topic with the current settings.
    pub fn build_request(&self) -> OutboundRequest {
        OutboundRequest::new(
            self.buffer.trim(),
            self.settings.rounds,
            self.settings.summarizer.clone(),
            self.settings.enable_web_search,
        )
    }

    /// Submits the buffered topic.
    ///
    /// On success the session is marked as debating before any round event
    /// arrives and the buffer is cleared. A refused or failed send leaves
    /// both untouched.
    pub async fn submit(
        &mut self,
        session: &mut Session,
        connection: &mut ConnectionManager,
    ) -> Result<OutboundRequest> {
        self.check(session)?;

        let request = self.build_request();
        connection.send(&request).await?;

        session.rounds_mut().begin();
        self.buffer.clear();
        info!(topic = %request.content, rounds = request.rounds, "debate requested");
        Ok(request)
    }
}
