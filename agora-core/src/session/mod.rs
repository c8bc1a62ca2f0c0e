//! Local model of one debate session.
//!
//! A [`Session`] bundles the three stores the dispatcher mutates (messages,
//! typing indicators, round state) together with the `connected` flag the
//! connection manager owns. Presentation code never touches it directly; it
//! reads [`SessionSnapshot`]s instead.

mod dispatcher;
mod round;
mod store;
mod typing;

pub use dispatcher::{ActiveStream, DispatchOutcome, DropReason, EventDispatcher};
pub use round::RoundTracker;
pub use store::MessageStore;
pub use typing::TypingSet;

use crate::protocol::Message;
use serde::Serialize;

/// Mutable client-side state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    messages: MessageStore,
    typing: TypingSet,
    rounds: RoundTracker,
    connected: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &MessageStore {
        &self.messages
    }

    pub fn typing(&self) -> &TypingSet {
        &self.typing
    }

    pub fn rounds(&self) -> &RoundTracker {
        &self.rounds
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_debating(&self) -> bool {
        self.rounds.is_debating()
    }

    pub fn current_round(&self) -> u32 {
        self.rounds.current_round()
    }

    /// Appends a client-generated notice.
    pub fn push_notice(&mut self, content: impl Into<String>) -> usize {
        self.messages.push(Message::system(content))
    }

    pub(crate) fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub(crate) fn messages_mut(&mut self) -> &mut MessageStore {
        &mut self.messages
    }

    pub(crate) fn typing_mut(&mut self) -> &mut TypingSet {
        &mut self.typing
    }

    pub(crate) fn rounds_mut(&mut self) -> &mut RoundTracker {
        &mut self.rounds
    }

    /// Captures the current state for observers.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.messages.as_slice().to_vec(),
            connected: self.connected,
            debating: self.rounds.is_debating(),
            current_round: self.rounds.current_round(),
            total_rounds: self.rounds.total_rounds(),
            typing_agents: self.typing.to_vec(),
        }
    }
}

/// Point-in-time copy of a [`Session`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub messages: Vec<Message>,
    pub connected: bool,
    pub debating: bool,
    pub current_round: u32,
    pub total_rounds: Option<u32>,
    pub typing_agents: Vec<String>,
}

impl SessionSnapshot {
    /// The message currently receiving deltas, if any.
    pub fn streaming_message(&self) -> Option<&Message> {
        self.messages.last().filter(|m| m.streaming)
    }

    /// Whether the service has finished everything it sends for a debate,
    /// looking only at messages from index `since` on: either its final
    /// notice arrived or the summary stream ended.
    pub fn summary_finished(&self, since: usize) -> bool {
        self.messages
            .get(since..)
            .unwrap_or_default()
            .iter()
            .any(|m| m.is_final_notice() || (m.is_summary() && !m.streaming))
    }
}
