//! Routes decoded events to the session stores.
//!
//! Dispatch is synchronous and applies exactly one state transition per
//! event. Nothing is buffered or reordered, so correctness of `stream_delta`
//! depends on the transport delivering frames in the order the service sent
//! them.

use super::Session;
use crate::protocol::{Message, Role, StreamEvent};
use tracing::{debug, trace, warn};

/// Handle on the message currently receiving deltas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveStream {
    /// Position of the streaming message in the store
    pub index: usize,
    /// Agent the stream belongs to
    pub agent: String,
}

/// Why an event was discarded without mutating state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropReason {
    /// The frame did not decode into a known envelope shape
    Malformed(String),
    /// A delta arrived with no matching active stream at the tail
    OrphanDelta { agent: String },
}

/// Result of dispatching one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// State was mutated
    Applied,
    /// The event is informational; no state change
    Noop,
    /// Unknown discriminator, ignored for forward compatibility
    Ignored(String),
    /// The event was dropped
    Dropped(DropReason),
}

/// Applies inbound events to a [`Session`].
#[derive(Debug, Default)]
pub struct EventDispatcher {
    active: Option<ActiveStream>,
    dropped: u64,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current stream handle, if one is still valid for `session`.
    pub fn active_stream(&self, session: &Session) -> Option<&ActiveStream> {
        self.active
            .as_ref()
            .filter(|active| session.messages().tail_index() == Some(active.index))
    }

    /// Number of events dropped so far.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Decodes and applies a raw text frame.
    ///
    /// Malformed frames are logged and dropped; they never reach the stores.
    pub fn dispatch_frame(&mut self, frame: &str, session: &mut Session) -> DispatchOutcome {
        match StreamEvent::decode(frame) {
            Ok(event) => self.dispatch(event, session),
            Err(e) => {
                warn!(error = %e, "dropping malformed envelope");
                self.dropped += 1;
                DispatchOutcome::Dropped(DropReason::Malformed(e.to_string()))
            }
        }
    }

    /// Applies one decoded event.
    pub fn dispatch(&mut self, event: StreamEvent, session: &mut Session) -> DispatchOutcome {
        trace!(kind = event.kind(), "dispatching event");

        let outcome = match event {
            StreamEvent::RoundStart {
                round,
                total_rounds,
            } => {
                debug!(round, ?total_rounds, "round started");
                session.rounds_mut().start_round(round, total_rounds);
                DispatchOutcome::Applied
            }
            StreamEvent::DebateComplete { total_rounds } => {
                debug!(?total_rounds, "debate complete");
                session.rounds_mut().complete();
                DispatchOutcome::Applied
            }
            StreamEvent::StreamStart { data } => self.start_stream(data, session),
            StreamEvent::StreamDelta { agent, delta } => self.apply_delta(agent, &delta, session),
            StreamEvent::StreamEnd { agent } => self.end_stream(agent.as_deref(), session),
            StreamEvent::Message { data } => {
                self.active = None;
                session.messages_mut().push(data);
                DispatchOutcome::Applied
            }
            StreamEvent::Typing { agent, status } => {
                session.typing_mut().set(&agent, status);
                DispatchOutcome::Applied
            }
            StreamEvent::RoundEnd { .. } => DispatchOutcome::Noop,
            StreamEvent::Ignored { kind } => {
                debug!(kind = %kind, "ignoring unknown event kind");
                DispatchOutcome::Ignored(kind)
            }
        };

        if let DispatchOutcome::Dropped(_) = outcome {
            self.dropped += 1;
        }
        outcome
    }

    /// Appends the message as streaming. Only a named assistant message gets
    /// a stream handle; anything else accepts no deltas.
    fn start_stream(&mut self, mut data: Message, session: &mut Session) -> DispatchOutcome {
        let agent = match (data.role, data.agent_name.clone()) {
            (Role::Assistant, Some(agent)) => Some(agent),
            _ => {
                debug!(role = ?data.role, "stream_start without an assistant agent");
                None
            }
        };

        data.streaming = true;
        let index = session.messages_mut().push(data);
        self.active = agent.map(|agent| {
            debug!(agent = %agent, "stream started");
            ActiveStream { index, agent }
        });
        DispatchOutcome::Applied
    }

    fn apply_delta(&mut self, agent: String, delta: &str, session: &mut Session) -> DispatchOutcome {
        let index = match self.active_stream(session) {
            Some(active) if active.agent == agent => active.index,
            _ => {
                debug!(agent = %agent, "dropping delta with no matching stream at the tail");
                return DispatchOutcome::Dropped(DropReason::OrphanDelta { agent });
            }
        };

        match session.messages_mut().get_mut(index) {
            Some(message) if message.is_from(&agent) => {
                message.content.push_str(delta);
                DispatchOutcome::Applied
            }
            _ => DispatchOutcome::Dropped(DropReason::OrphanDelta { agent }),
        }
    }

    fn end_stream(&mut self, agent: Option<&str>, session: &mut Session) -> DispatchOutcome {
        let matches = match (&self.active, agent) {
            (Some(active), Some(agent)) => active.agent == agent,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !matches {
            return DispatchOutcome::Noop;
        }

        if let Some(active) = self.active.take() {
            if let Some(message) = session.messages_mut().get_mut(active.index) {
                message.streaming = false;
            }
            debug!(agent = %active.agent, "stream ended");
        }
        DispatchOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn start(agent: &str) -> StreamEvent {
        StreamEvent::StreamStart {
            data: Message::assistant(agent, ""),
        }
    }

    fn delta(agent: &str, text: &str) -> StreamEvent {
        StreamEvent::StreamDelta {
            agent: agent.into(),
            delta: text.into(),
        }
    }

    fn typing(agent: &str, status: bool) -> StreamEvent {
        StreamEvent::Typing {
            agent: agent.into(),
            status,
        }
    }

    #[test]
    fn test_round_start_sets_round_and_debating() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        for round in [2, 5, 1, 1, 0] {
            let outcome = dispatcher.dispatch(
                StreamEvent::RoundStart {
                    round,
                    total_rounds: None,
                },
                &mut session,
            );
            assert_eq!(outcome, DispatchOutcome::Applied);
            assert_eq!(session.current_round(), round);
            assert!(session.is_debating());
        }
    }

    #[test]
    fn test_debate_complete_resets_even_without_start() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(StreamEvent::DebateComplete { total_rounds: None }, &mut session);
        assert_eq!(session.current_round(), 0);
        assert!(!session.is_debating());

        dispatcher.dispatch(
            StreamEvent::RoundStart {
                round: 4,
                total_rounds: Some(4),
            },
            &mut session,
        );
        dispatcher.dispatch(
            StreamEvent::DebateComplete {
                total_rounds: Some(4),
            },
            &mut session,
        );
        assert_eq!(session.current_round(), 0);
        assert!(!session.is_debating());
    }

    #[test]
    fn test_stream_assembles_deltas() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(start("A"), &mut session);
        assert!(session.messages().last().unwrap().streaming);

        dispatcher.dispatch(delta("A", "Hel"), &mut session);
        dispatcher.dispatch(delta("A", "lo"), &mut session);
        assert_eq!(session.messages().last().unwrap().content, "Hello");

        let outcome = dispatcher.dispatch(
            StreamEvent::StreamEnd {
                agent: Some("A".into()),
            },
            &mut session,
        );
        assert_eq!(outcome, DispatchOutcome::Applied);
        assert!(!session.messages().last().unwrap().streaming);
        assert!(dispatcher.active_stream(&session).is_none());
    }

    #[test]
    fn test_stream_start_keeps_seed_content() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(
            StreamEvent::StreamStart {
                data: Message::assistant("A", "Seed. "),
            },
            &mut session,
        );
        dispatcher.dispatch(delta("A", "More."), &mut session);
        assert_eq!(session.messages().last().unwrap().content, "Seed. More.");
    }

    #[test]
    fn test_delta_for_other_agent_is_dropped() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(start("A"), &mut session);
        dispatcher.dispatch(delta("A", "x"), &mut session);
        let before = session.snapshot();

        let outcome = dispatcher.dispatch(delta("B", "y"), &mut session);
        assert_eq!(
            outcome,
            DispatchOutcome::Dropped(DropReason::OrphanDelta { agent: "B".into() })
        );
        assert_eq!(session.snapshot(), before);
        assert_eq!(dispatcher.dropped(), 1);
    }

    #[test]
    fn test_delta_with_empty_store_is_dropped() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        let outcome = dispatcher.dispatch(delta("A", "y"), &mut session);
        assert!(matches!(outcome, DispatchOutcome::Dropped(_)));
        assert!(session.messages().is_empty());
    }

    #[test]
    fn test_delta_after_intervening_message_is_dropped() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(start("A"), &mut session);
        dispatcher.dispatch(
            StreamEvent::Message {
                data: Message::system("notice"),
            },
            &mut session,
        );
        let before = session.snapshot();

        let outcome = dispatcher.dispatch(delta("A", "late"), &mut session);
        assert!(matches!(outcome, DispatchOutcome::Dropped(_)));
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_delta_after_local_notice_is_dropped() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(start("A"), &mut session);
        session.push_notice("Disconnected from server.");

        let outcome = dispatcher.dispatch(delta("A", "late"), &mut session);
        assert!(matches!(outcome, DispatchOutcome::Dropped(_)));
        assert_eq!(session.messages().get(0).unwrap().content, "");
    }

    #[test]
    fn test_delta_after_stream_end_is_dropped() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(start("A"), &mut session);
        dispatcher.dispatch(delta("A", "done"), &mut session);
        dispatcher.dispatch(StreamEvent::StreamEnd { agent: None }, &mut session);

        let outcome = dispatcher.dispatch(delta("A", " extra"), &mut session);
        assert!(matches!(outcome, DispatchOutcome::Dropped(_)));
        assert_eq!(session.messages().last().unwrap().content, "done");
    }

    #[test]
    fn test_second_stream_start_orphans_first() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(start("A"), &mut session);
        dispatcher.dispatch(start("B"), &mut session);

        let outcome = dispatcher.dispatch(delta("A", "lost"), &mut session);
        assert!(matches!(outcome, DispatchOutcome::Dropped(_)));

        dispatcher.dispatch(delta("B", "kept"), &mut session);
        assert_eq!(session.messages().get(0).unwrap().content, "");
        assert_eq!(session.messages().get(1).unwrap().content, "kept");
    }

    #[test]
    fn test_stream_end_for_other_agent_keeps_stream() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(start("A"), &mut session);
        let outcome = dispatcher.dispatch(
            StreamEvent::StreamEnd {
                agent: Some("B".into()),
            },
            &mut session,
        );
        assert_eq!(outcome, DispatchOutcome::Noop);

        dispatcher.dispatch(delta("A", "still here"), &mut session);
        assert_eq!(session.messages().last().unwrap().content, "still here");
    }

    #[test]
    fn test_stream_start_appends_any_message() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        let outcome = dispatcher.dispatch(
            StreamEvent::StreamStart {
                data: Message::system("service notice"),
            },
            &mut session,
        );
        assert_eq!(outcome, DispatchOutcome::Applied);

        let mut nameless = Message::assistant("A", "");
        nameless.agent_name = None;
        let outcome = dispatcher.dispatch(StreamEvent::StreamStart { data: nameless }, &mut session);
        assert_eq!(outcome, DispatchOutcome::Applied);

        assert_eq!(session.messages().len(), 2);
        assert!(session.messages().last().unwrap().streaming);
        assert!(dispatcher.active_stream(&session).is_none());

        let outcome = dispatcher.dispatch(delta("A", "x"), &mut session);
        assert!(matches!(
            outcome,
            DispatchOutcome::Dropped(DropReason::OrphanDelta { .. })
        ));
        assert_eq!(session.messages().last().unwrap().content, "");
    }

    #[test]
    fn test_only_tail_is_streaming() {
        let streaming_count =
            |session: &Session| session.messages().iter().filter(|m| m.streaming).count();
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(start("A"), &mut session);
        dispatcher.dispatch(start("B"), &mut session);
        assert_eq!(streaming_count(&session), 1);
        assert!(!session.messages().get(0).unwrap().streaming);
        assert!(session.messages().last().unwrap().streaming);

        dispatcher.dispatch(
            StreamEvent::Message {
                data: Message::system("notice"),
            },
            &mut session,
        );
        assert_eq!(streaming_count(&session), 0);
        assert!(dispatcher.active_stream(&session).is_none());

        dispatcher.dispatch(start("C"), &mut session);
        session.push_notice("Disconnected from server.");
        assert_eq!(streaming_count(&session), 0);
    }

    #[test]
    fn test_message_appends_verbatim() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        let message = Message::user("Is tea better than coffee?");
        dispatcher.dispatch(
            StreamEvent::Message {
                data: message.clone(),
            },
            &mut session,
        );
        assert_eq!(session.messages().last(), Some(&message));
    }

    #[test]
    fn test_typing_toggle_and_repeat() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        dispatcher.dispatch(typing("A", true), &mut session);
        assert!(session.typing().contains("A"));
        dispatcher.dispatch(typing("A", false), &mut session);
        let outcome = dispatcher.dispatch(typing("A", false), &mut session);

        assert_eq!(outcome, DispatchOutcome::Applied);
        assert!(session.typing().is_empty());
    }

    #[test]
    fn test_informational_events_do_not_mutate() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();
        dispatcher.dispatch(
            StreamEvent::RoundStart {
                round: 1,
                total_rounds: None,
            },
            &mut session,
        );
        let before = session.snapshot();

        assert_eq!(
            dispatcher.dispatch(StreamEvent::RoundEnd { round: Some(1) }, &mut session),
            DispatchOutcome::Noop
        );
        assert_eq!(
            dispatcher.dispatch(StreamEvent::StreamEnd { agent: None }, &mut session),
            DispatchOutcome::Noop
        );
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_malformed_and_unknown_frames() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        let outcome = dispatcher.dispatch_frame("{oops", &mut session);
        assert!(matches!(
            outcome,
            DispatchOutcome::Dropped(DropReason::Malformed(_))
        ));

        let outcome = dispatcher.dispatch_frame(r#"{"type":"typing","agent":"A"}"#, &mut session);
        assert!(matches!(
            outcome,
            DispatchOutcome::Dropped(DropReason::Malformed(_))
        ));

        let frame = json!({"type": "leaderboard", "scores": [1, 2]}).to_string();
        assert_eq!(
            dispatcher.dispatch_frame(&frame, &mut session),
            DispatchOutcome::Ignored("leaderboard".into())
        );

        assert_eq!(dispatcher.dropped(), 2);
        assert!(session.messages().is_empty());
        assert!(session.typing().is_empty());
    }

    #[test]
    fn test_frames_from_service() {
        let mut session = Session::new();
        let mut dispatcher = EventDispatcher::new();

        let frames = [
            json!({"type": "message", "data": {"role": "user", "name": "User", "content": "Topic", "timestamp": 1.0}}),
            json!({"type": "round_start", "round": 1, "total_rounds": 2}),
            json!({"type": "typing", "agent": "DeepSeek", "status": true}),
            json!({"type": "stream_start", "data": {"role": "assistant", "name": "DeepSeek", "content": "", "timestamp": 2.0}}),
            json!({"type": "stream_delta", "agent": "DeepSeek", "delta": "I "}),
            json!({"type": "stream_delta", "agent": "DeepSeek", "delta": "agree."}),
            json!({"type": "typing", "agent": "DeepSeek", "status": false}),
            json!({"type": "stream_end", "agent": "DeepSeek"}),
            json!({"type": "round_end", "round": 1}),
        ];
        for frame in frames.iter() {
            dispatcher.dispatch_frame(&frame.to_string(), &mut session);
        }

        assert_eq!(session.messages().len(), 2);
        let reply = session.messages().last().unwrap();
        assert_eq!(reply.content, "I agree.");
        assert!(!reply.streaming);
        assert!(session.typing().is_empty());
        assert_eq!(session.current_round(), 1);
        assert_eq!(session.rounds().total_rounds(), Some(2));
    }
}
