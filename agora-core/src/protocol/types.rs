//! Protocol types module containing message and request definitions.
//!
//! These are the records exchanged with the debate service: conversation
//! messages (inbound, and kept in the local store) and the single outbound
//! request a client sends to start a debate.

use serde::{Deserialize, Serialize};

/// Marker the service puts in the agent name of the closing summary stream.
pub const SUMMARY_MARKER: &str = "总结";
/// System notice the service sends once the debate and its summary are done.
pub const COMPLETION_NOTICE: &str = "✅ 辩论与总结全部完成！";
/// Prefix of the system notice sent when the summary could not be generated.
pub const SUMMARY_FAILED_PREFIX: &str = "总结生成失败";

/// Who authored a message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The human who submitted the topic
    User,
    /// One of the debating agents
    Assistant,
    /// Notices from the service or the client itself
    System,
}

/// A single conversation entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    /// Author role
    pub role: Role,
    /// Agent that produced the message, present for assistant messages
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    /// Message text; grows while the message is streaming
    #[serde(default)]
    pub content: String,
    /// Epoch seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    /// Set while the message is receiving deltas
    #[serde(skip)]
    pub streaming: bool,
}

impl Message {
    /// Creates a system notice.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            agent_name: None,
            content: content.into(),
            timestamp: Some(now_epoch_seconds()),
            streaming: false,
        }
    }

    /// Creates an assistant message attributed to `agent`.
    pub fn assistant(agent: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            agent_name: Some(agent.into()),
            content: content.into(),
            timestamp: None,
            streaming: false,
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            agent_name: Some("User".to_string()),
            content: content.into(),
            timestamp: Some(now_epoch_seconds()),
            streaming: false,
        }
    }

    /// Returns true if this assistant message was authored by `agent`.
    pub fn is_from(&self, agent: &str) -> bool {
        self.role == Role::Assistant && self.agent_name.as_deref() == Some(agent)
    }

    /// Returns true for the service notice that ends a debate, whether the
    /// summary succeeded or failed.
    pub fn is_final_notice(&self) -> bool {
        self.role == Role::System
            && (self.content == COMPLETION_NOTICE
                || self.content.starts_with(SUMMARY_FAILED_PREFIX))
    }

    /// Returns true for the closing summary produced by the summarizer.
    pub fn is_summary(&self) -> bool {
        self.agent_name
            .as_deref()
            .map_or(false, |name| name.contains(SUMMARY_MARKER))
    }
}

/// Request sent to the service to start a debate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OutboundRequest {
    /// Debate topic
    pub content: String,
    /// Epoch seconds at submission
    pub timestamp: f64,
    /// Agents to use; empty lets the service decide
    pub agents: Vec<String>,
    /// Number of rounds requested
    pub rounds: u32,
    /// Agent that writes the closing summary
    pub summarizer: String,
    /// Whether the service should search the web before debating
    pub enable_web_search: bool,
}

impl OutboundRequest {
    pub fn new(
        content: impl Into<String>,
        rounds: u32,
        summarizer: impl Into<String>,
        enable_web_search: bool,
    ) -> Self {
        Self {
            content: content.into(),
            timestamp: now_epoch_seconds(),
            agents: Vec::new(),
            rounds,
            summarizer: summarizer.into(),
            enable_web_search,
        }
    }
}

/// Current wall-clock time as fractional epoch seconds (millisecond precision).
pub fn now_epoch_seconds() -> f64 {
    chrono::Utc::now().timestamp_millis() as f64 / 1000.0
}
