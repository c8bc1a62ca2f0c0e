//! Client configuration.
//!
//! Covers where to connect, how the transport behaves, and the debate
//! settings a new submission starts from.

use crate::error::{Error, Result};
use std::time::Duration;

/// Environment variable that overrides the service address.
pub const BACKEND_URL_ENV: &str = "AGORA_BACKEND_URL";
/// Address used for local development and when nothing else is known.
pub const DEFAULT_BACKEND_URL: &str = "ws://localhost:8000";
/// Path of the debate endpoint on the service.
pub const DEBATE_PATH: &str = "/ws/debate";

/// Smallest number of rounds a debate can request.
pub const MIN_ROUNDS: u32 = 1;
/// Largest number of rounds a debate can request.
pub const MAX_ROUNDS: u32 = 5;

/// An agent the service is known to offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentProfile {
    /// Identifier sent on the wire
    pub id: &'static str,
    /// Display name
    pub name: &'static str,
    pub emoji: &'static str,
}

/// Agents the debate service offers.
pub const AGENTS: &[AgentProfile] = &[
    AgentProfile {
        id: "deepseek-chat",
        name: "DeepSeek",
        emoji: "🔷",
    },
    AgentProfile {
        id: "qwen-turbo",
        name: "Qwen (千问)",
        emoji: "🟣",
    },
    AgentProfile {
        id: "doubao-pro-32k",
        name: "Doubao (豆包)",
        emoji: "🟢",
    },
];

/// Looks up a catalogue entry by wire id.
pub fn agent_profile(id: &str) -> Option<&'static AgentProfile> {
    AGENTS.iter().find(|agent| agent.id == id)
}

/// Where the client runs, used to derive an address when no override is given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLocation {
    pub hostname: String,
    /// Whether the host itself is served over a secure transport
    pub secure: bool,
}

/// Resolves the full debate endpoint URL.
///
/// An explicit override wins. Otherwise the host location decides: loopback
/// hosts talk to the local development service, anything else uses the same
/// host with `wss` or `ws` matching its own security.
pub fn resolve_endpoint(override_url: Option<&str>, location: Option<&HostLocation>) -> String {
    let base = match (override_url.map(str::trim).filter(|u| !u.is_empty()), location) {
        (Some(url), _) => url.to_string(),
        (None, Some(location)) => match location.hostname.as_str() {
            "localhost" | "127.0.0.1" => DEFAULT_BACKEND_URL.to_string(),
            host => {
                let scheme = if location.secure { "wss" } else { "ws" };
                format!("{}://{}", scheme, host)
            }
        },
        (None, None) => DEFAULT_BACKEND_URL.to_string(),
    };

    let base = base.trim_end_matches('/');
    if base.ends_with(DEBATE_PATH) {
        base.to_string()
    } else {
        format!("{}{}", base, DEBATE_PATH)
    }
}

/// Transport behavior.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Capacity of the inbound and outbound frame channels
    pub buffer_size: usize,
    /// Automatic reconnection attempts after a close; 0 disables reconnection
    pub max_reconnects: u32,
    /// Base delay between reconnection attempts, doubled each attempt
    pub reconnect_delay: Duration,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 32,
            max_reconnects: 0,
            reconnect_delay: Duration::from_secs(1),
        }
    }
}

/// Parameters packaged into every outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateSettings {
    pub rounds: u32,
    pub summarizer: String,
    pub enable_web_search: bool,
}

impl Default for DebateSettings {
    fn default() -> Self {
        Self {
            rounds: 3,
            summarizer: AGENTS[0].id.to_string(),
            enable_web_search: false,
        }
    }
}

impl DebateSettings {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_ROUNDS..=MAX_ROUNDS).contains(&self.rounds) {
            return Err(Error::validation(format!(
                "rounds must be between {} and {}, got {}",
                MIN_ROUNDS, MAX_ROUNDS, self.rounds
            )));
        }
        if self.summarizer.trim().is_empty() {
            return Err(Error::validation("summarizer cannot be empty"));
        }
        Ok(())
    }
}

/// Everything a client needs to start.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Fully resolved endpoint URL
    pub endpoint: String,
    pub connection: ConnectionConfig,
    pub settings: DebateSettings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: resolve_endpoint(None, None),
            connection: ConnectionConfig::default(),
            settings: DebateSettings::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Builds a config whose endpoint comes from [`BACKEND_URL_ENV`] when set.
    pub fn from_env(location: Option<&HostLocation>) -> Self {
        let override_url = std::env::var(BACKEND_URL_ENV).ok();
        Self::new(resolve_endpoint(override_url.as_deref(), location))
    }

    pub fn with_settings(mut self, settings: DebateSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(Error::validation("endpoint cannot be empty"));
        }
        if self.connection.buffer_size == 0 {
            return Err(Error::validation("buffer_size must be greater than zero"));
        }
        self.settings.validate()
    }
}
