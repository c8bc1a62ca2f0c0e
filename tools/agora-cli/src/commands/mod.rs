//! Command implementations for the Agora CLI tool.
//!
//! Every command that talks to the service runs a [`DebateClient`] on its own
//! task and follows it through a [`ClientHandle`].

mod agents;
mod chat;
mod debate;
mod render;

pub use agents::list_agents;
pub use chat::run_chat;
pub use debate::run_debate;
pub use render::Renderer;

use agora_core::{
    connection::ConnectionMetrics, ClientConfig, Command, DebateClient, SessionSnapshot,
    WsConnector,
};
use anyhow::{bail, Context, Result};
use std::{io, sync::Arc, time::Duration};
use tokio::{
    signal,
    sync::{mpsc, watch},
    task::JoinHandle,
    time,
};
use tracing::{info, warn};

/// Default idle time to wait after `debate_complete` when the service never
/// sends its final notice.
pub const DEFAULT_LINGER_SECS: u64 = 60;

/// Why [`ClientHandle::follow`] stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Follow {
    /// The debate and its summary completed, or the stream went quiet
    Finished,
    /// The connection dropped
    Disconnected,
    /// The user pressed Ctrl-C
    Interrupted,
}

/// Where a followed debate stands in one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Running,
    /// Rounds are over; the summary may still be on its way
    Summarizing,
    Done,
}

fn progress(snapshot: &SessionSnapshot, since: usize, seen_debating: bool) -> Progress {
    if snapshot.debating || !seen_debating {
        Progress::Running
    } else if snapshot.summary_finished(since) {
        Progress::Done
    } else {
        Progress::Summarizing
    }
}

/// A running client task and the channels to drive it.
pub struct ClientHandle {
    endpoint: String,
    linger: Duration,
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<SessionSnapshot>,
    metrics: Arc<ConnectionMetrics>,
    task: JoinHandle<agora_core::Result<()>>,
}

impl ClientHandle {
    pub fn spawn(config: ClientConfig, linger: Duration) -> Self {
        let endpoint = config.endpoint.clone();
        let client = DebateClient::new(config, Arc::new(WsConnector));
        let snapshots = client.subscribe();
        let metrics = client.metrics();
        let (commands, rx) = mpsc::channel(16);
        let task = tokio::spawn(client.run(rx));

        Self {
            endpoint,
            linger,
            commands,
            snapshots,
            metrics,
            task,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .context("debate client stopped")
    }

    /// Connects and waits for the outcome.
    pub async fn connect(&mut self) -> Result<()> {
        self.send(Command::Connect).await?;
        let connected = self
            .snapshots
            .wait_for(|s| s.connected || !s.messages.is_empty())
            .await
            .context("debate client stopped")?
            .connected;

        if !connected {
            bail!("could not connect to {}", self.endpoint);
        }
        Ok(())
    }

    /// Submits a topic. Returns the message count before the submission,
    /// which [`ClientHandle::follow`] uses to scope its finish check.
    pub async fn submit(&self, topic: String) -> Result<usize> {
        let since = self.snapshots.borrow().messages.len();
        self.send(Command::Submit(topic)).await?;
        Ok(since)
    }

    /// Renders snapshots until the debate submitted at `since` is over.
    ///
    /// The debate is over once the service's final notice arrives or the
    /// summary stream ends. If neither shows up, following stops after the
    /// session has been idle for the linger period following
    /// `debate_complete`.
    pub async fn follow(&mut self, renderer: &mut Renderer, since: usize) -> Result<Follow> {
        let mut stdout = io::stdout();
        let mut seen_debating = false;

        loop {
            let snapshot = self.snapshots.borrow_and_update().clone();
            renderer.render(&snapshot, &mut stdout)?;

            if !snapshot.connected {
                return Ok(Follow::Disconnected);
            }
            seen_debating |= snapshot.debating;
            let summarizing = match progress(&snapshot, since, seen_debating) {
                Progress::Done => return Ok(Follow::Finished),
                Progress::Summarizing => true,
                Progress::Running => false,
            };

            tokio::select! {
                changed = self.snapshots.changed() => {
                    if changed.is_err() {
                        return Ok(Follow::Disconnected);
                    }
                }
                _ = time::sleep(self.linger), if summarizing => {
                    warn!(linger = ?self.linger, "no final notice from the service");
                    return Ok(Follow::Finished);
                }
                _ = signal::ctrl_c() => {
                    warn!("interrupted");
                    return Ok(Follow::Interrupted);
                }
            }
        }
    }

    /// Stops the client and returns its final state.
    pub async fn shutdown(self) -> Result<SessionSnapshot> {
        let _ = self.commands.send(Command::Shutdown).await;
        self.task.await.context("debate client panicked")??;

        let stats = self.metrics.get_metrics();
        info!(
            frames_received = stats.frames_received,
            requests_sent = stats.requests_sent,
            errors = stats.errors,
            opens = stats.opens,
            "connection stats"
        );
        let snapshot = self.snapshots.borrow().clone();
        Ok(snapshot)
    }
}
