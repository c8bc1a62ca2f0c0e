//! One-shot debate command

use super::{ClientHandle, Follow, Renderer};
use agora_core::ClientConfig;
use anyhow::{bail, Context, Result};
use std::time::Duration;
use tracing::info;

/// Connects, submits `topic`, and prints the debate until it finishes.
pub async fn run_debate(
    config: ClientConfig,
    topic: String,
    json: bool,
    linger: Duration,
) -> Result<()> {
    if topic.trim().is_empty() {
        bail!("topic cannot be empty");
    }
    config.validate().context("invalid configuration")?;

    let mut client = ClientHandle::spawn(config, linger);
    client.connect().await?;
    let since = client.submit(topic).await?;

    let mut renderer = Renderer::new();
    let outcome = client.follow(&mut renderer, since).await?;
    info!(?outcome, "stopped following debate");

    let snapshot = client.shutdown().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    if outcome == Follow::Disconnected {
        bail!("connection lost before the debate finished");
    }
    Ok(())
}
