//! Interactive debate session

use super::{ClientHandle, Follow, Renderer};
use agora_core::{
    config::{AGENTS, MAX_ROUNDS, MIN_ROUNDS},
    ClientConfig, Command, DebateSettings,
};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use std::{io, time::Duration};
use tokio::task;
use tracing::warn;

/// Prompts for topics and runs one debate per topic until the user quits.
pub async fn run_chat(config: ClientConfig, linger: Duration) -> Result<()> {
    config.validate().context("invalid configuration")?;
    let mut settings = config.settings.clone();

    let mut client = ClientHandle::spawn(config, linger);
    client.connect().await?;

    let mut renderer = Renderer::new();
    renderer.render(&client.snapshot(), &mut io::stdout())?;

    while let Some(topic) = prompt_topic().await? {
        settings = prompt_settings(settings).await?;
        client.send(Command::Configure(settings.clone())).await?;
        let since = client.submit(topic).await?;

        match client.follow(&mut renderer, since).await? {
            Follow::Finished => {}
            Follow::Disconnected => {
                warn!("connection lost");
                break;
            }
            Follow::Interrupted => break,
        }
    }

    client.shutdown().await?;
    Ok(())
}

/// Reads a topic; an empty answer means quit.
async fn prompt_topic() -> Result<Option<String>> {
    let topic: String = task::spawn_blocking(|| {
        Input::<String>::new()
            .with_prompt("Debate topic (empty to quit)")
            .allow_empty(true)
            .interact_text()
    })
    .await??;

    let topic = topic.trim().to_string();
    Ok((!topic.is_empty()).then_some(topic))
}

async fn prompt_settings(current: DebateSettings) -> Result<DebateSettings> {
    task::spawn_blocking(move || -> Result<DebateSettings> {
        let names: Vec<String> = AGENTS
            .iter()
            .map(|agent| format!("{} {}", agent.emoji, agent.name))
            .collect();
        let default = AGENTS
            .iter()
            .position(|agent| agent.id == current.summarizer)
            .unwrap_or(0);

        let choice = Select::new()
            .with_prompt("Summarizer")
            .items(&names)
            .default(default)
            .interact()?;

        let rounds: u32 = Input::new()
            .with_prompt("Rounds")
            .default(current.rounds)
            .validate_with(|rounds: &u32| -> Result<(), String> {
                if (MIN_ROUNDS..=MAX_ROUNDS).contains(rounds) {
                    Ok(())
                } else {
                    Err(format!("choose {} to {}", MIN_ROUNDS, MAX_ROUNDS))
                }
            })
            .interact_text()?;

        let enable_web_search = Confirm::new()
            .with_prompt("Search the web first?")
            .default(current.enable_web_search)
            .interact()?;

        let summarizer = AGENTS
            .get(choice)
            .map_or(current.summarizer, |agent| agent.id.to_string());

        Ok(DebateSettings {
            rounds,
            summarizer,
            enable_web_search,
        })
    })
    .await?
}
