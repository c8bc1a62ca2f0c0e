//! Agora Command Line Interface
//! Runs debates against the debate service from a terminal

use agora_core::{
    config::{resolve_endpoint, ClientConfig, DebateSettings, MAX_ROUNDS, MIN_ROUNDS},
    logging,
};
use clap::{Parser, Subcommand};
use std::time::Duration;
use tracing::{error, info};

mod commands;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter directive; RUST_LOG takes precedence
    #[arg(long, global = true, default_value = "warn")]
    log: String,

    /// Debate service URL
    #[arg(long, global = true, env = "AGORA_BACKEND_URL")]
    url: Option<String>,

    /// Seconds of silence after the last round before giving up on the summary
    #[arg(long, global = true, default_value_t = commands::DEFAULT_LINGER_SECS)]
    linger: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the agents the service offers
    Agents,

    /// Run a single debate and print it as it streams
    Debate {
        /// Debate topic
        #[arg(short, long)]
        topic: String,

        /// Number of rounds
        #[arg(short, long, default_value_t = 3,
              value_parser = clap::value_parser!(u32).range(MIN_ROUNDS as i64..=MAX_ROUNDS as i64))]
        rounds: u32,

        /// Agent that writes the closing summary
        #[arg(short, long, default_value = "deepseek-chat")]
        summarizer: String,

        /// Let the service search the web before debating
        #[arg(long)]
        web_search: bool,

        /// Print the final session as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start an interactive debate session
    Chat,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log);

    let config = ClientConfig::new(resolve_endpoint(cli.url.as_deref(), None));
    info!(endpoint = %config.endpoint, "using debate service");
    let linger = Duration::from_secs(cli.linger);

    let result = match cli.command {
        Commands::Agents => {
            commands::list_agents();
            Ok(())
        }
        Commands::Debate {
            topic,
            rounds,
            summarizer,
            web_search,
            json,
        } => {
            let settings = DebateSettings {
                rounds,
                summarizer,
                enable_web_search: web_search,
            };
            commands::run_debate(config.with_settings(settings), topic, json, linger).await
        }
        Commands::Chat => commands::run_chat(config, linger).await,
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
