// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parley - provider-agnostic chat agents with paced streaming delivery.
//!
//! This binary wires configuration, the builtin registry, and the
//! selector together for inspection (`status`, `models`) and one-shot
//! prompts (`ask`). The chat surface itself (Telegram, Slack, ...) is an
//! external collaborator; `ask` streams deltas straight to stdout.

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use parley_agent::{select_chat_agent, AgentRegistry};
use parley_config::ParleyConfig;
use parley_core::{ChatAgent, ChatMessage, ChatRequest, DeltaSink, ParleyError};
use tokio_util::sync::CancellationToken;

/// Parley - chat with interchangeable language-model backends.
#[derive(Parser, Debug)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show registered providers and their enablement.
    Status,
    /// List the selected provider's configured models.
    Models,
    /// Send a one-shot prompt and stream the reply to stdout.
    Ask {
        /// The prompt text.
        prompt: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match parley_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            parley_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.agent.log_level);

    let registry = parley_agent::builtin_registry();

    let result = match cli.command {
        Some(Commands::Status) | None => status(&registry, &config),
        Some(Commands::Models) => models(&registry, &config),
        Some(Commands::Ask { prompt }) => ask(&registry, &config, prompt.join(" ")).await,
    };

    if let Err(e) = result {
        eprintln!("parley: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Prints one line per registered chat provider.
fn status(registry: &AgentRegistry, config: &ParleyConfig) -> Result<(), ParleyError> {
    println!("{:<12} {:<9} {}", "provider", "state", "model");
    for agent in registry.chat_agents() {
        let state = if agent.enabled(config) {
            "enabled"
        } else {
            "disabled"
        };
        println!(
            "{:<12} {:<9} {}",
            agent.name(),
            state,
            agent.current_model(config)
        );
    }
    println!();
    println!("chat.provider = {}", config.chat.provider);
    Ok(())
}

/// Prints the selected provider's model list, one per line.
fn models(registry: &AgentRegistry, config: &ParleyConfig) -> Result<(), ParleyError> {
    let agent = select_chat_agent(registry, config, None)?;
    for model in agent.model_list(config)? {
        println!("{model}");
    }
    Ok(())
}

/// Streams a one-shot reply to stdout.
async fn ask(
    registry: &AgentRegistry,
    config: &ParleyConfig,
    prompt: String,
) -> Result<(), ParleyError> {
    if prompt.trim().is_empty() {
        return Err(ParleyError::Config("ask needs a non-empty prompt".into()));
    }

    let agent = select_chat_agent(registry, config, None)?;
    let request = ChatRequest {
        system_prompt: String::new(),
        messages: vec![ChatMessage::user(prompt)],
        extra_params: Default::default(),
    };
    let cancel = CancellationToken::new();
    let mut sink = StdoutSink;

    agent.request(config, &request, &cancel, &mut sink).await?;
    println!();
    Ok(())
}

/// Prints each delta as it arrives.
struct StdoutSink;

#[async_trait]
impl DeltaSink for StdoutSink {
    async fn on_delta(&mut self, delta: &str) -> Result<(), ParleyError> {
        use std::io::Write;

        print!("{delta}");
        let _ = std::io::stdout().flush();
        Ok(())
    }
}
