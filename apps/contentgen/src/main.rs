mod cli;
mod commands;
mod config;
mod content;
mod errors;
mod export;
mod handlers;
mod layout;
mod llm_client;
mod output;
mod repl;
mod state;
mod store;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = Config::from_env()?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }

    // Logs go to stderr; stdout carries only content.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting contentgen v{}", env!("CARGO_PKG_VERSION"));

    let mut state = AppState::from_config(config)?;
    info!(
        "LLM client initialized (model: {}, {} API key(s))",
        state.llm.model(),
        state.llm.key_count()
    );

    let result = match cli.command {
        Commands::Session => repl::run_session(&mut state).await,
        command => commands::execute(&mut state, command).await,
    };

    Ok(match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) if output::notify(&e).soft => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    })
}
