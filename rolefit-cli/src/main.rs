//! rolefit - command-line client for the RoleFit benchmarking backend
//!
//! - Session login / logout against the backend's JWT auth
//! - Fleet, task, result and catalog listings
//! - AI analysis and LLM chat
//! - Database export / import

mod app;
mod commands;
mod output;
mod wizard;

use anyhow::{Context, Result};
use clap::Parser;
use rolefit_client::{ApiClient, ApiError, ClientConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use crate::app::{App, LOGIN_HINT};
use crate::commands::Cli;
use crate::output::Output;

const DEFAULT_LOG_FILTER: &str = "rolefit=info,rolefit_client=info";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("❌ {}", describe(&e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if ClientConfig::is_first_time_setup() {
        debug!("no config file yet, using defaults (run `rolefit config init` to create one)");
    }

    let mut config = ClientConfig::load().await.context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.api.base_url = base_url;
    }
    info!("🌐 Backend: {}", config.api.base_url);

    let tokens = config
        .open_token_store()
        .context("Failed to open session store")?;
    let client = ApiClient::from_config(&config, tokens)?;

    App::new(config, client, Output::new(cli.json))
        .run(cli.command)
        .await
}

/// One-line message for the terminal; an expired session gets the login hint.
fn describe(error: &anyhow::Error) -> String {
    match error.downcast_ref::<ApiError>() {
        Some(api) if api.is_unauthorized() => format!("session expired or rejected; {LOGIN_HINT}"),
        Some(api) if api.is_connectivity() => format!("{api} (is the backend running?)"),
        _ => format!("{error:#}"),
    }
}
