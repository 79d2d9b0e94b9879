//! Proxy Quota CLI
//!
//! Talks to the proxy's management API to enumerate stored credentials, runs
//! one quota pass per invocation and prints the normalized result.

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config_commands;
mod quota_commands;

use cli::{ClaudeConfigCommands, Cli, Commands, ConfigCommands};
use proxy_quota_core::modules::config as core_config;
use proxy_quota_types::AppConfig;

fn init_logging(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Config file (or default location) plus environment and flag overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => core_config::config_path().context("Failed to locate data directory")?,
    };
    let config = core_config::load_config(
        &path,
        cli.management_url.as_deref(),
        cli.management_key.as_deref(),
    )
    .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match &cli.command {
        Commands::Refresh { provider, json, force } => {
            let config = resolve_config(&cli)?;
            quota_commands::refresh(config, *provider, *json, *force).await
        },
        Commands::TestCommand { model } => {
            let config = resolve_config(&cli)?;
            quota_commands::test_command(config, model).await
        },
        Commands::ClaudeConfig(ClaudeConfigCommands::Show { json }) => {
            config_commands::show_claude_config(*json)
        },
        Commands::ClaudeConfig(ClaudeConfigCommands::Set { opus, sonnet, haiku }) => {
            config_commands::set_claude_config(opus.as_deref(), sonnet.as_deref(), haiku.as_deref())
        },
        Commands::Config(ConfigCommands::Show { json }) => {
            let config = resolve_config(&cli)?;
            config_commands::show_config(&config, *json)
        },
        Commands::Config(ConfigCommands::Path) => {
            let path = match &cli.config {
                Some(path) => path.clone(),
                None => core_config::config_path()?,
            };
            println!("{}", path.display());
            Ok(())
        },
    }
}
