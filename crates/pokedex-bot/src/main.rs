//! Pokedex - Discord bot for Pokemon reference data.
//!
//! Answers `/learnset`, `/moves`, `/dex`, `/weak` and `/coverage` over
//! Discord's HTTP interactions endpoint. Button state travels inside the
//! buttons themselves, so the process keeps nothing between requests.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pokedex_config::Config;
use pokedex_discord::{CommandScope, DiscordRest, RequestVerifier, ServerConfig};
use pokedex_interaction::{CommandRegistry, Dispatcher};
use pokedex_telemetry::{LogConfig, setup_logging};
use tokio::net::TcpListener;
use tracing::{info, warn};

mod commands;
mod dex;

use commands::Settings;
use dex::SnapshotDex;

/// Pokedex - Pokemon reference data on Discord
#[derive(Parser)]
#[command(name = "pokedex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, env = "POKEDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactions endpoint (default)
    Serve {
        /// Skip slash command registration at startup
        #[arg(long)]
        no_register: bool,
    },

    /// Register slash commands with Discord and exit
    Register,

    /// Print slash command definitions as JSON
    Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    let mut log_config = LogConfig::from_section(&config.logging)?;
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    let _guard = setup_logging(&log_config).context("failed to initialize logging")?;

    let registry = Arc::new(build_registry(&config)?);

    match cli.command.unwrap_or(Commands::Serve { no_register: false }) {
        Commands::Serve { no_register } => {
            if config.discord.register_commands && !no_register {
                register(&config, &registry).await?;
            }
            serve(&config, registry).await?;
        },
        Commands::Register => {
            register(&config, &registry).await?;
        },
        Commands::Commands => {
            println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
        },
    }

    Ok(())
}

fn build_registry(config: &Config) -> Result<CommandRegistry> {
    let dex = SnapshotDex::load(&config.dataset.path).context("failed to load dataset")?;
    let settings = Settings::from_config(&config.commands, &config.dataset);
    commands::build_registry(Arc::new(dex), settings).context("failed to build command registry")
}

/// Replace the application's slash commands with the registry's.
async fn register(config: &Config, registry: &CommandRegistry) -> Result<()> {
    let rest = DiscordRest::new(
        config.discord.require_bot_token()?,
        config.discord.require_application_id()?,
    );
    let scope = CommandScope::from_guild(config.discord.guild_id.as_deref());
    let count = rest
        .overwrite_commands(scope, &registry.definitions())
        .await
        .context("failed to register slash commands")?;
    info!(count, ?scope, "registered slash commands");
    Ok(())
}

async fn serve(config: &Config, registry: Arc<CommandRegistry>) -> Result<()> {
    let verifier = RequestVerifier::from_hex(config.discord.require_public_key()?)?;
    let server = ServerConfig {
        path: config.server.path.clone(),
        max_body_bytes: config.server.max_body_bytes,
    };
    let router = pokedex_discord::router(Dispatcher::new(registry), verifier, &server);
    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;
    pokedex_discord::serve(listener, router, shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_to_serve() {
        let cli = Cli::try_parse_from(["pokedex"]).unwrap();
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn cli_accepts_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pokedex", "register", "-v", "--config", "bot.toml"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Register)));
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("bot.toml")));
    }

    #[test]
    fn registry_builds_from_bundled_dataset() {
        let mut config = Config::default();
        config.dataset.path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data/pokedex.json");
        let registry = build_registry(&config).unwrap();
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn missing_dataset_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.dataset.path = dir.path().join("none.json");
        let err = build_registry(&config).unwrap_err();
        assert!(format!("{err:#}").contains("none.json"));
    }
}
