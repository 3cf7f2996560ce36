//! Main entry point for the Nihongo Bridge CLI

#![forbid(unsafe_code)]

use clap::Parser;
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nihongo_bridge::cli::commands::{self, Commands};
use nihongo_bridge::{BridgeConfig, TranslationOrchestrator};

/// Nihongo Bridge - Japanese/English translation with auto-detection
#[derive(Parser, Debug)]
#[command(name = "nihongo-bridge", version, about, long_about = None)]
struct Args {
    /// Base URL of a LibreTranslate-compatible service (defaults to TRANSLATE_API_URL env var)
    #[arg(long)]
    api_url: Option<String>,

    /// API key for the translation service (defaults to TRANSLATE_API_KEY env var)
    #[arg(long)]
    api_key: Option<String>,

    /// Directory for persisted history (defaults to BRIDGE_DATA_DIR or the user data dir)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep history in memory only
    #[arg(long, conflicts_with = "data_dir")]
    memory: bool,

    /// Load configuration from a JSON file instead of the environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("nihongo_bridge={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Override config with CLI args if provided
    let mut config = match &args.config {
        Some(path) => BridgeConfig::from_file(path)?,
        None => BridgeConfig::from_env()?,
    };
    if let Some(api_url) = args.api_url {
        config.api_url = api_url;
    }
    if let Some(api_key) = args.api_key {
        config.api_key = Some(api_key);
    }
    if let Some(data_dir) = args.data_dir {
        config.data_dir = Some(data_dir);
    }
    if args.memory {
        config.data_dir = None;
    }
    config.validate()?;

    let Some(command) = args.command else {
        println!("Please specify a command. Use --help for more information.");
        return Ok(());
    };

    let orchestrator = TranslationOrchestrator::from_config(&config)?;

    // Execute command
    match command {
        Commands::Translate { text, from, to } => {
            commands::handle_translate(&orchestrator, text, from, to).await?;
        }
        Commands::Detect { text, offline } => {
            commands::handle_detect(&orchestrator, text, offline).await?;
        }
        Commands::History { action } => {
            commands::handle_history(orchestrator.history(), action)?;
        }
        Commands::Interactive => {
            commands::handle_interactive(orchestrator, config.debounce(), config.timeout()).await?;
        }
        Commands::Server { host, port } => {
            commands::handle_server(orchestrator, host, port).await?;
        }
    }

    Ok(())
}
