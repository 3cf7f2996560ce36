//! CLI command definitions and handlers

use clap::Subcommand;
use std::io::Write;
use std::time::Duration;
use tokio::io::AsyncBufReadExt;
use tracing::{info, warn};

use crate::core::detector::detect_offline;
use crate::core::history::HistoryStore;
use crate::core::models::{Language, TranslationRecord};
use crate::core::orchestrator::TranslationOrchestrator;
use crate::core::session::{SessionState, TranslationSession};

/// Commands for Nihongo Bridge
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate text, detecting the source language unless given
    Translate {
        /// Text to translate
        text: String,

        /// Source language (ja or en)
        #[arg(long)]
        from: Option<Language>,

        /// Target language (ja or en)
        #[arg(long)]
        to: Option<Language>,
    },

    /// Detect whether text is Japanese or English
    Detect {
        /// Text to classify
        text: String,

        /// Skip the remote service and classify by script only
        #[arg(long)]
        offline: bool,
    },

    /// Inspect or edit translation history
    History {
        #[command(subcommand)]
        action: HistoryCommands,
    },

    /// Translate lines from stdin as you type them
    Interactive,

    /// Start HTTP API server
    Server {
        /// Bind address (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Listen port (default: 8000)
        #[arg(short, long, default_value_t = 8000)]
        port: u16,
    },
}

/// History subcommands
#[derive(Subcommand, Debug)]
pub enum HistoryCommands {
    /// List past translations, newest first
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,

        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Delete one entry
    Remove {
        /// Entry id as shown by `history list`
        id: String,
    },

    /// Delete every entry
    Clear,
}

/// Handle translate command
pub async fn handle_translate(
    orchestrator: &TranslationOrchestrator,
    text: String,
    from: Option<Language>,
    to: Option<Language>,
) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        anyhow::bail!("Nothing to translate");
    }

    let outcome = orchestrator.translate_with_hints(&text, from, to).await;
    info!("Translating {} -> {}", outcome.detected_from, outcome.detected_to);

    match outcome.result {
        Some(translated) => {
            println!("{}", translated);
            Ok(())
        }
        None => {
            let message = orchestrator
                .last_error()
                .unwrap_or_else(|| "Translation failed".to_string());
            anyhow::bail!(message)
        }
    }
}

/// Handle detect command
pub async fn handle_detect(
    orchestrator: &TranslationOrchestrator,
    text: String,
    offline: bool,
) -> anyhow::Result<()> {
    let language = if offline {
        detect_offline(&text)
    } else {
        orchestrator.detector().detect(&text).await
    };

    println!("{}", language);
    Ok(())
}

/// Handle history subcommands
pub fn handle_history(history: &HistoryStore, action: HistoryCommands) -> anyhow::Result<()> {
    match action {
        HistoryCommands::List { json, limit } => {
            let mut records = history.get_all();
            if let Some(limit) = limit {
                records.truncate(limit);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&records)?);
            } else if records.is_empty() {
                println!("No translation history");
            } else {
                for record in &records {
                    println!("{}", format_record(record));
                }
            }
        }
        HistoryCommands::Remove { id } => {
            if history.get(&id).is_none() {
                anyhow::bail!("No history entry with id {}", id);
            }
            history.remove(&id);
            println!("Removed {}", id);
        }
        HistoryCommands::Clear => {
            history.clear();
            println!("History cleared");
        }
    }

    Ok(())
}

fn language_name(language: Language) -> &'static str {
    match language {
        Language::Japanese => "日本語",
        Language::English => "English",
    }
}

fn format_record(record: &TranslationRecord) -> String {
    let when = record
        .created_at()
        .map(|t| t.format("%m/%d %H:%M").to_string())
        .unwrap_or_default();

    format!(
        "{}  {}  {} → {}\n    {}\n    {}",
        record.id,
        when,
        language_name(record.from_language),
        language_name(record.to_language),
        record.original_text,
        record.translated_text
    )
}

const INTERACTIVE_HELP: &str = "Type text to translate. Commands: :swap  :retry  :history  :select <id>  :quit";

/// Handle interactive command
pub async fn handle_interactive(
    orchestrator: TranslationOrchestrator,
    debounce: Duration,
    request_timeout: Duration,
) -> anyhow::Result<()> {
    let session = TranslationSession::new(orchestrator.clone(), debounce);
    let printer = tokio::spawn(print_updates(session.subscribe()));

    println!("{}", INTERACTIVE_HELP);

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim_end();
        match line.split_once(' ').unwrap_or((line, "")) {
            (":quit", _) | (":q", _) => break,
            (":swap", _) => session.swap(),
            (":retry", _) => {
                session.translate_now().await;
            }
            (":history", _) => {
                for record in orchestrator.history().get_all().iter().take(10) {
                    println!("{}", format_record(record));
                }
            }
            (":select", id) => {
                if !session.select_history_item(id.trim()) {
                    eprintln!("No history entry with id {}", id.trim());
                }
            }
            (":help", _) => println!("{}", INTERACTIVE_HELP),
            _ => session.set_input(line),
        }
    }

    // Let the last debounced request finish before tearing down
    tokio::time::sleep(debounce + Duration::from_millis(50)).await;
    let deadline = tokio::time::Instant::now() + request_timeout;
    while session.status().is_translating && tokio::time::Instant::now() < deadline {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    session.close();
    drop(session);
    join_printer(printer).await;
    Ok(())
}

/// Wait for the output printer, logging instead of propagating a crash
async fn join_printer(printer: tokio::task::JoinHandle<()>) -> bool {
    match printer.await {
        Ok(()) => true,
        Err(e) => {
            warn!("Output printer task failed: {}", e);
            false
        }
    }
}

async fn print_updates(mut updates: tokio::sync::watch::Receiver<SessionState>) {
    let mut last_output = String::new();
    let mut last_error = None;

    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();

        if state.error != last_error {
            if let Some(message) = &state.error {
                eprintln!("⚠️  {}", message);
            }
            last_error = state.error.clone();
        }

        if state.output_text != last_output {
            if !state.output_text.is_empty() {
                println!("[{} → {}] {}", state.from, state.to, state.output_text);
                let _ = std::io::stdout().flush();
            }
            last_output = state.output_text;
        }
    }
}

/// Handle server command
pub async fn handle_server(
    orchestrator: TranslationOrchestrator,
    host: String,
    port: u16,
) -> anyhow::Result<()> {
    use crate::server::api::run_server;

    info!("Starting HTTP server on {}:{}", host, port);
    println!("🚀 Server starting on http://{}:{}", host, port);

    run_server(host, port, orchestrator).await?;

    Ok(())
}
