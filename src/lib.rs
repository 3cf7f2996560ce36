//! Nihongo Bridge - Japanese/English translation utility
//!
//! Detects whether input is Japanese or English, translates it through a
//! LibreTranslate-compatible service, and keeps a bounded local history of
//! past translations. Exposed as a library, a CLI and an HTTP API.

#![forbid(unsafe_code)]

pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    client::{LibreTranslateClient, TranslationApi},
    config::BridgeConfig,
    debounce::Debouncer,
    detector::{detect_offline, LanguageDetector},
    errors::TranslationError,
    history::HistoryStore,
    models::{AutoTranslation, Language, TranslationRecord, TranslationRequest, TranslationStatus},
    orchestrator::TranslationOrchestrator,
    session::{SessionState, TranslationSession},
    storage::{FileStore, KeyValueStore, MemoryStore},
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
