//! Translation workflow: detection, remote request, history and transient state

use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::core::client::{LibreTranslateClient, TranslationApi};
use crate::core::config::BridgeConfig;
use crate::core::detector::LanguageDetector;
use crate::core::errors::Result;
use crate::core::history::HistoryStore;
use crate::core::storage::{FileStore, KeyValueStore, MemoryStore};
use crate::core::models::{AutoTranslation, Language, TranslationRequest, TranslationStatus};

/// Message shown to the user when a translation request fails
pub const TRANSLATION_FAILED_MESSAGE: &str =
    "Translation failed. Please wait a moment and try again.";

#[derive(Debug, Default)]
struct OrchestratorState {
    is_translating: bool,
    last_error: Option<String>,
    /// Generation of the most recently started request
    generation: u64,
}

/// Coordinates translation requests and the loading/error state around them.
///
/// Each request takes a generation number. When requests overlap, only the
/// newest one may update `is_translating` and `last_error`; older responses
/// still reach their own caller and still land in history.
#[derive(Clone)]
pub struct TranslationOrchestrator {
    api: Arc<dyn TranslationApi>,
    detector: LanguageDetector,
    history: HistoryStore,
    state: Arc<Mutex<OrchestratorState>>,
    /// Mirrors `last_error` for presentation layers
    errors: Arc<watch::Sender<Option<String>>>,
    error_display: Duration,
}

impl TranslationOrchestrator {
    pub fn new(api: Arc<dyn TranslationApi>, history: HistoryStore, error_display: Duration) -> Self {
        let (errors, _) = watch::channel(None);
        Self {
            detector: LanguageDetector::new(api.clone()),
            api,
            history,
            state: Arc::new(Mutex::new(OrchestratorState::default())),
            errors: Arc::new(errors),
            error_display,
        }
    }

    /// Wire up the HTTP client and history storage described by `config`
    pub fn from_config(config: &BridgeConfig) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = match &config.data_dir {
            Some(dir) => {
                info!("History stored in {}", dir.display());
                Arc::new(FileStore::new(dir)?)
            }
            None => Arc::new(MemoryStore::new()),
        };

        let api = Arc::new(LibreTranslateClient::new(config.clone())?);
        Ok(Self::new(api, HistoryStore::new(storage), config.error_display()))
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn detector(&self) -> &LanguageDetector {
        &self.detector
    }

    /// Current loading/error state
    pub fn snapshot(&self) -> TranslationStatus {
        let state = self.lock();
        TranslationStatus {
            is_translating: state.is_translating,
            last_error: state.last_error.clone(),
        }
    }

    pub fn is_translating(&self) -> bool {
        self.lock().is_translating
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Follow `last_error` as it is set and cleared, including the timed clear
    pub fn subscribe_errors(&self) -> watch::Receiver<Option<String>> {
        self.errors.subscribe()
    }

    pub fn error_display(&self) -> Duration {
        self.error_display
    }

    /// Dismiss the current error message
    pub fn clear_error(&self) {
        let mut state = self.lock();
        state.last_error = None;
        self.errors.send_replace(None);
    }

    /// Translate `text`, recording successes in history.
    ///
    /// Returns `None` for blank input (without touching any state) and on
    /// failure, in which case `last_error` carries a user-facing message.
    pub async fn translate(&self, text: &str, from: Language, to: Language) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        let generation = self.begin();
        let request = TranslationRequest::new(text, from, to);

        match self.api.translate(&request).await {
            Ok(translated) => {
                self.history.add(text, &translated, from, to);
                self.finish(generation, None);
                info!("Translated {} chars ({} -> {})", text.chars().count(), from, to);
                Some(translated)
            }
            Err(e) => {
                warn!("Translation error: {}", e);
                self.finish(generation, Some(TRANSLATION_FAILED_MESSAGE.to_string()));
                None
            }
        }
    }

    /// Detect the source language, pick the other one as target, and translate
    pub async fn auto_translate(&self, text: &str) -> AutoTranslation {
        let detected_from = self.detector.detect(text).await;
        let detected_to = detected_from.other();
        let result = self.translate(text, detected_from, detected_to).await;

        AutoTranslation {
            detected_from,
            detected_to,
            result,
        }
    }

    /// Translate with optional explicit languages.
    ///
    /// A missing side of the pair is the toggle of the given one; with
    /// neither given this is [`auto_translate`](Self::auto_translate).
    pub async fn translate_with_hints(
        &self,
        text: &str,
        from: Option<Language>,
        to: Option<Language>,
    ) -> AutoTranslation {
        let (detected_from, detected_to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            (Some(from), None) => (from, from.other()),
            (None, Some(to)) => (to.other(), to),
            (None, None) => return self.auto_translate(text).await,
        };

        let result = self.translate(text, detected_from, detected_to).await;
        AutoTranslation {
            detected_from,
            detected_to,
            result,
        }
    }

    fn begin(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.is_translating = true;
        state.last_error = None;
        self.errors.send_replace(None);
        state.generation
    }

    fn finish(&self, generation: u64, error: Option<String>) {
        let mut state = self.lock();
        if state.generation != generation {
            debug!(
                "Ignoring stale response (generation {}, current {})",
                generation, state.generation
            );
            return;
        }

        state.is_translating = false;
        if let Some(message) = error {
            state.last_error = Some(message.clone());
            self.errors.send_replace(Some(message));
            drop(state);
            self.schedule_error_clear(generation);
        }
    }

    fn schedule_error_clear(&self, generation: u64) {
        let state: Weak<Mutex<OrchestratorState>> = Arc::downgrade(&self.state);
        let errors = Arc::downgrade(&self.errors);
        let delay = self.error_display;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Orchestrator already dropped
            let Some(state) = state.upgrade() else {
                return;
            };
            let mut state = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if state.generation == generation {
                state.last_error = None;
                if let Some(errors) = errors.upgrade() {
                    errors.send_replace(None);
                }
            }
        });
    }

    fn lock(&self) -> MutexGuard<'_, OrchestratorState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
