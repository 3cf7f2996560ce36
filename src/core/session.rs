//! Interactive translation session: input/output text, language pair and
//! debounced auto-translate.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::core::debounce::Debouncer;
use crate::core::models::{Language, TranslationRecord, TranslationStatus};
use crate::core::orchestrator::TranslationOrchestrator;

/// What a presentation surface renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub input_text: String,
    pub output_text: String,
    pub from: Language,
    pub to: Language,
    /// Message of the last failed translation. Cleared by the next success or
    /// when the orchestrator's error display period runs out.
    pub error: Option<String>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            input_text: String::new(),
            output_text: String::new(),
            from: Language::Japanese,
            to: Language::English,
            error: None,
        }
    }
}

/// Presentation-side controller around [`TranslationOrchestrator`].
///
/// Every input change bumps a revision counter. Results computed for an older
/// revision, or delivered after [`TranslationSession::close`], are dropped.
///
/// Must be created inside a tokio runtime.
pub struct TranslationSession {
    orchestrator: TranslationOrchestrator,
    debouncer: Debouncer,
    state: Arc<watch::Sender<SessionState>>,
    revision: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
    error_follower: JoinHandle<()>,
}

impl TranslationSession {
    pub fn new(orchestrator: TranslationOrchestrator, debounce: Duration) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        let state = Arc::new(state);
        let error_follower = tokio::spawn(follow_cleared_errors(
            orchestrator.subscribe_errors(),
            Arc::downgrade(&state),
        ));

        Self {
            orchestrator,
            debouncer: Debouncer::new(debounce),
            state,
            revision: Arc::new(AtomicU64::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
            error_follower,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receive every state change
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn status(&self) -> TranslationStatus {
        self.orchestrator.snapshot()
    }

    pub fn orchestrator(&self) -> &TranslationOrchestrator {
        &self.orchestrator
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Replace the input text and arm auto-translate.
    ///
    /// Blank input cancels any pending translation and clears the output
    /// right away rather than after the debounce delay.
    pub fn set_input(&self, text: &str) {
        if self.is_closed() {
            return;
        }

        let revision = self.bump_revision();
        self.state.send_modify(|state| state.input_text = text.to_string());

        if text.trim().is_empty() {
            self.debouncer.cancel();
            self.state.send_modify(|state| {
                state.output_text.clear();
                state.error = None;
            });
            return;
        }

        let orchestrator = self.orchestrator.clone();
        let state = self.state.clone();
        let current = self.revision.clone();
        let closed = self.closed.clone();
        let text = text.to_string();

        self.debouncer.schedule(async move {
            let outcome = orchestrator.auto_translate(&text).await;

            if closed.load(Ordering::SeqCst) || current.load(Ordering::SeqCst) != revision {
                debug!("Dropping auto-translate result for outdated input");
                return;
            }

            let error = orchestrator.last_error();
            state.send_modify(|state| {
                state.from = outcome.detected_from;
                state.to = outcome.detected_to;
                match outcome.result {
                    Some(result) => {
                        state.output_text = result;
                        state.error = None;
                    }
                    None => state.error = error,
                }
            });
        });
    }

    /// Translate the current input with the currently selected languages
    pub async fn translate_now(&self) -> Option<String> {
        if self.is_closed() {
            return None;
        }

        self.debouncer.cancel();
        let revision = self.bump_revision();
        let SessionState { input_text, from, to, .. } = self.state();

        if input_text.trim().is_empty() {
            self.state.send_modify(|state| state.output_text.clear());
            return None;
        }

        let result = self.orchestrator.translate(&input_text, from, to).await;

        if self.is_closed() || self.revision.load(Ordering::SeqCst) != revision {
            return result;
        }

        let error = self.orchestrator.last_error();
        self.state.send_modify(|state| match &result {
            Some(translated) => {
                state.output_text = translated.clone();
                state.error = None;
            }
            None => state.error = error,
        });
        result
    }

    /// Set the language pair explicitly
    pub fn set_languages(&self, from: Language, to: Language) {
        if self.is_closed() {
            return;
        }
        self.state.send_modify(|state| {
            state.from = from;
            state.to = to;
        });
    }

    /// Exchange languages and move the output into the input.
    ///
    /// The swapped texts are already a translation pair, so no auto-translate
    /// is armed and any pending one is cancelled.
    pub fn swap(&self) {
        if self.is_closed() {
            return;
        }

        self.debouncer.cancel();
        self.bump_revision();
        self.state.send_modify(|state| {
            std::mem::swap(&mut state.from, &mut state.to);
            std::mem::swap(&mut state.input_text, &mut state.output_text);
            state.error = None;
        });
    }

    /// Load a history entry into the session; `false` if the id is unknown
    pub fn select_history_item(&self, id: &str) -> bool {
        match self.orchestrator.history().get(id) {
            Some(record) => {
                self.select_record(&record);
                true
            }
            None => false,
        }
    }

    /// Show `record` as the current input/output pair.
    ///
    /// Like [`swap`](Self::swap), this cancels pending auto-translate instead
    /// of re-arming it, since the record already holds the translation.
    pub fn select_record(&self, record: &TranslationRecord) {
        if self.is_closed() {
            return;
        }

        self.debouncer.cancel();
        self.bump_revision();
        self.state.send_modify(|state| {
            state.input_text = record.original_text.clone();
            state.output_text = record.translated_text.clone();
            state.from = record.from_language;
            state.to = record.to_language;
            state.error = None;
        });
    }

    /// Tear the session down; pending and in-flight results are discarded
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.debouncer.cancel();
        self.error_follower.abort();
    }

    fn bump_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::SeqCst) + 1
    }
}

/// Drop the session's error message once the orchestrator clears its own
async fn follow_cleared_errors(
    mut errors: watch::Receiver<Option<String>>,
    state: Weak<watch::Sender<SessionState>>,
) {
    while errors.changed().await.is_ok() {
        if errors.borrow_and_update().is_some() {
            continue;
        }
        let Some(state) = state.upgrade() else {
            return;
        };
        state.send_if_modified(|state| state.error.take().is_some());
    }
}

impl Drop for TranslationSession {
    fn drop(&mut self) {
        self.close();
    }
}
