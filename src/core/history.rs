//! Bounded, deduplicated translation history

use std::sync::{Arc, Mutex};
use tracing::{debug, error, warn};

use crate::core::errors::Result;
use crate::core::models::{Language, TranslationRecord};
use crate::core::storage::KeyValueStore;

/// Storage key of the serialized history
pub const HISTORY_KEY: &str = "translation-history";

/// Maximum number of records kept
pub const MAX_HISTORY_ITEMS: usize = 50;

/// Newest-first history of translations persisted through a [`KeyValueStore`].
///
/// Every operation is best-effort: storage failures are logged and swallowed,
/// and unreadable data reads back as an empty history.
#[derive(Clone)]
pub struct HistoryStore {
    storage: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for HistoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStore").finish_non_exhaustive()
    }
}

impl HistoryStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self {
            storage,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All records, newest first
    pub fn get_all(&self) -> Vec<TranslationRecord> {
        let raw = match self.storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                error!("Failed to load history: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(records) => records,
            Err(e) => {
                warn!("Discarding unreadable history: {}", e);
                Vec::new()
            }
        }
    }

    /// Look up a single record
    pub fn get(&self, id: &str) -> Option<TranslationRecord> {
        self.get_all().into_iter().find(|record| record.id == id)
    }

    pub fn len(&self) -> usize {
        self.get_all().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a translation unless an identical one is already present
    pub fn add(
        &self,
        original_text: &str,
        translated_text: &str,
        from_language: Language,
        to_language: Language,
    ) {
        let record = TranslationRecord::new(original_text, translated_text, from_language, to_language);
        let _guard = self.lock();

        let mut history = self.get_all();
        if history.iter().any(|existing| existing.same_content(&record)) {
            debug!("Skipping duplicate history entry");
            return;
        }

        history.insert(0, record);
        history.truncate(MAX_HISTORY_ITEMS);

        if let Err(e) = self.persist(&history) {
            error!("Failed to save to history: {}", e);
        }
    }

    /// Remove the record with `id`, if present
    pub fn remove(&self, id: &str) {
        let _guard = self.lock();

        let mut history = self.get_all();
        history.retain(|record| record.id != id);

        if let Err(e) = self.persist(&history) {
            error!("Failed to remove from history: {}", e);
        }
    }

    /// Drop every record
    pub fn clear(&self) {
        let _guard = self.lock();

        if let Err(e) = self.persist(&[]) {
            error!("Failed to clear history: {}", e);
        }
    }

    fn persist(&self, history: &[TranslationRecord]) -> Result<()> {
        let json = serde_json::to_string(history)?;
        self.storage.set(HISTORY_KEY, &json)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
