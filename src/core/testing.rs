//! Scriptable translation service used by unit tests

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::core::client::TranslationApi;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Detection, TranslationRequest};

#[derive(Default)]
pub struct FakeApi {
    translations: Mutex<HashMap<String, String>>,
    delays: Mutex<HashMap<String, Duration>>,
    detection: Mutex<Option<String>>,
    fail_translations: AtomicBool,
    pub translate_calls: AtomicUsize,
    pub detect_calls: AtomicUsize,
    pub requests: Mutex<Vec<TranslationRequest>>,
}

impl FakeApi {
    /// Translates everything to `"<target>:<text>"`; detection is unavailable
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_translation(self, text: &str, translated: &str) -> Self {
        self.translations
            .lock()
            .unwrap()
            .insert(text.to_string(), translated.to_string());
        self
    }

    pub fn with_detection(self, language: &str) -> Self {
        *self.detection.lock().unwrap() = Some(language.to_string());
        self
    }

    pub fn with_delay(self, text: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(text.to_string(), delay);
        self
    }

    pub fn failing(self) -> Self {
        self.fail_translations.store(true, Ordering::SeqCst);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_translations.store(failing, Ordering::SeqCst);
    }

    fn fails_for(&self, text: &str) -> bool {
        self.fail_translations.load(Ordering::SeqCst) || text.contains("FAIL")
    }
}

#[async_trait]
impl TranslationApi for FakeApi {
    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        self.translate_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let delay = self.delays.lock().unwrap().get(&request.text).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.fails_for(&request.text) {
            return Err(TranslationError::ApiError {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }

        let mapped = self.translations.lock().unwrap().get(&request.text).cloned();
        Ok(mapped.unwrap_or_else(|| format!("{}:{}", request.target, request.text)))
    }

    async fn detect(&self, _text: &str) -> Result<Vec<Detection>> {
        self.detect_calls.fetch_add(1, Ordering::SeqCst);
        match self.detection.lock().unwrap().clone() {
            Some(language) => Ok(vec![Detection {
                language,
                confidence: 95.0,
            }]),
            None => Err(TranslationError::NetworkError {
                message: "detection unavailable".to_string(),
            }),
        }
    }
}
