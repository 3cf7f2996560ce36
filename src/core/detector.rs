//! Source language detection with an offline fallback

use regex::Regex;
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

use crate::core::client::TranslationApi;
use crate::core::models::Language;

/// Hiragana, Katakana and CJK unified ideographs
fn japanese_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"[\x{3040}-\x{309F}\x{30A0}-\x{30FF}\x{4E00}-\x{9FAF}]")
            .expect("valid Japanese character pattern")
    })
}

/// Classify `text` by script alone, without touching the network
pub fn detect_offline(text: &str) -> Language {
    if japanese_chars().is_match(text) {
        Language::Japanese
    } else {
        Language::English
    }
}

/// Resolves the source language of user input
#[derive(Clone)]
pub struct LanguageDetector {
    api: Arc<dyn TranslationApi>,
}

impl LanguageDetector {
    pub fn new(api: Arc<dyn TranslationApi>) -> Self {
        Self { api }
    }

    /// Best guess for the language of `text`. Never fails.
    pub async fn detect(&self, text: &str) -> Language {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Language::default();
        }

        match self.api.detect(trimmed).await {
            Ok(detections) => {
                let language = detections
                    .first()
                    .and_then(|d| Language::from_code(&d.language))
                    .unwrap_or_default();
                debug!("Remote detection: {:?} -> {}", detections.first(), language);
                language
            }
            Err(e) => {
                warn!("Language detection failed, using offline heuristic: {}", e);
                detect_offline(text)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::{Result, TranslationError};
    use crate::core::models::{Detection, TranslationRequest};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Detection endpoint stub that counts calls
    struct StubApi {
        response: Option<Vec<Detection>>,
        calls: AtomicUsize,
    }

    impl StubApi {
        fn answering(language: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Some(vec![Detection {
                    language: language.to_string(),
                    confidence: 90.0,
                }]),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                response: None,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TranslationApi for StubApi {
        async fn translate(&self, _request: &TranslationRequest) -> Result<String> {
            unimplemented!("detection tests never translate")
        }

        async fn detect(&self, _text: &str) -> Result<Vec<Detection>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone().ok_or(TranslationError::NetworkError {
                message: "offline".to_string(),
            })
        }
    }

    #[test]
    fn test_offline_japanese_scripts() {
        for text in ["ひらがな", "カタカナ", "漢字", "東京タワーへいく"] {
            assert_eq!(detect_offline(text), Language::Japanese, "{}", text);
        }
    }

    #[test]
    fn test_offline_latin_text() {
        for text in ["hello world", "Rust 1.75!", "", "café"] {
            assert_eq!(detect_offline(text), Language::English, "{}", text);
        }
    }

    #[test]
    fn test_offline_mixed_text_with_kana() {
        assert_eq!(detect_offline("I like すし"), Language::Japanese);
    }

    #[tokio::test]
    async fn test_blank_text_skips_network() {
        let api = StubApi::answering("ja");
        let detector = LanguageDetector::new(api.clone());

        assert_eq!(detector.detect("   \n").await, Language::English);
        assert_eq!(api.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_remote_result_is_used() {
        let detector = LanguageDetector::new(StubApi::answering("ja"));
        // Remote answer wins even when the script says otherwise
        assert_eq!(detector.detect("konnichiwa").await, Language::Japanese);
    }

    #[tokio::test]
    async fn test_unsupported_remote_language_defaults() {
        let api = StubApi::answering("zh");
        let detector = LanguageDetector::new(api.clone());

        assert_eq!(detector.detect("你好").await, Language::English);
        assert_eq!(api.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_remote_failure_falls_back() {
        let api = StubApi::failing();
        let detector = LanguageDetector::new(api.clone());

        assert_eq!(detector.detect("こんにちは").await, Language::Japanese);
        assert_eq!(detector.detect("hello").await, Language::English);
        assert_eq!(api.calls.load(Ordering::SeqCst), 2);
    }
}
