//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::TranslationError;

/// Supported language pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    /// Japanese (`ja`)
    #[serde(rename = "ja")]
    Japanese,
    /// English (`en`), also the fallback when detection is inconclusive
    #[default]
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// ISO 639-1 code used on the wire
    pub fn code(&self) -> &'static str {
        match self {
            Language::Japanese => "ja",
            Language::English => "en",
        }
    }

    /// The opposite language of the pair
    pub fn other(&self) -> Language {
        match self {
            Language::Japanese => Language::English,
            Language::English => Language::Japanese,
        }
    }

    /// Map an arbitrary detected locale onto the pair, if it belongs to it
    pub fn from_code(code: &str) -> Option<Language> {
        match code.trim().to_ascii_lowercase().as_str() {
            "ja" | "japanese" => Some(Language::Japanese),
            "en" | "english" => Some(Language::English),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::from_code(s).ok_or_else(|| TranslationError::UnsupportedLanguage {
            code: s.to_string(),
        })
    }
}

/// A single past translation kept in history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    pub id: String,
    pub original_text: String,
    pub translated_text: String,
    pub from_language: Language,
    pub to_language: Language,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

impl TranslationRecord {
    /// Create a record with a fresh id and the current wall-clock time
    pub fn new(
        original_text: impl Into<String>,
        translated_text: impl Into<String>,
        from_language: Language,
        to_language: Language,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            original_text: original_text.into(),
            translated_text: translated_text.into(),
            from_language,
            to_language,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Whether both records carry the same translation content
    pub fn same_content(&self, other: &TranslationRecord) -> bool {
        self.original_text == other.original_text
            && self.translated_text == other.translated_text
            && self.from_language == other.from_language
            && self.to_language == other.to_language
    }

    /// Creation time as a local date-time, for display
    pub fn created_at(&self) -> Option<chrono::DateTime<chrono::Local>> {
        chrono::DateTime::from_timestamp_millis(self.timestamp)
            .map(|utc| utc.with_timezone(&chrono::Local))
    }
}

/// Translation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationRequest {
    pub text: String,
    pub source: Language,
    pub target: Language,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source: Language, target: Language) -> Self {
        Self {
            text: text.into(),
            source,
            target,
        }
    }
}

/// One candidate returned by the remote detection endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub language: String,
    #[serde(default)]
    pub confidence: f64,
}

/// Outcome of an auto-translate run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutoTranslation {
    pub detected_from: Language,
    pub detected_to: Language,
    pub result: Option<String>,
}

/// Transient orchestrator state exposed to presentation surfaces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStatus {
    pub is_translating: bool,
    pub last_error: Option<String>,
}
