//! Remote translation service client

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::core::config::BridgeConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{Detection, TranslationRequest};

/// Remote translation and detection service
#[async_trait]
pub trait TranslationApi: Send + Sync {
    /// Translate `request.text` from `request.source` to `request.target`
    async fn translate(&self, request: &TranslationRequest) -> Result<String>;

    /// Ranked language candidates for `text`, best first
    async fn detect(&self, text: &str) -> Result<Vec<Detection>>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranslateResponse {
    translated_text: String,
}

/// Client for LibreTranslate-compatible HTTP APIs
#[derive(Debug, Clone)]
pub struct LibreTranslateClient {
    client: reqwest::Client,
    config: Arc<BridgeConfig>,
}

impl LibreTranslateClient {
    /// Create a new client
    pub fn new(config: BridgeConfig) -> Result<Self> {
        config.validate().map_err(|e| TranslationError::ConfigError {
            message: e.to_string(),
        })?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .pool_idle_timeout(Some(std::time::Duration::from_secs(30)))
            .build()?;

        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Create from environment
    pub fn from_env() -> Result<Self> {
        let config = BridgeConfig::from_env().map_err(|e| TranslationError::ConfigError {
            message: e.to_string(),
        })?;
        Self::new(config)
    }

    fn with_api_key(&self, mut body: serde_json::Value) -> serde_json::Value {
        if let Some(api_key) = &self.config.api_key {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("api_key".to_string(), serde_json::json!(api_key));
            }
        }
        body
    }

    async fn post(&self, url: &str, body: serde_json::Value) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(&self.with_api_key(body))
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_text = response.text().await.unwrap_or_default();
        Err(TranslationError::ApiError {
            status: status.as_u16(),
            message: error_text,
        })
    }
}

#[async_trait]
impl TranslationApi for LibreTranslateClient {
    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        let body = serde_json::json!({
            "q": request.text,
            "source": request.source.code(),
            "target": request.target.code(),
            "format": "text",
        });

        debug!("Translating {} chars {} -> {}", request.text.chars().count(), request.source, request.target);

        let response = self.post(&self.config.translate_endpoint(), body).await?;
        let parsed: TranslateResponse =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

        Ok(parsed.translated_text)
    }

    async fn detect(&self, text: &str) -> Result<Vec<Detection>> {
        let body = serde_json::json!({ "q": text });

        let response = self.post(&self.config.detect_endpoint(), body).await?;
        let detections: Vec<Detection> =
            response
                .json()
                .await
                .map_err(|e| TranslationError::InvalidResponseError {
                    message: e.to_string(),
                })?;

        if detections.is_empty() {
            return Err(TranslationError::InvalidResponseError {
                message: "Empty detection result".to_string(),
            });
        }

        Ok(detections)
    }
}
