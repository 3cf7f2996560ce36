//! HTTP API server implementation

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::models::{Language, TranslationRecord};
use crate::core::orchestrator::{TranslationOrchestrator, TRANSLATION_FAILED_MESSAGE};

/// Application state
#[derive(Clone)]
pub struct AppState {
    orchestrator: TranslationOrchestrator,
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: String,
    service: String,
    version: String,
}

/// Translation request
#[derive(Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub from: Option<Language>,
    pub to: Option<Language>,
}

/// Translation response
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub detected_from: Language,
    pub detected_to: Language,
    pub translated_text: String,
}

#[derive(Deserialize)]
pub struct DetectRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct DetectResponse {
    pub language: Language,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: ErrorDetail {
                message: message.into(),
                code: Some(code.to_string()),
            },
        }),
    )
}

/// Health check handler
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Translation handler; languages left out are detected or toggled
async fn translate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    if payload.text.trim().is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "text cannot be empty",
            "invalid_request",
        ));
    }

    let outcome = state
        .orchestrator
        .translate_with_hints(&payload.text, payload.from, payload.to)
        .await;

    match outcome.result {
        Some(translated_text) => Ok(Json(TranslateResponse {
            detected_from: outcome.detected_from,
            detected_to: outcome.detected_to,
            translated_text,
        })),
        None => {
            let message = state
                .orchestrator
                .last_error()
                .unwrap_or_else(|| TRANSLATION_FAILED_MESSAGE.to_string());
            warn!("Translation request failed: {}", message);
            Err(api_error(StatusCode::BAD_GATEWAY, message, "translation_error"))
        }
    }
}

async fn detect(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DetectRequest>,
) -> Json<DetectResponse> {
    let language = state.orchestrator.detector().detect(&payload.text).await;
    Json(DetectResponse { language })
}

async fn list_history(State(state): State<Arc<AppState>>) -> Json<Vec<TranslationRecord>> {
    Json(state.orchestrator.history().get_all())
}

async fn clear_history(State(state): State<Arc<AppState>>) -> StatusCode {
    state.orchestrator.history().clear();
    StatusCode::NO_CONTENT
}

async fn remove_history_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> StatusCode {
    state.orchestrator.history().remove(&id);
    StatusCode::NO_CONTENT
}

/// Build the API router around `orchestrator`
pub fn router(orchestrator: TranslationOrchestrator) -> Router {
    let state = Arc::new(AppState { orchestrator });

    Router::new()
        .route("/", get(health_check))
        .route("/translate", post(translate))
        .route("/detect", post(detect))
        .route("/history", get(list_history).delete(clear_history))
        .route("/history/:id", delete(remove_history_item))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16, orchestrator: TranslationOrchestrator) -> anyhow::Result<()> {
    let app = router(orchestrator);

    // Bind address
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
