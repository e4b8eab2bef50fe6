//! HTTP routes and handlers

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Instant;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{debug, info};

use crate::state::AppState;
use crate::validation::{validate_session_id, ValidationError};

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/api/chat", post(chat))
        .route("/api/stats", get(stats))
        .route(
            "/api/sessions/:id",
            get(session_summary).delete(clear_session),
        )
        .fallback(fallback)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics_handle {
        Some(handle) => handle.render().into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics exporter not installed",
        )
            .into_response(),
    }
}

/// Chat payload; fields are loosely typed and coerced to text
#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    session_id: Option<Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatResponse {
    response: String,
    session_id: String,
    branch: String,
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, AppError> {
    let Json(req) = payload?;

    let message = coerce_text("message", req.message)?;
    let session_id = coerce_text("session_id", req.session_id)?.trim().to_string();
    let session_id = if session_id.is_empty() {
        state.config.default_session_id.clone()
    } else {
        session_id
    };
    validate_session_id(&session_id)?;

    let start = Instant::now();
    let reply = state.classifier.respond(&message, &session_id);
    let latency_us = start.elapsed().as_micros() as u64;

    state.metrics.record_message(reply.branch.as_str(), latency_us);
    debug!(
        session = %session_id,
        branch = reply.branch.as_str(),
        latency_us,
        "Message classified"
    );

    state.persist(&session_id, &message, &reply).await;

    Ok(Json(ChatResponse {
        response: reply.text,
        session_id,
        branch: reply.branch.as_str().to_string(),
    }))
}

/// Null or missing becomes empty, scalars their string form
fn coerce_text(field: &str, value: Option<Value>) -> Result<String, AppError> {
    match value {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(Value::Bool(flag)) => Ok(flag.to_string()),
        Some(_) => Err(AppError::InvalidRequest(format!(
            "'{}' must be a string",
            field
        ))),
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SummaryResponse {
    interactions: usize,
    symptoms: Vec<String>,
    last_seen: String,
}

async fn session_summary(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    validate_session_id(&id)?;

    let summary = state.classifier.summary(&id)?;
    Ok(Json(SummaryResponse {
        interactions: summary.interaction_count,
        last_seen: summary.last_seen_display(),
        symptoms: summary.symptom_phrases,
    }))
}

async fn clear_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    validate_session_id(&id)?;

    let cleared = state.classifier.clear_session(&id);
    if cleared {
        info!(session = %id, "Session cleared");
        state.metrics.record_session_cleared();
    }

    Ok(Json(json!({ "cleared": cleared })))
}

async fn stats(State(state): State<AppState>) -> Json<serde_json::Value> {
    let snapshot = state.metrics.snapshot();

    Json(json!({
        "active_sessions": state.classifier.store().len(),
        "avg_latency_us": snapshot.avg_latency_us(),
        "emergency_rate": snapshot.emergency_rate(),
        "metrics": snapshot,
    }))
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Application error type
#[derive(Debug)]
enum AppError {
    InvalidRequest(String),
    NotFound(String),
    InternalError(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<triage_core::Error> for AppError {
    fn from(err: triage_core::Error) -> Self {
        if err.is_not_found() {
            AppError::NotFound("No session found.".to_string())
        } else {
            AppError::InternalError(err.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use tower::ServiceExt;
    use triage_telemetry::{TranscriptConfig, TranscriptQuery, TranscriptReader};

    fn test_state() -> AppState {
        let config = ServerConfig {
            transcript: None,
            ..ServerConfig::default()
        };
        AppState::new(config, None).unwrap()
    }

    async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    async fn chat_json(app: Router, body: &str) -> serde_json::Value {
        let (status, body) = send(app, Method::POST, "/api/chat", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        serde_json::from_str(&body).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(test_state());
        let (status, body) = send(app, Method::GET, "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_chat_greeting_uses_default_session() {
        let app = create_router(test_state());
        let reply = chat_json(app, r#"{"message": "Hello there"}"#).await;

        assert_eq!(reply["branch"], "greeting");
        assert_eq!(reply["session_id"], "default");
        assert!(reply["response"]
            .as_str()
            .unwrap()
            .starts_with("Hello! I'm your AI Health Assistant."));
    }

    #[tokio::test]
    async fn test_chat_emergency() {
        let app = create_router(test_state());
        let reply = chat_json(
            app,
            r#"{"message": "I have CHEST PAIN right now", "session_id": "p1"}"#,
        )
        .await;

        assert_eq!(reply["branch"], "emergency");
        assert!(reply["response"].as_str().unwrap().contains("chest pain"));
    }

    #[tokio::test]
    async fn test_session_summary_after_chat() {
        let state = test_state();
        let app = create_router(state.clone());

        chat_json(
            app.clone(),
            r#"{"message": "mild headache for a week", "session_id": "p2"}"#,
        )
        .await;
        chat_json(app.clone(), r#"{"message": "what are your hours", "session_id": "p2"}"#).await;

        let (status, body) = send(app, Method::GET, "/api/sessions/p2", None).await;
        assert_eq!(status, StatusCode::OK);

        let summary: SummaryResponse = serde_json::from_str(&body).unwrap();
        assert_eq!(summary.interactions, 2);
        assert_eq!(summary.symptoms, vec!["headache".to_string()]);
        assert_eq!(summary.last_seen.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let app = create_router(test_state());
        let (status, body) = send(app, Method::GET, "/api/sessions/nobody", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "No session found.");
    }

    #[tokio::test]
    async fn test_clear_session() {
        let state = test_state();
        let app = create_router(state.clone());

        chat_json(app.clone(), r#"{"message": "hi", "session_id": "p3"}"#).await;

        let (status, body) = send(app.clone(), Method::DELETE, "/api/sessions/p3", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, r#"{"cleared":true}"#);

        let (_, body) = send(app, Method::DELETE, "/api/sessions/p3", None).await;
        assert_eq!(body, r#"{"cleared":false}"#);
        assert_eq!(state.metrics.snapshot().sessions_cleared, 1);
    }

    #[tokio::test]
    async fn test_non_string_message_is_coerced() {
        let state = test_state();
        let app = create_router(state.clone());

        let reply = chat_json(app.clone(), r#"{"message": null, "session_id": "c1"}"#).await;
        assert_eq!(reply["branch"], "default");

        let reply = chat_json(app.clone(), r#"{"message": 42, "session_id": "c1"}"#).await;
        assert_eq!(reply["branch"], "default");

        let reply = chat_json(app, r#"{"message": "hello", "session_id": 7}"#).await;
        assert_eq!(reply["branch"], "greeting");
        assert_eq!(reply["session_id"], "7");

        let summary = state.classifier.summary("c1").unwrap();
        assert_eq!(summary.interaction_count, 2);
    }

    #[tokio::test]
    async fn test_malformed_payloads_get_json_errors() {
        let app = create_router(test_state());

        let (status, body) = send(
            app.clone(),
            Method::POST,
            "/api/chat",
            Some(r#"{"message": ["not", "text"]}"#),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["error"], "'message' must be a string");

        let (status, body) = send(app, Method::POST, "/api/chat", Some("{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_invalid_session_id_rejected() {
        let app = create_router(test_state());
        let (status, body) = send(
            app,
            Method::POST,
            "/api/chat",
            Some(r#"{"message": "hi", "session_id": "bad id"}"#),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("invalid character"));
    }

    #[tokio::test]
    async fn test_stats_count_branches() {
        let state = test_state();
        let app = create_router(state.clone());

        chat_json(app.clone(), r#"{"message": "hello", "session_id": "s1"}"#).await;
        chat_json(
            app.clone(),
            r#"{"message": "my dad may be having a stroke", "session_id": "s2"}"#,
        )
        .await;

        let (status, body) = send(app, Method::GET, "/api/stats", None).await;
        assert_eq!(status, StatusCode::OK);

        let stats: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(stats["active_sessions"], 2);
        assert_eq!(stats["metrics"]["total_messages"], 2);
        assert_eq!(stats["metrics"]["emergencies"], 1);
        assert_eq!(stats["emergency_rate"], 0.5);
    }

    #[tokio::test]
    async fn test_metrics_without_recorder() {
        let app = create_router(test_state());
        let (status, _) = send(app, Method::GET, "/metrics", None).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let app = create_router(test_state());
        let (status, _) = send(app, Method::GET, "/v1/unknown", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_transcripts_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let transcript = TranscriptConfig {
            dir: dir.path().to_path_buf(),
            flush_interval: 1,
            hash_session_ids: false,
            ..TranscriptConfig::default()
        };
        let config = ServerConfig {
            transcript: Some(transcript.clone()),
            ..ServerConfig::default()
        };
        let state = AppState::new(config, None).unwrap();
        let app = create_router(state.clone());

        chat_json(app.clone(), r#"{"message": "hello", "session_id": "t1"}"#).await;
        chat_json(app, r#"{"message": "do you take insurance", "session_id": "t1"}"#).await;
        state.flush_transcripts();

        let records = TranscriptReader::new(transcript)
            .query(&TranscriptQuery::new().session("t1"))
            .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "hello");
        assert_eq!(records[0].branch, "greeting");
        assert_eq!(records[1].branch, "insurance");
    }
}
