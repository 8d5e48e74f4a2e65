//! HTTP entry point
//!
//! `GET /health` is open. `POST /command` and `GET /commands` require the
//! configured API key in `X-API-Key`; with no key configured they always
//! answer 401.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::command::CommandExecutor;
use crate::core::error::{DispatchError, Result};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Shared state for HTTP handlers
pub struct AppState {
    executor: CommandExecutor,
    api_key: Option<SecretString>,
}

impl AppState {
    pub fn new(executor: CommandExecutor, api_key: Option<SecretString>) -> Self {
        Self { executor, api_key }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CommandReply {
    pub reply: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/command", post(command_handler))
        .route("/commands", get(catalog_handler))
        .with_state(state)
}

/// Bind `listen_addr` and serve until ctrl-c
pub async fn serve(listen_addr: &str, state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = listen_addr.parse().map_err(|e| {
        DispatchError::Config(format!("invalid listen address {:?}: {}", listen_addr, e))
    })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "starting HTTP server");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}

/// Constant-time byte comparison
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (&x, &y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

fn authorized(state: &AppState, headers: &HeaderMap) -> bool {
    let Some(expected) = &state.api_key else {
        return false;
    };
    let expected = expected.expose_secret();
    if expected.is_empty() {
        return false;
    }
    let presented = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    constant_time_eq(presented.as_bytes(), expected.as_bytes())
}

/// `text` field of a JSON request body
///
/// A missing or malformed body, or a null `text`, counts as empty. Scalars
/// that are not strings are used in their JSON rendering (`123` -> "123").
fn command_text(body: &[u8]) -> String {
    let Ok(request) = serde_json::from_slice::<Value>(body) else {
        return String::new();
    };
    match request.get("text") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}

async fn health_handler() -> impl IntoResponse {
    Json(json!({ "ok": true }))
}

async fn command_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }

    let text = command_text(&body);
    let reply = state.executor.execute(&text).await;
    Json(CommandReply { reply }).into_response()
}

async fn catalog_handler(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return unauthorized();
    }
    Json(state.executor.registry().catalog()).into_response()
}
