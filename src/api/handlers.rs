use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use chrono::{Local, Utc};
use serde::Serialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::AppState;

pub const WELCOME_MESSAGE: &str = "Welcome to the Bottle REST API";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Response DTOs ────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
}

// ── Handlers ─────────────────────────────────────────────────

/// GET / — welcome message
pub async fn index() -> Json<Value> {
    Json(json!({ "message": WELCOME_MESSAGE }))
}

/// GET /health — liveness check, never gated
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

/// GET /echo — query string echoed back as a flat JSON object.
/// Repeated keys keep the last value.
pub async fn echo(
    query: Result<Query<BTreeMap<String, String>>, QueryRejection>,
) -> Result<Json<BTreeMap<String, String>>, AppError> {
    let Query(params) = query.map_err(|e| AppError::bad_request(e.body_text()))?;
    Ok(Json(params))
}

/// POST /data — the posted JSON object with a `current_time` field added
pub async fn add_timestamp(body: Bytes) -> Result<Json<Value>, AppError> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("data: unparseable body: {}", e);
        AppError::bad_request("Invalid request data")
    })?;

    // Any object is accepted, including `{}`; only non-objects are refused.
    let Value::Object(mut data) = value else {
        return Err(AppError::bad_request("Invalid JSON data"));
    };

    data.insert(
        "current_time".to_string(),
        Value::String(Local::now().format(TIMESTAMP_FORMAT).to_string()),
    );
    Ok(Json(Value::Object(data)))
}

/// POST /login — exchange the configured username/password for a bearer token
pub async fn login(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<LoginResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::bad_request("Missing request body"));
    }

    let data: Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!("login: unparseable body: {}", e);
        AppError::bad_request("Invalid JSON data")
    })?;

    let (Some(username), Some(password)) = (present(&data, "username"), present(&data, "password"))
    else {
        return Err(AppError::bad_request("Username and password are required"));
    };

    let username = match (username.as_str(), password.as_str()) {
        (Some(u), Some(p)) if state.credentials.matches(u, p) => u,
        _ => {
            tracing::warn!("login: invalid credentials");
            return Err(AppError::unauthorized("Invalid credentials"));
        }
    };

    let token = state
        .tokens
        .issue(username, Utc::now())
        .map_err(|e| AppError::Unexpected(e.into()))?;

    tracing::info!(username = %username, "login: token issued");
    Ok(Json(LoginResponse {
        message: "Login successful",
        token,
    }))
}

/// Look up `key` in a JSON object; `null` and `false` count as absent.
fn present<'a>(data: &'a Value, key: &str) -> Option<&'a Value> {
    data.get(key)
        .filter(|v| !matches!(v, Value::Null | Value::Bool(false)))
}
