use axum::{
    extract::rejection::JsonRejection,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::{ClientLogEntry, LogLevel};
use crate::AppState;

const MAX_MESSAGE_LEN: usize = 2000;

pub fn router() -> Router<AppState> {
    Router::new().route("/logs", post(ingest_log))
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn client_ip(headers: &HeaderMap) -> &str {
    header(headers, "x-forwarded-for")
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .or_else(|| header(headers, "x-real-ip"))
        .unwrap_or("unknown")
}

async fn ingest_log(
    headers: HeaderMap,
    payload: Result<Json<ClientLogEntry>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(entry) = payload?;

    if entry.message.trim().is_empty() {
        return Err(AppError::BadRequest("Log message is required".to_string()));
    }

    let message: String = entry.message.chars().take(MAX_MESSAGE_LEN).collect();
    let ip = client_ip(&headers);
    let user_agent = header(&headers, "user-agent")
        .or(entry.user_agent.as_deref())
        .unwrap_or("unknown");
    let url = entry.url.as_deref().unwrap_or("");
    let context = entry.context.as_ref().map(Value::to_string).unwrap_or_default();

    match entry.level {
        LogLevel::Error => {
            tracing::error!(source = "client", ip, user_agent, url, context = %context, "client: {message}")
        }
        LogLevel::Warn => {
            tracing::warn!(source = "client", ip, user_agent, url, context = %context, "client: {message}")
        }
        LogLevel::Info => {
            tracing::info!(source = "client", ip, user_agent, url, context = %context, "client: {message}")
        }
        LogLevel::Debug => {
            tracing::debug!(source = "client", ip, user_agent, url, context = %context, "client: {message}")
        }
    }

    Ok(Json(json!({ "success": true })))
}
