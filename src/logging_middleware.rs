// src/logging_middleware.rs
//! Middleware for logging request and response bodies in debug mode

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, Level};

use crate::common::safe_token_log;

/// Bodies larger than this are passed through without being buffered
const MAX_LOGGED_BODY: usize = 64 * 1024;

/// JSON keys whose values never reach the log
const SECRET_KEYS: &[&str] = &["token", "id_token", "access_token"];

/// Logs request and response bodies at debug level.
/// Does nothing unless debug logging is enabled.
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    if !tracing::enabled!(Level::DEBUG) {
        return Ok(next.run(request).await);
    }

    let started = Instant::now();
    let (parts, body) = request.into_parts();

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let authorization = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(safe_token_log)
        .unwrap_or_else(|| "-".to_string());

    debug!(
        method = %parts.method,
        uri = %parts.uri,
        authorization = %authorization,
        request_body = %render_body(&bytes),
        "📥 Request"
    );

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    debug!(
        status = %parts.status,
        latency_ms = started.elapsed().as_millis() as u64,
        response_body = %render_body(&bytes),
        "📤 Response"
    );

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

fn render_body(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "-".to_string();
    }
    if bytes.len() > MAX_LOGGED_BODY {
        return format!("<{} bytes>", bytes.len());
    }

    let Ok(text) = std::str::from_utf8(bytes) else {
        return format!("<{} bytes, not utf-8>", bytes.len());
    };

    match serde_json::from_str::<Value>(text) {
        Ok(mut json) => {
            redact(&mut json);
            json.to_string()
        }
        Err(_) => text.to_string(),
    }
}

fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map.iter_mut() {
                if SECRET_KEYS.contains(&key.as_str()) {
                    if let Value::String(s) = inner {
                        *s = safe_token_log(s);
                    }
                } else {
                    redact(inner);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}
