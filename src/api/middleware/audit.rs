//! Audit logging middleware.
//!
//! Logs every API request with caller, method, path, status and latency.
//! Runs innermost (after identity has injected `CallerContext`).

use std::time::Instant;

use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::types::CallerContext;

pub async fn log_access(req: Request<axum::body::Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let user_id = req
        .extensions()
        .get::<CallerContext>()
        .map(|c| c.user_id.clone())
        .unwrap_or_default();

    let start = Instant::now();
    let response = next.run(req).await;

    let status = response.status().as_u16();
    let latency_ms = start.elapsed().as_millis() as u64;
    if response.status().is_server_error() {
        tracing::warn!(%method, %path, status, user_id = %user_id, latency_ms, "API access");
    } else {
        tracing::info!(%method, %path, status, user_id = %user_id, latency_ms, "API access");
    }

    response
}
