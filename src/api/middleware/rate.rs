//! Per-caller rate limiting middleware.
//!
//! Sliding-window limits per minute and per hour, sized from
//! `ServerConfig`. Runs before identity validation, so requests
//! without a caller header share one anonymous bucket.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

use super::USER_ID_HEADER;

/// Extract a rate-limit key from the request.
fn rate_key(req: &Request<axum::body::Body>) -> String {
    req.headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|user| {
            let prefix: String = user.chars().take(128).collect();
            format!("user:{prefix}")
        })
        .unwrap_or_else(|| "anonymous".to_string())
}

/// Per-caller rate limiting. Returns 429 if exceeded.
/// Accesses `ApiContext` from request extensions.
pub async fn limit(req: Request<axum::body::Body>, next: Next) -> Response {
    match limit_inner(req, next).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn limit_inner(req: Request<axum::body::Body>, next: Next) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let key = rate_key(&req);

    // MutexGuard is !Send, must drop before .await via block scope
    {
        let mut limiter = ctx
            .rate_limiter
            .lock()
            .map_err(|_| ApiError::Internal("rate limiter lock".into()))?;

        limiter.check(&key).map_err(|retry_after| {
            tracing::warn!(key = %key, retry_after, "Rate limit exceeded");
            ApiError::RateLimited { retry_after }
        })?;
    }

    Ok(next.run(req).await)
}
