//! Caller identity middleware.
//!
//! Sessions and tokens are handled by the application's auth gateway,
//! which forwards the authenticated user id in `X-User-Id`. This layer
//! validates the header and injects `CallerContext` for handlers.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::CallerContext;

use super::USER_ID_HEADER;

/// Longest accepted user id.
pub const MAX_USER_ID_LEN: usize = 128;

/// Parse the caller id from the header value, if acceptable.
pub fn parse_user_id(raw: Option<&str>) -> Option<String> {
    let id = raw?.trim();
    if id.is_empty() || id.chars().count() > MAX_USER_ID_LEN {
        return None;
    }
    if id.chars().any(char::is_control) {
        return None;
    }
    Some(id.to_string())
}

/// Reject requests without a valid caller id with 401.
pub async fn require_caller(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let header = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok());

    let Some(user_id) = parse_user_id(header) else {
        tracing::debug!(path = %req.uri().path(), "Request without valid caller id");
        return ApiError::Unauthorized.into_response();
    };

    req.extensions_mut().insert(CallerContext { user_id });
    next.run(req).await
}
