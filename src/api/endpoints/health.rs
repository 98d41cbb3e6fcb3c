//! Liveness endpoints.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model: String,
}

/// `GET /`: plain-text banner.
pub async fn root() -> &'static str {
    "Sanjeevani API is running..."
}

/// `GET /api/health`: liveness plus the configured model.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        model: ctx.model_name().to_string(),
    })
}
