//! Document analysis endpoints.
//!
//! - `POST /api/analysis/analyze`: multipart upload, OCR + simplification, persisted
//! - `GET /api/analysis`: the caller's analyses, newest first
//! - `GET /api/analysis/:id`: one analysis owned by the caller

use axum::extract::multipart::MultipartError;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, CallerContext};
use crate::db::{get_analysis, insert_analysis, list_analyses_for_user};
use crate::models::Analysis;
use crate::pipeline::analysis::DocumentImage;
use crate::pipeline::language::Language;

/// Multipart framing allowance on top of the document size limit.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

#[derive(Serialize)]
pub struct AnalysisListResponse {
    pub analyses: Vec<Analysis>,
}

struct UploadForm {
    document: Option<Vec<u8>>,
    language: Option<String>,
}

async fn read_form(mut multipart: Multipart, limit_bytes: usize) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm {
        document: None,
        language: None,
    };

    let upload_error = |e: MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge { limit_bytes }
        } else {
            ApiError::BadRequest(e.body_text())
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "document" => {
                let bytes = field.bytes().await.map_err(upload_error)?;
                form.document = Some(bytes.to_vec());
            }
            "language" => {
                form.language = Some(field.text().await.map_err(upload_error)?);
            }
            _ => {}
        }
    }

    Ok(form)
}

/// `POST /api/analysis/analyze`: analyze and store one uploaded document.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<Analysis>), ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let limit_bytes = ctx.config.server.max_upload_bytes;
    let form = read_form(multipart, limit_bytes).await?;

    let bytes = form
        .document
        .filter(|b| !b.is_empty())
        .ok_or_else(|| ApiError::BadRequest("No document uploaded.".into()))?;
    if bytes.len() > limit_bytes {
        return Err(ApiError::PayloadTooLarge { limit_bytes });
    }

    let image = DocumentImage::from_bytes(bytes).ok_or(ApiError::UnsupportedMediaType)?;
    let language = form
        .language
        .as_deref()
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(Language::from_code)
        .unwrap_or_default();

    let result = ctx.analyzer.analyze(&image, language).await?;

    let analysis = Analysis {
        id: Uuid::new_v4(),
        user_id: caller.user_id,
        original_text: result.original_text,
        simplified_text: result.simplified_text,
        document_type: result.document_type,
        language: language.code.to_string(),
        model: ctx.model_name().to_string(),
        created_at: chrono::Utc::now().naive_utc(),
    };

    let conn = ctx.open_db()?;
    insert_analysis(&conn, &analysis)?;

    tracing::info!(
        analysis_id = %analysis.id,
        document_type = analysis.document_type.as_str(),
        "Analysis stored"
    );

    Ok((StatusCode::CREATED, Json(analysis)))
}

/// `GET /api/analysis`: the caller's analyses, newest first.
pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
) -> Result<Json<AnalysisListResponse>, ApiError> {
    let conn = ctx.open_db()?;
    let analyses = list_analyses_for_user(&conn, &caller.user_id)?;
    Ok(Json(AnalysisListResponse { analyses }))
}

/// `GET /api/analysis/:id`: records owned by other callers read as missing.
pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> Result<Json<Analysis>, ApiError> {
    let id = Uuid::parse_str(&id)
        .map_err(|_| ApiError::BadRequest("Invalid analysis ID".into()))?;

    let conn = ctx.open_db()?;
    get_analysis(&conn, &id)?
        .filter(|a| a.user_id == caller.user_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Analysis not found".into()))
}
