use std::sync::Arc;

use thiserror::Error;
use tracing::Instrument;

use crate::pipeline::gemini::{GeminiError, GenerativeClient};
use crate::pipeline::language::Language;
use crate::pipeline::reply::{extract_reply, ReplyError};

use super::prompt::build_analysis_request;
use super::types::{DocumentAnalysis, DocumentImage};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Model call failed: {0}")]
    Upstream(#[from] GeminiError),

    #[error("Model returned an empty response (reason: {0})")]
    EmptyResponse(String),

    #[error(transparent)]
    Reply(#[from] ReplyError),
}

/// OCR and plain-language simplification of a medical document image.
pub struct DocumentAnalyzer {
    client: Arc<dyn GenerativeClient>,
}

impl DocumentAnalyzer {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self { client }
    }

    /// Name of the model producing analyses, stored with each record.
    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub async fn analyze(
        &self,
        image: &DocumentImage,
        language: Language,
    ) -> Result<DocumentAnalysis, AnalysisError> {
        let span = tracing::info_span!(
            "document_analyze",
            mime_type = image.mime_type,
            image_size = image.bytes.len(),
            language = language.code,
        );
        self.analyze_inner(image, language).instrument(span).await
    }

    async fn analyze_inner(
        &self,
        image: &DocumentImage,
        language: Language,
    ) -> Result<DocumentAnalysis, AnalysisError> {
        let start = std::time::Instant::now();

        let request = build_analysis_request(image, language);
        let response = self.client.generate(&request).await?;

        let raw = response.text();
        if raw.is_empty() {
            let reason = response.block_reason().unwrap_or("unknown").to_string();
            return Err(AnalysisError::EmptyResponse(reason));
        }

        let analysis: DocumentAnalysis = extract_reply(&raw, language).map_err(|e| {
            tracing::warn!(error = %e, raw = %raw, "Analysis response had no JSON object");
            e
        })?;

        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            original_len = analysis.original_text.len(),
            document_type = analysis.document_type.as_str(),
            "Document analysis complete"
        );

        Ok(analysis)
    }
}
