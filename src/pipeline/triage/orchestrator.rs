use std::sync::Arc;

use tracing::Instrument;

use crate::pipeline::gemini::GenerativeClient;
use crate::pipeline::language::Fallback;
use crate::pipeline::reply::extract_reply;

use super::prompt::build_triage_request;
use super::types::{RiskLevel, TriageReply, TriageRequest};

/// Conversational symptom assistant.
///
/// Always produces a reply: model failures of any kind degrade to a
/// localized fallback message, and the details are logged server-side.
pub struct SymptomAssistant {
    client: Arc<dyn GenerativeClient>,
}

impl SymptomAssistant {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self { client }
    }

    pub async fn assess(&self, request: &TriageRequest) -> TriageReply {
        let span = tracing::info_span!(
            "symptom_assess",
            language = request.language.code,
            history_len = request.history.len(),
        );
        self.assess_inner(request).instrument(span).await
    }

    async fn assess_inner(&self, request: &TriageRequest) -> TriageReply {
        let start = std::time::Instant::now();

        let model_request = build_triage_request(request);
        let response = match self.client.generate(&model_request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, "Symptom assistant model call failed");
                return TriageReply::fallback(request.language, Fallback::TechnicalProblem);
            }
        };

        let raw = response.text();
        if raw.is_empty() {
            tracing::warn!(
                block_reason = response.block_reason().unwrap_or("unknown"),
                "Model returned an empty or blocked response"
            );
            return TriageReply::fallback(request.language, Fallback::NoAnswer);
        }
        tracing::debug!(raw = %raw, "Model raw response");

        let reply: TriageReply = match extract_reply(&raw, request.language) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(error = %e, raw = %raw, "Could not parse model response as JSON");
                return TriageReply::fallback(request.language, Fallback::TriageResponse);
            }
        };

        if reply.risk_level == Some(RiskLevel::Emergency) {
            tracing::warn!("Symptom assistant flagged an emergency");
        }
        tracing::info!(
            elapsed_ms = %start.elapsed().as_millis(),
            highlight_area = ?reply.highlight_area,
            suggestions = reply.suggestions.len(),
            "Symptom assessment complete"
        );

        reply
    }
}
