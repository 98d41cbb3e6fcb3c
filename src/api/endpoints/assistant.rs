//! `POST /api/assistant/symptoms`: conversational symptom triage.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::pipeline::language::Language;
use crate::pipeline::triage::{ChatTurn, TriageReply, TriageRequest};

#[derive(Deserialize)]
pub struct SymptomRequest {
    pub message: Option<String>,
    pub history: Option<Vec<ChatTurn>>,
    pub language: Option<String>,
}

impl SymptomRequest {
    fn validate(self) -> Result<TriageRequest, ApiError> {
        let (Some(message), Some(history), Some(language)) =
            (self.message, self.history, self.language)
        else {
            return Err(ApiError::BadRequest(
                "Message, history, and language are required.".into(),
            ));
        };
        if message.trim().is_empty() {
            return Err(ApiError::BadRequest("Message cannot be empty".into()));
        }
        if language.trim().is_empty() {
            return Err(ApiError::BadRequest("Language cannot be empty".into()));
        }
        if !Language::is_supported(language.trim()) {
            tracing::debug!(language = %language, "Unsupported language, answering in English");
        }

        Ok(TriageRequest {
            message,
            history,
            language: Language::from_code(language.trim()),
        })
    }
}

/// Model failures never surface as HTTP errors here; the assistant
/// answers with a localized fallback instead.
pub async fn symptoms(
    State(ctx): State<ApiContext>,
    payload: Result<Json<SymptomRequest>, JsonRejection>,
) -> Result<Json<TriageReply>, ApiError> {
    let Json(payload) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let request = payload.validate()?;

    Ok(Json(ctx.assistant.assess(&request).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> Result<TriageRequest, ApiError> {
        serde_json::from_str::<SymptomRequest>(body).unwrap().validate()
    }

    #[test]
    fn complete_request_validates() {
        let request = parse(
            r#"{"message":"I have a headache","history":[{"sender":"user","text":"hi"}],"language":"ta-IN"}"#,
        )
        .unwrap();
        assert_eq!(request.language.code, "ta-IN");
        assert_eq!(request.history.len(), 1);
    }

    #[test]
    fn missing_history_rejected() {
        assert!(matches!(
            parse(r#"{"message":"fever","language":"en-IN"}"#),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn blank_message_rejected() {
        assert!(matches!(
            parse(r#"{"message":"   ","history":[],"language":"en-IN"}"#),
            Err(ApiError::BadRequest(_))
        ));
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let request = parse(r#"{"message":"fever","history":[],"language":"xx-YY"}"#).unwrap();
        assert_eq!(request.language, Language::english());
    }

    #[test]
    fn null_sender_turn_is_accepted() {
        let request = parse(
            r#"{"message":"fever","history":[{"sender":null,"text":"Hello"}],"language":"en-IN"}"#,
        )
        .unwrap();
        assert_eq!(request.history.len(), 1);
        assert!(!request.history[0].is_user());
    }

    #[test]
    fn non_object_turn_is_accepted_as_model_turn() {
        let request = parse(
            r#"{"message":"fever","history":["Hello",{"sender":"user","text":"hi"}],"language":"en-IN"}"#,
        )
        .unwrap();
        assert_eq!(request.history.len(), 2);
        assert!(!request.history[0].is_user());
        assert_eq!(request.history[0].text(), "");
        assert!(request.history[1].is_user());
    }
}
