use crate::pipeline::gemini::{Content, GenerateContentRequest, GenerationConfig, Role};
use crate::pipeline::language::Language;

use super::types::{ChatTurn, TriageRequest};

/// Per-turn history text limit, in characters.
pub const MAX_HISTORY_TEXT_CHARS: usize = 1000;
/// Current message limit, in characters.
pub const MAX_MESSAGE_CHARS: usize = 1500;
/// Most recent history turns sent to the model.
pub const MAX_HISTORY_TURNS: usize = 12;

const TRIAGE_SYSTEM_PROMPT: &str = r#"You are "Sanjeevani", an intelligent, conversational AI medical assistant for patients in India.

CRITICAL RULES (FOLLOW STRICTLY):
- You are NOT a doctor. You MUST NOT give a final diagnosis.
- You MUST NOT prescribe any medicines, dosages, or treatments by name.
- You ONLY provide general information and preliminary guidance based on symptoms.
- You MUST always recommend consulting a qualified doctor for any serious or unclear issue.
- If there are emergency or "red flag" symptoms, you MUST clearly tell the user to seek urgent medical care or call local emergency services.

LANGUAGE:
- Your entire response (responseText + suggestions) MUST be in {language}.
- Medical terms can be mentioned in simple language plus their common English names if needed.

OUTPUT FORMAT:
- You MUST return ONLY a single valid JSON object.
- NO markdown, NO backticks.
- JSON MUST contain:
  - "responseText": string
  - "suggestions": string[]
  - "highlightArea": "head" | "chest" | "abdomen" | "arms" | "legs" | "none"
- You MAY also include:
  - "riskLevel": "emergency" | "urgent" | "routine" | "self-care"
  - "recommendationType": "see-doctor-soon" | "emergency-now" | "monitor-at-home" | "general-info""#;

/// System instruction with the response language filled in.
pub fn triage_system_prompt(language: Language) -> String {
    TRIAGE_SYSTEM_PROMPT.replace("{language}", language.name)
}

/// Build the model request for one assistant turn.
pub fn build_triage_request(request: &TriageRequest) -> GenerateContentRequest {
    let mut contents = format_history(&request.history);
    contents.push(Content::with_role(
        Role::User,
        truncate_chars(&request.message, MAX_MESSAGE_CHARS),
    ));

    GenerateContentRequest {
        system_instruction: Some(Content::instruction(triage_system_prompt(request.language))),
        contents,
        generation_config: Some(GenerationConfig {
            temperature: 0.6,
            top_k: Some(32),
            top_p: Some(0.8),
            max_output_tokens: Some(512),
        }),
    }
}

/// Convert client history to model turns.
///
/// The model requires the conversation to open with a user turn, so leading
/// model turns are dropped both before and after windowing.
pub fn format_history(history: &[ChatTurn]) -> Vec<Content> {
    let turns: Vec<Content> = history
        .iter()
        .map(|turn| {
            let role = if turn.is_user() { Role::User } else { Role::Model };
            Content::with_role(role, truncate_chars(&turn.text(), MAX_HISTORY_TEXT_CHARS))
        })
        .collect();

    let turns = drop_leading_model_turns(turns);
    let skip = turns.len().saturating_sub(MAX_HISTORY_TURNS);
    drop_leading_model_turns(turns.into_iter().skip(skip).collect())
}

fn drop_leading_model_turns(turns: Vec<Content>) -> Vec<Content> {
    turns
        .into_iter()
        .skip_while(|c| c.role.as_deref() == Some(Role::Model.as_str()))
        .collect()
}

/// Truncate to at most `max` characters (not bytes).
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
