use base64::Engine as _;

use crate::pipeline::gemini::{Content, GenerateContentRequest, GenerationConfig, Part};
use crate::pipeline::language::Language;

use super::types::DocumentImage;

const ANALYSIS_PROMPT: &str = r#"You are an expert medical data analyst. Analyze this image of a medical document (prescription or lab report).

1. OCR: Extract all text.
2. Simplify: Explain it in simple terms for a patient, in {language}.
3. Classify: Decide whether it is a "prescription", a "lab_report", or "other".

Return ONLY a valid JSON object with keys: "originalText", "simplifiedText" and "documentType".
Example: { "originalText": "...", "simplifiedText": "...", "documentType": "prescription" }
Do not add markdown formatting like ```json."#;

pub fn analysis_prompt(language: Language) -> String {
    ANALYSIS_PROMPT.replace("{language}", language.name)
}

/// Build the model request: instruction text followed by the inline document.
pub fn build_analysis_request(image: &DocumentImage, language: Language) -> GenerateContentRequest {
    let encoded = base64::engine::general_purpose::STANDARD.encode(&image.bytes);

    GenerateContentRequest {
        system_instruction: None,
        contents: vec![Content::user(vec![
            Part::text(analysis_prompt(language)),
            Part::inline(image.mime_type, encoded),
        ])],
        generation_config: Some(GenerationConfig {
            temperature: 0.2,
            top_k: None,
            top_p: None,
            max_output_tokens: None,
        }),
    }
}
