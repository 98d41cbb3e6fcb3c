use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::schema::ReplySchema;
use super::ReplyError;
use crate::pipeline::language::Language;

/// Extract and normalize a model reply into the caller's schema.
///
/// Never panics on malformed input. Returns `MalformedResponse` only when no
/// JSON object can be located in `raw`.
pub fn extract_reply<T: ReplySchema>(raw: &str, language: Language) -> Result<T, ReplyError> {
    let object = locate_json_object(raw)?;
    Ok(T::from_object(&object, language))
}

/// Remove markdown code-fence markers (```` ``` ```` and ```` ```json ````) anywhere in the text.
pub fn strip_code_fences(text: &str) -> String {
    static FENCE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)```(?:json)?").expect("valid regex"));
    FENCE_RE.replace_all(text, "").trim().to_string()
}

/// Find the JSON object embedded in a model reply.
///
/// 1. Strip code fences.
/// 2. Parse the whole cleaned string.
/// 3. Otherwise parse the span from the first `{` to the last `}`.
pub fn locate_json_object(raw: &str) -> Result<Map<String, Value>, ReplyError> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(ReplyError::MalformedResponse("Empty response".into()));
    }

    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(&cleaned) {
        return Ok(object);
    }

    let start = cleaned
        .find('{')
        .ok_or_else(|| ReplyError::MalformedResponse("No JSON object found".into()))?;
    let end = cleaned
        .rfind('}')
        .filter(|end| *end > start)
        .ok_or_else(|| ReplyError::MalformedResponse("Unclosed JSON object".into()))?;

    match serde_json::from_str::<Value>(&cleaned[start..=end]) {
        Ok(Value::Object(object)) => Ok(object),
        Ok(_) => Err(ReplyError::MalformedResponse("JSON is not an object".into())),
        Err(e) => Err(ReplyError::MalformedResponse(format!("Invalid JSON: {e}"))),
    }
}
