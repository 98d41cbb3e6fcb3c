use serde_json::{Map, Value};

use crate::pipeline::language::{Fallback, Language};

/// A feature-specific reply shape that can be rebuilt from any JSON object.
///
/// Implementations must be total: every field gets a value, either taken
/// from the object or substituted. Unknown keys are ignored.
pub trait ReplySchema: Sized {
    fn from_object(object: &Map<String, Value>, language: Language) -> Self;
}

/// Required string field. Missing, non-string, or blank values get the
/// localized fallback.
pub fn string_or_fallback(
    object: &Map<String, Value>,
    key: &str,
    language: Language,
    fallback: Fallback,
) -> String {
    optional_string(object, key).unwrap_or_else(|| language.fallback(fallback).to_string())
}

/// Optional string field, trimmed. Blank strings count as absent.
pub fn optional_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// String list field. A non-array becomes empty; non-string and blank items
/// are dropped.
pub fn string_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    match object.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => vec![],
    }
}

/// Enum field parsed with `parse`; `None` when missing or not accepted.
pub fn enum_field<E>(
    object: &Map<String, Value>,
    key: &str,
    parse: impl Fn(&str) -> Option<E>,
) -> Option<E> {
    object
        .get(key)
        .and_then(Value::as_str)
        .and_then(|s| parse(s.trim()))
}
