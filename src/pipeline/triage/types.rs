use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::pipeline::language::{Fallback, Language};
use crate::pipeline::reply::{enum_field, string_list, string_or_fallback, ReplySchema};

/// Body region the client highlights on its anatomy diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyArea {
    Head,
    Chest,
    Abdomen,
    Arms,
    Legs,
    #[default]
    None,
}

impl BodyArea {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "head" => Some(Self::Head),
            "chest" => Some(Self::Chest),
            "abdomen" => Some(Self::Abdomen),
            "arms" => Some(Self::Arms),
            "legs" => Some(Self::Legs),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskLevel {
    Emergency,
    Urgent,
    Routine,
    SelfCare,
}

impl RiskLevel {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "emergency" => Some(Self::Emergency),
            "urgent" => Some(Self::Urgent),
            "routine" => Some(Self::Routine),
            "self-care" => Some(Self::SelfCare),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationType {
    SeeDoctorSoon,
    EmergencyNow,
    MonitorAtHome,
    GeneralInfo,
}

impl RecommendationType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "see-doctor-soon" => Some(Self::SeeDoctorSoon),
            "emergency-now" => Some(Self::EmergencyNow),
            "monitor-at-home" => Some(Self::MonitorAtHome),
            "general-info" => Some(Self::GeneralInfo),
            _ => None,
        }
    }
}

/// Normalized assistant reply returned to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageReply {
    pub response_text: String,
    pub suggestions: Vec<String>,
    pub highlight_area: BodyArea,
    pub risk_level: Option<RiskLevel>,
    pub recommendation_type: Option<RecommendationType>,
}

impl TriageReply {
    /// Reply made only of a localized fallback message.
    pub fn fallback(language: Language, message: Fallback) -> Self {
        Self {
            response_text: language.fallback(message).to_string(),
            suggestions: vec![],
            highlight_area: BodyArea::None,
            risk_level: None,
            recommendation_type: None,
        }
    }
}

impl ReplySchema for TriageReply {
    fn from_object(object: &Map<String, Value>, language: Language) -> Self {
        Self {
            response_text: string_or_fallback(
                object,
                "responseText",
                language,
                Fallback::TriageResponse,
            ),
            suggestions: string_list(object, "suggestions"),
            highlight_area: enum_field(object, "highlightArea", BodyArea::parse)
                .unwrap_or_default(),
            risk_level: enum_field(object, "riskLevel", RiskLevel::parse),
            recommendation_type: enum_field(
                object,
                "recommendationType",
                RecommendationType::parse,
            ),
        }
    }
}

/// One prior message in the client's conversation.
///
/// Deserializes from any JSON value: a turn that is not an object, or
/// whose sender is missing or not `"user"`, is treated as a model turn.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "Value")]
pub struct ChatTurn {
    pub sender: Option<String>,
    pub text: Option<Value>,
}

impl From<Value> for ChatTurn {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(object) => Self {
                sender: object.get("sender").and_then(Value::as_str).map(str::to_string),
                text: object.get("text").cloned(),
            },
            _ => Self {
                sender: None,
                text: None,
            },
        }
    }
}

impl ChatTurn {
    pub fn is_user(&self) -> bool {
        self.sender.as_deref() == Some("user")
    }

    /// Text content; numbers and other scalars are stringified.
    pub fn text(&self) -> String {
        match &self.text {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// Validated symptom-assistant input.
#[derive(Debug, Clone)]
pub struct TriageRequest {
    pub message: String,
    pub history: Vec<ChatTurn>,
    pub language: Language,
}
