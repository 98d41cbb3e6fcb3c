use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DocumentType;

/// A persisted document analysis, owned by the user who uploaded the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub id: Uuid,
    pub user_id: String,
    pub original_text: String,
    pub simplified_text: String,
    pub document_type: DocumentType,
    pub language: String,
    pub model: String,
    pub created_at: NaiveDateTime,
}
