use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::DocumentType;
use crate::pipeline::language::{Fallback, Language};
use crate::pipeline::reply::{enum_field, string_or_fallback, ReplySchema};

/// Normalized OCR + simplification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub original_text: String,
    pub simplified_text: String,
    pub document_type: DocumentType,
}

impl ReplySchema for DocumentAnalysis {
    fn from_object(object: &Map<String, Value>, language: Language) -> Self {
        Self {
            original_text: string_or_fallback(
                object,
                "originalText",
                language,
                Fallback::OriginalText,
            ),
            simplified_text: string_or_fallback(
                object,
                "simplifiedText",
                language,
                Fallback::SimplifiedText,
            ),
            document_type: enum_field(object, "documentType", |s| {
                DocumentType::from_str(&s.to_ascii_lowercase()).ok()
            })
            .unwrap_or_default(),
        }
    }
}

/// Uploaded document image, type-checked by magic bytes.
#[derive(Debug, Clone)]
pub struct DocumentImage {
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}

impl DocumentImage {
    /// Accept the upload only when its content is a supported image or PDF.
    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        detect_mime_from_bytes(&bytes).map(|mime_type| Self { bytes, mime_type })
    }
}

/// Detect a supported document MIME type from magic bytes.
pub fn detect_mime_from_bytes(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 4 {
        return None;
    }

    // JPEG: FF D8 FF
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some("image/jpeg");
    }
    // PNG: 89 50 4E 47
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        return Some("image/png");
    }
    // PDF: %PDF
    if bytes.starts_with(b"%PDF") {
        return Some("application/pdf");
    }
    // WebP: RIFF....WEBP
    if bytes.len() >= 12 && bytes[..4] == *b"RIFF" && bytes[8..12] == *b"WEBP" {
        return Some("image/webp");
    }
    // HEIF/HEIC: ....ftyp at offset 4
    if bytes.len() >= 12
        && bytes[4..8] == *b"ftyp"
        && matches!(&bytes[8..12], b"heic" | b"heix" | b"mif1")
    {
        return Some("image/heic");
    }
    None
}
