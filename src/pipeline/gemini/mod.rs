//! Client for the Gemini `generateContent` HTTP API.

pub mod client;
pub mod types;

pub use client::*;
pub use types::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeminiError {
    #[error("Model API is not reachable at {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Model API returned error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}
