//! Response extraction: turns a generative model's free-text reply into a
//! schema-conformant object.
//!
//! The model is asked for a bare JSON object but routinely wraps it in
//! markdown fences or surrounds it with prose. `extract_reply` locates the
//! object, then lets the calling feature's `ReplySchema` repair missing or
//! mistyped fields. Only a reply with no parseable object at all is an error.

pub mod parser;
pub mod schema;

pub use parser::*;
pub use schema::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReplyError {
    #[error("Malformed model response: {0}")]
    MalformedResponse(String),
}
