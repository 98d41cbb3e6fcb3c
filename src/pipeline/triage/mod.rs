//! Symptom-triage assistant: prompt construction, model call, and reply
//! normalization for the conversational endpoint.

pub mod orchestrator;
pub mod prompt;
pub mod types;

pub use orchestrator::*;
pub use prompt::*;
pub use types::*;
