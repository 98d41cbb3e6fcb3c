//! Medical document analysis: OCR and patient-friendly simplification of
//! an uploaded prescription or lab report via a vision-capable model.

pub mod orchestrator;
pub mod prompt;
pub mod types;

pub use orchestrator::*;
pub use prompt::*;
pub use types::*;
