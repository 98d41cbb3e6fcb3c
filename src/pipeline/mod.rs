pub mod analysis;
pub mod gemini;
pub mod language;
pub mod reply;
pub mod triage;
