/// Assistant integration - text generation behind a trait
///
/// Every feature that wants generated text (insights, chat, goal breakdown,
/// schedule suggestions, the weekly digest) talks to the TextGenerator trait
/// so the whole service runs and tests without any assistant backend. The
/// features differ in how they treat failure: insights and schedules fall
/// back to deterministic output, chat and breakdown surface the error.

pub mod assistant;
pub mod breakdown;
pub mod insights;
pub mod schedule;

pub use assistant::*;
pub use breakdown::*;
pub use insights::*;
pub use schedule::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the text generation backend
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Text generation failed: {0}")]
    Failed(String),

    #[error("Generated response was malformed: {0}")]
    Malformed(String),

    #[error("No text generator is configured")]
    Unconfigured,
}

/// A backend that turns a prompt into text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Generator used when no assistant backend is wired up
///
/// Always fails, which routes insight, schedule and digest callers onto
/// their deterministic fallbacks and reports chat as unavailable.
pub struct OfflineGenerator;

#[async_trait]
impl TextGenerator for OfflineGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Unconfigured)
    }
}
