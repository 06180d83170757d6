//! Script and proposal generation
//!
//! [`PromptBuilder`] renders a [`SalesBrief`] into a prompt; a
//! [`TextGenerator`] (normally [`GeminiClient`]) turns it into text.

pub mod gemini;
pub mod prompt;

use async_trait::async_trait;

use crate::error::Result;

pub use gemini::{GeminiClient, GeminiConfig};
pub use prompt::{PromptBuilder, SalesBrief};

/// Generative-text backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Complete `prompt`, returning non-empty text.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
