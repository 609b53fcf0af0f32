//! The seam between quiz generation and the hosted model.
//!
//! [`crate::pipeline::generate`] builds a provider-neutral [`ContentRequest`]
//! and hands it to a [`QuizService`]; the service returns the reply text and
//! nothing else. Parsing and validation stay on the generation side, so a
//! test double only has to return a string.

pub mod gemini;

use crate::error::GenerationError;
use crate::quiz::EncodedFile;
use async_trait::async_trait;
use serde_json::Value;

pub use gemini::GeminiService;

/// One structured-output request: inline file, instruction, schema.
#[derive(Debug, Clone)]
pub struct ContentRequest {
    pub model: String,
    /// Sent first, as inline binary data.
    pub file: EncodedFile,
    /// Natural-language instruction naming the requested counts.
    pub instruction: String,
    /// Schema the reply must follow.
    pub response_schema: Value,
    /// Always `application/json` for quiz generation.
    pub response_mime_type: String,
    pub temperature: Option<f32>,
}

/// A generative-content backend.
#[async_trait]
pub trait QuizService: Send + Sync {
    /// Short identifier used in errors and logs.
    fn name(&self) -> &str;

    /// Perform one call and return the model's reply text.
    ///
    /// Implementations must not retry; a failure is reported once.
    async fn generate_content(&self, request: &ContentRequest) -> Result<String, GenerationError>;
}
