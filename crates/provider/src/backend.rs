use async_trait::async_trait;
use contentforge_core::{FaqEntry, ProductInput};
use uuid::Uuid;

use crate::error::Result;

/// Free-form generation request.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    /// Trace ID of the pipeline run making the call
    pub trace_id: Uuid,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, trace_id: Uuid) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: 0.7,
            trace_id,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Structured FAQ generation request.
#[derive(Debug, Clone)]
pub struct FaqRequest {
    pub product: ProductInput,
    /// Number of entries to ask the backend for
    pub min_questions: usize,
    /// Reflexion feedback from a failed validation pass, if any
    pub feedback: Option<String>,
    pub trace_id: Uuid,
}

impl FaqRequest {
    pub fn new(product: ProductInput, min_questions: usize, trace_id: Uuid) -> Self {
        Self {
            product,
            min_questions,
            feedback: None,
            trace_id,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}

/// A generation backend: either a remote model endpoint or the
/// deterministic rule engine. All backends are shareable and called
/// sequentially from the single orchestrator thread.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &str;

    /// Generate a free-form text response
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Generate FAQ entries for a product
    async fn generate_faq(&self, request: &FaqRequest) -> Result<Vec<FaqEntry>>;
}
