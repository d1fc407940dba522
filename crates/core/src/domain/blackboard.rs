use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::content::GeneratedContent;
use crate::domain::product::ProductInput;
use crate::domain::stage::{Stage, StageMachine};
use crate::error::CoreError;

/// Shared state record for one pipeline run.
///
/// Every worker and the engine read and write this single object. Workers
/// must go through the mutation helpers: `advance_stage` enforces the stage
/// machine, `set_feedback` keeps the retry counter monotonic, and
/// `log_step` keeps `history` append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blackboard {
    pub stage: Stage,
    pub product: ProductInput,
    pub comparison: Option<ProductInput>,
    pub content: GeneratedContent,
    pub validation_errors: Vec<String>,
    pub is_valid: bool,
    pub feedback: Option<String>,
    pub retry_count: u32,
    pub trace_id: Uuid,
    pub history: Vec<String>,
}

impl Blackboard {
    pub fn new(product: ProductInput) -> Self {
        Self {
            stage: Stage::default(),
            product,
            comparison: None,
            content: GeneratedContent::default(),
            validation_errors: Vec::new(),
            is_valid: false,
            feedback: None,
            retry_count: 0,
            trace_id: Uuid::new_v4(),
            history: Vec::new(),
        }
    }

    pub fn with_comparison(mut self, comparison: ProductInput) -> Self {
        self.comparison = Some(comparison);
        self
    }

    /// Append a step name to the run history.
    pub fn log_step(&mut self, name: impl Into<String>) {
        self.history.push(name.into());
    }

    /// Move to `next`. Only the forward-adjacent stage or the reflexion
    /// target of the current stage are reachable; anything else is a
    /// programming-contract violation, not a recoverable failure.
    pub fn advance_stage(&mut self, next: Stage) -> Result<(), CoreError> {
        StageMachine::validate_transition(self.stage, next)?;
        self.stage = next;
        Ok(())
    }

    /// Record reflexion feedback for the retried stage and bump the retry
    /// counter. The counter never decreases.
    pub fn set_feedback(&mut self, text: impl Into<String>) {
        self.feedback = Some(text.into());
        self.retry_count += 1;
    }

    pub fn take_feedback(&mut self) -> Option<String> {
        self.feedback.take()
    }

    /// Replace the validation error list for a fresh validation attempt.
    pub fn reset_validation(&mut self) {
        self.validation_errors.clear();
        self.is_valid = false;
    }
}
