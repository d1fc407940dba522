//! Event types for the contentforge pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope wrapping all events with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// Trace ID of the pipeline run this event belongs to
    pub trace_id: Uuid,
    /// The actual event
    pub event: Event,
}

impl EventEnvelope {
    /// Create a new event envelope with auto-generated ID and timestamp
    pub fn new(trace_id: Uuid, event: Event) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            trace_id,
            event,
        }
    }
}

/// All events emitted by the pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The blackboard moved to a new stage
    #[serde(rename = "stage.changed")]
    StageChanged { from: String, to: String },

    /// A worker was selected and is about to run
    #[serde(rename = "worker.started")]
    WorkerStarted { worker: String, stage: String },

    /// A worker invocation returned
    #[serde(rename = "worker.finished")]
    WorkerFinished {
        worker: String,
        status: String,
        message: String,
    },

    /// Validation failed and a reflexion retry was scheduled
    #[serde(rename = "retry.scheduled")]
    RetryScheduled {
        retry_count: u32,
        feedback: String,
        target_stage: String,
    },

    /// The gated provider served a call from the fallback backend
    #[serde(rename = "provider.fallback")]
    ProviderFallback { reason: String },

    /// The run reached the terminal stage
    #[serde(rename = "run.completed")]
    RunCompleted { steps: u32, retries: u32 },

    /// The run exited with a failure kind
    #[serde(rename = "run.failed")]
    RunFailed { kind: String, message: String },

    /// Generic error event
    #[serde(rename = "error")]
    Error {
        message: String,
        context: Option<String>,
    },
}

impl Event {
    /// Stable kind string, matching the serde tag
    pub fn kind(&self) -> &'static str {
        match self {
            Event::StageChanged { .. } => "stage.changed",
            Event::WorkerStarted { .. } => "worker.started",
            Event::WorkerFinished { .. } => "worker.finished",
            Event::RetryScheduled { .. } => "retry.scheduled",
            Event::ProviderFallback { .. } => "provider.fallback",
            Event::RunCompleted { .. } => "run.completed",
            Event::RunFailed { .. } => "run.failed",
            Event::Error { .. } => "error",
        }
    }
}
