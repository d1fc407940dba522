use serde::{Deserialize, Serialize};

/// Outcome category of a single worker invocation.
///
/// `Error` marks an infrastructure or logic fault and is never retried by
/// the engine; `ValidationFailed` marks content insufficiency and triggers
/// the reflexion path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Complete,
    ValidationFailed,
    Error,
}

impl WorkerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::ValidationFailed => "validation_failed",
            Self::Error => "error",
        }
    }
}

/// Standardized return value of every worker invocation. Created fresh per
/// run; ownership transfers to the engine immediately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerReport {
    pub worker: String,
    pub status: WorkerStatus,
    pub message: String,
}

impl WorkerReport {
    pub fn complete(worker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            worker: worker.into(),
            status: WorkerStatus::Complete,
            message: message.into(),
        }
    }

    pub fn validation_failed(worker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            worker: worker.into(),
            status: WorkerStatus::ValidationFailed,
            message: message.into(),
        }
    }

    pub fn error(worker: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            worker: worker.into(),
            status: WorkerStatus::Error,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_constructors() {
        let report = WorkerReport::complete("FaqWorker", "generated 15 questions");
        assert_eq!(report.status, WorkerStatus::Complete);
        assert_eq!(report.worker, "FaqWorker");

        let report = WorkerReport::error("FaqWorker", "backend unreachable");
        assert_eq!(report.status, WorkerStatus::Error);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(WorkerStatus::ValidationFailed.as_str(), "validation_failed");
        let json = serde_json::to_string(&WorkerStatus::Complete).unwrap();
        assert_eq!(json, "\"complete\"");
    }
}
