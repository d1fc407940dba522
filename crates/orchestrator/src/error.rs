use serde::{Deserialize, Serialize};

/// Why a pipeline run ended without reaching the terminal stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A worker reported an infrastructure or logic fault. Never retried.
    Error,
    /// Validation kept failing after the retry budget was spent.
    ValidationExhausted,
    /// No applicable worker and no stage progress, or the step budget ran
    /// out.
    StuckRun,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::ValidationExhausted => "validation_exhausted",
            Self::StuckRun => "stuck_run",
        }
    }
}

/// Structured failure returned alongside the final blackboard snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RunFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_kind_serialization() {
        let failure = RunFailure::new(FailureKind::ValidationExhausted, "3 retries spent");
        let json = serde_json::to_string(&failure).unwrap();
        assert!(json.contains("validation_exhausted"));
        assert_eq!(FailureKind::StuckRun.as_str(), "stuck_run");
    }
}
