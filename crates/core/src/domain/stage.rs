use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Pipeline stages form a linear forward chain with a single backward edge
/// from `Verification` back to `Drafting`, used by the reflexion retry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    #[default]
    Extraction,
    Drafting,
    Assembly,
    Verification,
    Complete,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extraction => "extraction",
            Self::Drafting => "drafting",
            Self::Assembly => "assembly",
            Self::Verification => "verification",
            Self::Complete => "complete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "extraction" => Some(Self::Extraction),
            "drafting" => Some(Self::Drafting),
            "assembly" => Some(Self::Assembly),
            "verification" => Some(Self::Verification),
            "complete" => Some(Self::Complete),
            _ => None,
        }
    }

    /// Forward-adjacent stage, `None` at the terminal stage.
    pub fn next(&self) -> Option<Stage> {
        match self {
            Self::Extraction => Some(Self::Drafting),
            Self::Drafting => Some(Self::Assembly),
            Self::Assembly => Some(Self::Verification),
            Self::Verification => Some(Self::Complete),
            Self::Complete => None,
        }
    }

    /// Target of the reflexion backward edge. Only the verification stage
    /// has one.
    pub fn retry_target(&self) -> Option<Stage> {
        match self {
            Self::Verification => Some(Self::Drafting),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

pub struct StageMachine;

impl StageMachine {
    pub fn validate_transition(from: Stage, to: Stage) -> Result<(), CoreError> {
        if Self::can_transition(from, to) {
            Ok(())
        } else {
            Err(CoreError::InvalidStageTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            })
        }
    }

    pub fn can_transition(from: Stage, to: Stage) -> bool {
        from.next() == Some(to) || from.retry_target() == Some(to)
    }
}
