use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid stage transition from {from} to {to}")]
    InvalidStageTransition { from: String, to: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = CoreError::InvalidStageTransition {
            from: "extraction".to_string(),
            to: "complete".to_string(),
        };
        assert!(error.to_string().contains("extraction"));
        assert!(error.to_string().contains("complete"));
    }
}
