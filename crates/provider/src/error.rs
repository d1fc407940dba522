use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to parse backend response: {0}")]
    Parse(String),

    #[error("Backend exhausted after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },
}

pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ProviderError::Unavailable("circuit open".to_string());
        assert_eq!(error.to_string(), "Backend unavailable: circuit open");

        let error = ProviderError::Exhausted {
            attempts: 3,
            last_error: "timeout".to_string(),
        };
        assert!(error.to_string().contains("3 attempts"));
    }
}
