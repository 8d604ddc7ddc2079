//! Error types for configuration, result sinks and terminal setup.
//!
//! The typing engine itself never fails; these only surface at the edges.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Results database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV log error: {0}")]
    Csv(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // Test Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported time limit {0}s (expected one of 15, 30, 60, 120)")]
    InvalidTimeLimit(u64),

    #[error("Unsupported word count {0} (expected one of 10, 25, 50, 100)")]
    InvalidWordCount(usize),

    #[error("Custom mode requires non-empty text")]
    EmptyCustomText,

    // ─────────────────────────────────────────────────────────────
    // Terminal Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Terminal error: {message}")]
    Terminal { message: String },
}

impl Error {
    pub fn terminal(message: impl Into<String>) -> Self {
        Self::Terminal {
            message: message.into(),
        }
    }

    /// Whether the error came from validating a test configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidTimeLimit(_)
                | Error::InvalidWordCount(_)
                | Error::EmptyCustomText
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_errors_are_classified() {
        assert!(Error::InvalidTimeLimit(45).is_config_error());
        assert!(Error::InvalidWordCount(7).is_config_error());
        assert!(Error::EmptyCustomText.is_config_error());
        assert!(!Error::terminal("boom").is_config_error());
    }

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            Error::InvalidTimeLimit(45).to_string(),
            "Unsupported time limit 45s (expected one of 15, 30, 60, 120)"
        );
        assert_eq!(
            Error::InvalidWordCount(7).to_string(),
            "Unsupported word count 7 (expected one of 10, 25, 50, 100)"
        );
    }
}
