//! Error types for blockhub

use crate::search::Module;
use thiserror::Error;

/// Result type alias using BlockhubError
pub type Result<T> = std::result::Result<T, BlockhubError>;

/// Error type alias for convenience
pub type Error = BlockhubError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const NOT_FOUND: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Main error type for blockhub
#[derive(Debug, Error)]
pub enum BlockhubError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{module} repository error: {message}")]
    Repository { module: Module, message: String },

    #[error("Search failed after {elapsed_ms}ms: {message}")]
    SearchFailed { elapsed_ms: u64, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("Glob pattern error: {0}")]
    GlobPattern(#[from] glob::PatternError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl BlockhubError {
    /// Build a repository error for a module
    pub fn repository(module: Module, message: impl Into<String>) -> Self {
        Self::Repository {
            module,
            message: message.into(),
        }
    }

    /// Whether the caller sent a bad request (as opposed to a server-side failure)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidInput(_) | Self::NotFound(_))
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => exit_codes::NOT_FOUND,
            Self::InvalidInput(_) | Self::Config(_) => exit_codes::INVALID_INPUT,
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            BlockhubError::InvalidInput("q".into()).exit_code(),
            exit_codes::INVALID_INPUT
        );
        assert_eq!(
            BlockhubError::NotFound("x".into()).exit_code(),
            exit_codes::NOT_FOUND
        );
        assert_eq!(
            BlockhubError::repository(Module::Forum, "down").exit_code(),
            exit_codes::GENERAL_ERROR
        );
    }

    #[test]
    fn test_repository_error_display() {
        let err = BlockhubError::repository(Module::Wiki, "connection refused");
        assert_eq!(err.to_string(), "wiki repository error: connection refused");
        assert!(!err.is_client_error());
    }

    #[test]
    fn test_search_failed_display() {
        let err = BlockhubError::SearchFailed {
            elapsed_ms: 12,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Search failed after 12ms: boom");
    }
}
