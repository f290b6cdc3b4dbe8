//! Error types for flatvars

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for flatvars operations
pub type Result<T> = std::result::Result<T, FlatvarsError>;

/// Errors that can occur while reading, flattening or writing values
#[derive(Error, Debug)]
pub enum FlatvarsError {
    /// The document does not have the shape of a values tree
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    /// Nesting went past the configured recursion ceiling
    #[error("Input nesting exceeds the limit of {limit} levels")]
    NestingTooDeep { limit: usize },

    /// Values file not found
    #[error("File {} does not exist", path.display())]
    InputNotFound { path: PathBuf },

    /// YAML parsing or serialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FlatvarsError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        FlatvarsError::MalformedInput {
            message: message.into(),
        }
    }
}
