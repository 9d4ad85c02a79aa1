use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the rotolog logger
#[derive(Debug, Error)]
pub enum RotologError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid configuration file: {0}")]
    InvalidConfig(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidationError(String),

    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    // Setup errors
    #[error("Failed to create log directory '{path}': {source}")]
    CreateLogDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to open log file '{path}': {source}")]
    LogFileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Rotation errors
    #[error("Log rotation failed: {0}")]
    LogRotationError(String),

    #[error("Failed to compress '{path}': {source}")]
    CompressionError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors (automatically converted from std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for rotolog operations
pub type Result<T> = std::result::Result<T, RotologError>;

impl From<RotologError> for std::io::Error {
    fn from(err: RotologError) -> Self {
        match err {
            RotologError::Io(e) => e,
            RotologError::LogFileError { source, .. }
            | RotologError::CreateLogDir { source, .. }
            | RotologError::CompressionError { source, .. } => source,
            other => std::io::Error::other(other.to_string()),
        }
    }
}
