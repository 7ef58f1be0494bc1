//! Error types for Reel Bank

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum RbError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unknown state: {0}")]
    UnknownState(String),
}

/// Result type alias
pub type RbResult<T> = Result<T, RbError>;
