//! Error types for the curation pipeline.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CuratorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Service returned HTTP {0}")]
    Status(u16),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CuratorError {
    /// Transient failures are the ones a retry could fix.
    pub fn is_transient(&self) -> bool {
        match self {
            CuratorError::Network(_) => true,
            CuratorError::Status(code) => *code >= 500 || *code == 429,
            _ => false,
        }
    }
}

pub type CuratorResult<T> = Result<T, CuratorError>;
