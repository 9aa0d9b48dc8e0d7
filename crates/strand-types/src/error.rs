use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid tag name: {name}: {reason}")]
    InvalidTagName { name: String, reason: String },

    #[error("invalid path step encoding: {0}")]
    InvalidStep(String),
}
