//! Error types for branch operations.

use strand_protocol::ProtocolError;
use thiserror::Error;

/// Errors that can occur while resolving or moving a branch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefError {
    /// The operation cannot be expressed for the current branch kind.
    #[error("{operation} is not supported on {branch} branch")]
    Unsupported {
        operation: &'static str,
        branch: &'static str,
    },

    /// The remote call behind the operation failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Convenience type alias for branch operations.
pub type RefResult<T> = std::result::Result<T, RefError>;
