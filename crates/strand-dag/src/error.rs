//! Error types for history requests.

use strand_protocol::ProtocolError;
use strand_refs::RefError;

/// Errors that can occur while fetching a history graph.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DagError {
    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Convenience alias for DAG results.
pub type DagResult<T> = Result<T, DagError>;
