use strand_protocol::ProtocolError;
use strand_refs::RefError;
use strand_types::Conflict;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MergeError {
    /// Raised only by the `_exn` merge variants.
    #[error(transparent)]
    Conflict(#[from] Conflict),

    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

pub type MergeResult<T> = std::result::Result<T, MergeError>;
