use strand_dag::DagError;
use strand_merge::MergeError;
use strand_protocol::ProtocolError;
use strand_refs::RefError;
use strand_sync::SyncError;
use strand_watch::WatchError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SdkError {
    /// A caller demanded a value the store does not have.
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Ref(#[from] RefError),

    #[error(transparent)]
    Watch(#[from] WatchError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Dag(#[from] DagError),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Coarse classification of an [`SdkError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The remote could not be reached.
    Transport,
    /// The remote answered with an error message.
    Protocol,
    NotFound,
    /// The operation cannot run on the handle's current branch.
    InvalidOperation,
    /// A merge conflict escalated by an `_exn` call.
    Conflict,
    /// A response did not have the expected shape.
    Decode,
    /// A watch stream could not be opened or failed.
    Watch,
}

fn protocol_kind(e: &ProtocolError) -> ErrorKind {
    match e {
        ProtocolError::Transport(_) => ErrorKind::Transport,
        ProtocolError::Remote(_) => ErrorKind::Protocol,
        ProtocolError::MalformedEnvelope(_)
        | ProtocolError::Decode(_)
        | ProtocolError::Encode(_) => {
            ErrorKind::Decode
        }
    }
}

fn ref_kind(e: &RefError) -> ErrorKind {
    match e {
        RefError::Unsupported { .. } => ErrorKind::InvalidOperation,
        RefError::Protocol(p) => protocol_kind(p),
    }
}

impl SdkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SdkError::NotFound(_) => ErrorKind::NotFound,
            SdkError::Protocol(p) => protocol_kind(p),
            SdkError::Ref(r) => ref_kind(r),
            SdkError::Watch(WatchError::Request(p)) => protocol_kind(p),
            SdkError::Watch(_) => ErrorKind::Watch,
            SdkError::Merge(MergeError::Conflict(_)) => ErrorKind::Conflict,
            SdkError::Merge(MergeError::Ref(r)) => ref_kind(r),
            SdkError::Merge(MergeError::Protocol(p)) => protocol_kind(p),
            SdkError::Dag(DagError::Ref(r)) => ref_kind(r),
            SdkError::Dag(DagError::Protocol(p)) => protocol_kind(p),
            SdkError::Sync(s) => protocol_kind(s.protocol()),
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
