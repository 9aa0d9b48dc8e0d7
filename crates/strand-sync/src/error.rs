use strand_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("export failed: {0}")]
    Export(#[source] ProtocolError),

    #[error("import failed: {0}")]
    Import(#[source] ProtocolError),
}

impl SyncError {
    /// The underlying protocol failure.
    pub fn protocol(&self) -> &ProtocolError {
        match self {
            SyncError::Export(e) | SyncError::Import(e) => e,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;
