use strand_protocol::ProtocolError;
use thiserror::Error;

/// A watch stream that could not be opened or stopped unexpectedly.
///
/// `scope` names the stream: `watch-key/<key>` or `watch`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("failed to open {scope} stream: {source}")]
    Open {
        scope: String,
        #[source]
        source: ProtocolError,
    },

    #[error("{scope} stream failed: {source}")]
    Stream {
        scope: String,
        #[source]
        source: ProtocolError,
    },

    #[error("{scope} stream closed by remote")]
    Closed { scope: String },

    #[error("invalid watch request: {0}")]
    Request(#[from] ProtocolError),
}

impl WatchError {
    pub fn scope(&self) -> Option<&str> {
        match self {
            WatchError::Open { scope, .. }
            | WatchError::Stream { scope, .. }
            | WatchError::Closed { scope } => Some(scope),
            WatchError::Request(_) => None,
        }
    }
}

pub type WatchResult<T> = std::result::Result<T, WatchError>;
