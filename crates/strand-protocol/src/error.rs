use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The connection layer failed; no response was decoded.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote answered with an `{"error": ...}` envelope.
    #[error("remote error: {0}")]
    Remote(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("deserialization error: {0}")]
    Decode(String),

    #[error("serialization error: {0}")]
    Encode(String),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
