use async_trait::async_trait;
use futures::stream::BoxStream;
use serde_json::Value;

use crate::error::ProtocolResult;
use crate::request::Request;

/// A stream of raw response envelopes.
pub type EnvelopeStream = BoxStream<'static, ProtocolResult<Value>>;

/// Connection layer to a remote store.
///
/// Implementations own connection handling, the store URI, timeouts and
/// retries. Failures to reach the remote are reported as
/// [`ProtocolError::Transport`](crate::ProtocolError::Transport), never as an
/// empty response.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a request and return the raw JSON response envelope.
    async fn call(&self, request: Request) -> ProtocolResult<Value>;

    /// Open a streaming request. Each item is one raw envelope; the stream
    /// ends when the remote closes it.
    async fn open_stream(&self, request: Request) -> ProtocolResult<EnvelopeStream>;
}
