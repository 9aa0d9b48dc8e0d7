use std::fmt;
use std::sync::Arc;

use futures::future;
use futures::stream::{BoxStream, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::envelope::Envelope;
use crate::error::ProtocolResult;
use crate::request::Request;
use crate::transport::Transport;

/// A stream of decoded events. It ends after yielding its first error.
pub type EventStream<T> = BoxStream<'static, ProtocolResult<T>>;

/// Typed access to a remote store through a [`Transport`].
#[derive(Clone)]
pub struct RemoteClient {
    transport: Arc<dyn Transport>,
}

impl RemoteClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Issue a request and decode the envelope's result as `R`.
    pub async fn send<R: DeserializeOwned>(&self, request: Request) -> ProtocolResult<R> {
        debug!(method = %request.method(), path = %request.path(), "remote request");
        let raw = self.transport.call(request).await?;
        Envelope::decode(raw)?.into_typed()
    }

    /// Issue a request whose result carries no information.
    pub async fn send_unit(&self, request: Request) -> ProtocolResult<()> {
        self.send::<Value>(request).await.map(|_| ())
    }

    /// Open a streaming request and decode each envelope as `R`.
    ///
    /// An `{"error": ...}` envelope, a transport failure, or an undecodable
    /// event is yielded once as `Err` and terminates the stream.
    pub async fn subscribe<R>(&self, request: Request) -> ProtocolResult<EventStream<R>>
    where
        R: DeserializeOwned + Send + 'static,
    {
        debug!(method = %request.method(), path = %request.path(), "remote subscribe");
        let raw = self.transport.open_stream(request).await?;
        let decoded = raw.scan(false, |failed, item| {
            if *failed {
                return future::ready(None);
            }
            let event = item.and_then(|v| Envelope::decode(v)?.into_typed::<R>());
            *failed = event.is_err();
            future::ready(Some(event))
        });
        Ok(decoded.boxed())
    }
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient").finish_non_exhaustive()
    }
}
