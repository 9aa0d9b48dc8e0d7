use futures::stream::StreamExt;
use serde::de::DeserializeOwned;
use strand_protocol::{EventStream, ProtocolResult, RemoteClient, Request};

/// A watch subscription that is either waiting to be opened or streaming.
pub enum Connection<E> {
    NotConnected { client: RemoteClient, request: Request },
    Connected(EventStream<E>),
}

impl<E: DeserializeOwned + Send + 'static> Connection<E> {
    pub fn new(client: RemoteClient, request: Request) -> Self {
        Connection::NotConnected { client, request }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Connection::Connected(_))
    }

    /// Open the subscription. A no-op once connected.
    pub async fn connect(&mut self) -> ProtocolResult<()> {
        if let Connection::NotConnected { client, request } = self {
            let stream = client.subscribe(request.clone()).await?;
            *self = Connection::Connected(stream);
        }
        Ok(())
    }

    /// The next event, connecting first if needed. `None` once the remote
    /// has closed the stream or after the first error.
    pub async fn next(&mut self) -> Option<ProtocolResult<E>> {
        if let Err(e) = self.connect().await {
            return Some(Err(e));
        }
        match self {
            Connection::Connected(stream) => stream.next().await,
            Connection::NotConnected { .. } => None,
        }
    }
}
