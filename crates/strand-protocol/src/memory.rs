//! Scripted in-memory transport for tests and local simulation.
//!
//! Replies are queued per `(method, path)` and consumed in order. Streaming
//! requests get a channel-backed stream that the test feeds through
//! [`ScriptedTransport::push`].

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures::channel::mpsc::{self, UnboundedSender};
use futures::stream::StreamExt;
use serde_json::{json, Value};
use tracing::trace;

use crate::error::{ProtocolError, ProtocolResult};
use crate::request::{Method, Request};
use crate::transport::{EnvelopeStream, Transport};

#[derive(Debug)]
enum Scripted {
    Envelope(Value),
    Failure(String),
}

#[derive(Default)]
struct Inner {
    replies: HashMap<(Method, String), VecDeque<Scripted>>,
    calls: Vec<Request>,
    feeds: HashMap<String, Vec<UnboundedSender<ProtocolResult<Value>>>>,
    opens: HashMap<String, usize>,
}

/// A [`Transport`] whose responses are scripted ahead of time.
///
/// Calls without a scripted reply fail with a transport error, so a test
/// notices any request it did not expect.
#[derive(Default)]
pub struct ScriptedTransport {
    inner: Mutex<Inner>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, method: Method, path: &str, reply: Scripted) {
        self.lock()
            .replies
            .entry((method, path.to_string()))
            .or_default()
            .push_back(reply);
    }

    /// Queue `{"result": value}` for the next matching call.
    pub fn reply_ok(&self, method: Method, path: &str, value: Value) {
        self.enqueue(method, path, Scripted::Envelope(json!({ "result": value })));
    }

    /// Queue `{"error": message}` for the next matching call.
    pub fn reply_error(&self, method: Method, path: &str, message: &str) {
        self.enqueue(method, path, Scripted::Envelope(json!({ "error": message })));
    }

    /// Queue a raw response body, envelope or not.
    pub fn reply_raw(&self, method: Method, path: &str, raw: Value) {
        self.enqueue(method, path, Scripted::Envelope(raw));
    }

    /// Make the next matching call fail at the transport level.
    pub fn fail(&self, method: Method, path: &str, reason: &str) {
        self.enqueue(method, path, Scripted::Failure(reason.to_string()));
    }

    /// Every request issued so far, streaming ones included.
    pub fn calls(&self) -> Vec<Request> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Requests issued against `path`.
    pub fn calls_to(&self, path: &str) -> Vec<Request> {
        self.lock()
            .calls
            .iter()
            .filter(|r| r.path() == path)
            .cloned()
            .collect()
    }

    /// How many streams have been opened on `path`.
    pub fn stream_opens(&self, path: &str) -> usize {
        self.lock().opens.get(path).copied().unwrap_or(0)
    }

    /// How many streams on `path` are still held by a consumer.
    pub fn live_streams(&self, path: &str) -> usize {
        self.lock()
            .feeds
            .get(path)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    fn feed(&self, path: &str, item: ProtocolResult<Value>) -> usize {
        let mut inner = self.lock();
        let Some(senders) = inner.feeds.get_mut(path) else {
            return 0;
        };
        senders.retain(|s| !s.is_closed());
        senders
            .iter()
            .filter(|s| s.unbounded_send(item.clone()).is_ok())
            .count()
    }

    /// Deliver `{"result": value}` to every open stream on `path`. Returns
    /// the number of streams reached.
    pub fn push(&self, path: &str, value: Value) -> usize {
        self.feed(path, Ok(json!({ "result": value })))
    }

    /// Deliver `{"error": message}` to every open stream on `path`.
    pub fn push_error(&self, path: &str, message: &str) -> usize {
        self.feed(path, Ok(json!({ "error": message })))
    }

    /// Deliver a transport failure to every open stream on `path`.
    pub fn push_failure(&self, path: &str, reason: &str) -> usize {
        self.feed(path, Err(ProtocolError::Transport(reason.to_string())))
    }

    /// End every open stream on `path`, as if the remote hung up.
    pub fn close_streams(&self, path: &str) {
        if let Some(senders) = self.lock().feeds.remove(path) {
            for sender in senders {
                sender.close_channel();
            }
        }
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn call(&self, request: Request) -> ProtocolResult<Value> {
        trace!(%request, "scripted call");
        let key = (request.method(), request.path());
        let mut inner = self.lock();
        inner.calls.push(request);
        let reply = inner.replies.get_mut(&key).and_then(VecDeque::pop_front);
        match reply {
            Some(Scripted::Envelope(raw)) => Ok(raw),
            Some(Scripted::Failure(reason)) => Err(ProtocolError::Transport(reason)),
            None => Err(ProtocolError::Transport(format!(
                "no scripted reply for {} /{}",
                key.0, key.1
            ))),
        }
    }

    async fn open_stream(&self, request: Request) -> ProtocolResult<EnvelopeStream> {
        trace!(%request, "scripted stream");
        let key = (request.method(), request.path());
        let mut inner = self.lock();
        inner.calls.push(request);
        match inner.replies.get_mut(&key).and_then(VecDeque::pop_front) {
            Some(Scripted::Failure(reason)) => return Err(ProtocolError::Transport(reason)),
            Some(Scripted::Envelope(raw)) => {
                return Err(ProtocolError::Transport(format!(
                    "reply {raw} scripted for streaming request {} /{}",
                    key.0, key.1
                )))
            }
            None => {}
        }
        *inner.opens.entry(key.1.clone()).or_insert(0) += 1;
        let (tx, rx) = mpsc::unbounded();
        inner.feeds.entry(key.1).or_default().push(tx);
        Ok(rx.boxed())
    }
}
