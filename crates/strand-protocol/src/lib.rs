//! Wire protocol for Strand.
//!
//! Defines how client operations become requests (method, path segments,
//! query, JSON body), how `{"result": ...}` / `{"error": ...}` envelopes are
//! decoded, and the [`Transport`] interface a connection layer implements.
//! [`RemoteClient`] wraps a transport with typed decoding; [`ScriptedTransport`]
//! is an in-memory transport for tests.

pub mod client;
pub mod endpoint;
pub mod envelope;
pub mod error;
pub mod memory;
pub mod request;
pub mod transport;

pub use client::{EventStream, RemoteClient};
pub use endpoint::endpoints;
pub use envelope::Envelope;
pub use error::{ProtocolError, ProtocolResult};
pub use memory::ScriptedTransport;
pub use request::{Method, Request};
pub use transport::{EnvelopeStream, Transport};
