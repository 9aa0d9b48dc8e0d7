//! Change notification for Strand.
//!
//! A [`WatchHub`] multiplexes local watchers onto remote streams: all
//! callbacks on one key share a single `watch-key` subscription, and all
//! global callbacks share a single `watch` subscription. A stream is opened
//! by the first registration and cancelled when its last callback is
//! removed. Streams that fail are reported on [`WatchHub::failures`].

pub mod callback;
pub mod connection;
pub mod error;
pub mod hub;

pub use callback::{on_change, on_value, GlobalCallback, KeyCallback};
pub use connection::Connection;
pub use error::{WatchError, WatchResult};
pub use hub::{WatchHub, WatchId};
