//! Client SDK for Strand remote stores.
//!
//! A [`Store`] is a handle on one branch of a remote store: a named tag, a
//! detached commit, or an empty branch with no commit yet. It reads and
//! writes the content tree of that branch, moves its head, merges other
//! branches into it, watches keys for changes, and moves slices of the object
//! graph between stores. All communication goes through a [`Transport`];
//! [`ScriptedTransport`] is an in-memory one for tests.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use strand_sdk::{DefaultSchema, Path, ScriptedTransport, Store, StoreConfig};
//!
//! # async fn demo() -> strand_sdk::SdkResult<()> {
//! let transport = Arc::new(ScriptedTransport::new());
//! let store = Store::<DefaultSchema>::master(transport, StoreConfig::default());
//! let head = store.update(&Path::new(["a", "b"]), &serde_json::json!("v1")).await?;
//! let detached = store.at_head(head);
//! assert_eq!(detached.tag(), None);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod contents;
pub mod error;
pub mod history;
pub mod store;
pub mod watch;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, StoreConfig, DEFAULT_WATCH_FAILURE_CAPACITY};
pub use contents::KeyStream;
pub use error::{ErrorKind, SdkError, SdkResult};
pub use store::{CloneOutcome, HashOf, Store, TagOf};

pub use strand_dag::{HistoryGraph, HistoryQuery};
pub use strand_protocol::{ScriptedTransport, Transport};
pub use strand_sync::ExportQuery;
pub use strand_types::{
    Branch, Commit, Conflict, DefaultSchema, Hash, HumanReadable, LcaOutcome, Path, Schema,
    SearchBounds, Slice, TagName, Task,
};
pub use strand_watch::{on_change, on_value, GlobalCallback, KeyCallback, WatchError, WatchId};
