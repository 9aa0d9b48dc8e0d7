//! Snapshot transfer between Strand stores.
//!
//! A store exports a [`Slice`](strand_types::Slice) bounded by the commits
//! the receiver already has (`min`) and the commits it wants (`max`), and
//! another store imports it. Deduplication on import is left to the
//! receiving store.

pub mod error;
pub mod transfer;
pub mod types;

pub use error::{SyncError, SyncResult};
pub use transfer::{transfer, SliceTransfer};
pub use types::ExportQuery;
