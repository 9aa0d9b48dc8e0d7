//! Foundation types for Strand.
//!
//! This crate provides the identity and structural types shared by every
//! other Strand crate. Nothing here performs I/O.
//!
//! # Key Types
//!
//! - [`Hash`]: Content-addressed identifier of a content, node, or commit
//! - [`TagName`]: Validated human-readable branch name
//! - [`Path`]: Ordered sequence of steps addressing a position in the tree
//! - [`Branch`]: Current position of a store handle: tag, detached head, or empty
//! - [`Commit`] / [`Task`]: Commit DAG node and its metadata
//! - [`Slice`]: Bounded, transferable snapshot of the object graph
//! - [`LcaOutcome`]: Bounded common-ancestor search result
//! - [`SearchBounds`]: Depth and candidate limits for graph walks
//! - [`Schema`]: Bundle of the key, value, hash, and tag types of a store

pub mod bounds;
pub mod branch;
pub mod commit;
pub mod encoding;
pub mod error;
pub mod hash;
pub mod outcome;
pub mod path;
pub mod schema;
pub mod slice;
pub mod tag;

pub use bounds::SearchBounds;
pub use branch::Branch;
pub use commit::{Commit, Task};
pub use error::TypeError;
pub use hash::Hash;
pub use outcome::{Conflict, LcaOutcome, MergeReply};
pub use path::Path;
pub use schema::{DefaultSchema, HumanReadable, Schema, StoreHash, StoreKey, StoreTag, StoreValue};
pub use slice::Slice;
pub use tag::{validate_tag_name, TagName};
