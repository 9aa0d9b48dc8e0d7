//! Commit history for Strand.
//!
//! The remote answers a bounded history request with a vertex list and a
//! parent→child edge list. [`HistoryGraph`] rebuilds the commit graph from
//! them; the result does not depend on the order of either list.

pub mod error;
pub mod graph;
pub mod history;

pub use error::{DagError, DagResult};
pub use graph::HistoryGraph;
pub use history::{HistoryClient, HistoryQuery, HistoryReply};
