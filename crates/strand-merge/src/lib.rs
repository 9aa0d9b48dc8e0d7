//! Merge and common-ancestor resolution for Strand.
//!
//! Merges are performed by the remote into the handle's own branch. A
//! conflict is an ordinary result; only the `_exn` variants turn it into an
//! error. Common-ancestor searches are bounded, and a search that hits its
//! bound reports which bound it hit instead of a partial answer.

pub mod engine;
pub mod error;
pub mod lca;

pub use engine::MergeEngine;
pub use error::{MergeError, MergeResult};
pub use lca::LcaResolver;
