//! Branch tracking for Strand.
//!
//! A store handle is always positioned on exactly one [`Branch`]: a
//! persistent tag whose head the remote tracks, a detached head tracked
//! locally, or nothing at all. This crate owns that position and the
//! operations that move it.
//!
//! # Modules
//!
//! - [`error`]: Error types for branch operations
//! - [`state`]: [`BranchState`], the per-handle branch cell and its path prefix
//! - [`controller`]: [`HeadController`], compare-and-set, fast-forward and
//!   head updates serialized by one per-handle lock
//!
//! [`Branch`]: strand_types::Branch

pub mod controller;
pub mod error;
pub mod state;

pub use controller::HeadController;
pub use error::{RefError, RefResult};
pub use state::BranchState;
