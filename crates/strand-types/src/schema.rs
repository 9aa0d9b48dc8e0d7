//! Capability traits for the types a store is parameterized over.
//!
//! A store is generic over four types: the key addressing a position in the
//! content tree, the value stored there, the hash identifying objects, and the
//! tag naming persistent branches. Each gets the smallest interface the client
//! needs from it, and [`Schema`] bundles the four so handles carry a single
//! type parameter.

use std::fmt::Debug;
use std::hash::Hash as StdHash;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::TypeError;
use crate::hash::Hash;
use crate::path::Path;
use crate::tag::TagName;

/// Canonical human-readable encoding, used wherever a value appears in a
/// request path.
pub trait HumanReadable: Sized {
    fn to_human(&self) -> String;
    fn from_human(s: &str) -> Result<Self, TypeError>;
}

/// A content-addressed identifier.
pub trait StoreHash:
    HumanReadable
    + Clone
    + Eq
    + Ord
    + StdHash
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

/// A persistent branch name.
pub trait StoreTag:
    HumanReadable + Clone + Eq + Ord + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// The distinguished tag whose branch lives at the store root.
    fn master() -> Self;

    fn is_master(&self) -> bool {
        *self == Self::master()
    }
}

/// A key addressing a position in the content tree.
pub trait StoreKey:
    HumanReadable
    + Clone
    + Eq
    + Ord
    + StdHash
    + Debug
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
}

/// Any JSON-codec value can be stored.
pub trait StoreValue: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> StoreValue for T where
    T: Clone + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// The key, value, hash, and tag types of one store.
pub trait Schema: Send + Sync + 'static {
    type Key: StoreKey;
    type Value: StoreValue;
    type Hash: StoreHash;
    type Tag: StoreTag;
}

/// Path keys, JSON values, 32-byte hashes, and validated string tags.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultSchema;

impl Schema for DefaultSchema {
    type Key = Path;
    type Value = serde_json::Value;
    type Hash = Hash;
    type Tag = TagName;
}
