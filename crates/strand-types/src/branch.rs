use serde::{Deserialize, Serialize};

use crate::schema::StoreTag;

/// The current position of a store handle.
///
/// Exactly one variant is active at a time: a persistent named branch, a
/// commit the handle is detached at, or no commit at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Branch<H, T> {
    /// A persistent named branch; the remote tracks its head.
    Tag(T),
    /// Detached at a specific commit.
    Head(H),
    /// No commit yet.
    Empty,
}

impl<H, T> Branch<H, T> {
    pub fn tag(&self) -> Option<&T> {
        match self {
            Branch::Tag(t) => Some(t),
            _ => None,
        }
    }

    /// The detached head, if any. A `Tag` branch has no local head.
    pub fn head(&self) -> Option<&H> {
        match self {
            Branch::Head(h) => Some(h),
            _ => None,
        }
    }

    /// Returns `true` for a `Tag` branch.
    pub fn is_persistent(&self) -> bool {
        matches!(self, Branch::Tag(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Branch::Empty)
    }

    /// Short name of the active variant, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Branch::Tag(_) => "tag",
            Branch::Head(_) => "head",
            Branch::Empty => "empty",
        }
    }
}

impl<H, T: StoreTag> Branch<H, T> {
    /// The branch living at the store root.
    pub fn master() -> Self {
        Branch::Tag(T::master())
    }
}
