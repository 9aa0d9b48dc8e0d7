use serde::{Deserialize, Serialize};

/// Limits on a remote graph walk.
///
/// `max_depth` caps how many commits the walk may descend; `limit` caps how
/// many ancestor candidates it may scan. `None` leaves the bound to the remote.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchBounds {
    pub max_depth: Option<u32>,
    pub limit: Option<u32>,
}

impl SearchBounds {
    pub const fn unbounded() -> Self {
        Self { max_depth: None, limit: None }
    }

    pub const fn with_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn is_unbounded(&self) -> bool {
        self.max_depth.is_none() && self.limit.is_none()
    }
}
