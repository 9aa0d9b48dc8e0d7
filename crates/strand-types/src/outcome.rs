use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a merge could not be completed automatically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conflict {
    pub message: String,
}

impl Conflict {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "merge conflict: {}", self.message)
    }
}

impl std::error::Error for Conflict {}

/// Wire form of a merge result: `{"ok": <hash>}` or `{"conflict": "<msg>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeReply<H> {
    Ok(H),
    Conflict(Conflict),
}

impl<H> MergeReply<H> {
    pub fn into_result(self) -> Result<H, Conflict> {
        match self {
            MergeReply::Ok(h) => Ok(h),
            MergeReply::Conflict(c) => Err(c),
        }
    }
}

/// Result of a bounded lowest-common-ancestor search.
///
/// An exhausted bound is reported as its own variant and never as a partial
/// `Ok`, so `Ok(vec![])` always means "no common ancestor".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LcaOutcome<H> {
    Ok(Vec<H>),
    MaxDepthReached,
    TooManyLcas,
}

impl<H> LcaOutcome<H> {
    /// The ancestors, if the search completed.
    pub fn ancestors(&self) -> Option<&[H]> {
        match self {
            LcaOutcome::Ok(hs) => Some(hs),
            _ => None,
        }
    }

    /// Returns `true` if a bound was hit before the search completed.
    pub fn is_exhausted(&self) -> bool {
        !matches!(self, LcaOutcome::Ok(_))
    }
}
