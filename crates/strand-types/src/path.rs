use std::fmt;

use serde::{Deserialize, Serialize};

use crate::encoding::{decode_step, encode_step};
use crate::error::TypeError;
use crate::schema::{HumanReadable, StoreKey};

/// An ordered sequence of steps addressing a position in the content tree.
///
/// The human-readable form percent-encodes every step and joins them with
/// `/`; the empty path is the tree root and encodes to `""`. On the wire a
/// `Path` is a JSON array of its (unencoded) steps.
///
/// Empty steps have no human-readable form, so every constructor drops them:
/// `["a", ""]` and `["a"]` are the same path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Path(Vec<String>);

impl Path {
    pub fn new<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            steps
                .into_iter()
                .map(Into::into)
                .filter(|step: &String| !step.is_empty())
                .collect(),
        )
    }

    /// The empty path.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn steps(&self) -> &[String] {
        &self.0
    }

    /// A new path with `step` appended.
    pub fn child(&self, step: impl Into<String>) -> Self {
        let mut steps = self.0.clone();
        let step = step.into();
        if !step.is_empty() {
            steps.push(step);
        }
        Self(steps)
    }

    /// The path without its last step, or `None` at the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Returns `true` if `self` is `other` or lies underneath it.
    pub fn starts_with(&self, other: &Path) -> bool {
        self.0.starts_with(&other.0)
    }
}

impl From<Vec<String>> for Path {
    fn from(steps: Vec<String>) -> Self {
        Self::new(steps)
    }
}

impl From<Path> for Vec<String> {
    fn from(path: Path) -> Self {
        path.0
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.to_human())
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl HumanReadable for Path {
    fn to_human(&self) -> String {
        self.0
            .iter()
            .map(|step| encode_step(step))
            .collect::<Vec<_>>()
            .join("/")
    }

    fn from_human(s: &str) -> Result<Self, TypeError> {
        s.split('/')
            .filter(|step| !step.is_empty())
            .map(decode_step)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl StoreKey for Path {}
