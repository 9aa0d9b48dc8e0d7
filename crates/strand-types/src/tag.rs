//! Tag names and their validation.
//!
//! Valid tag names:
//! - Must be non-empty
//! - Must not contain whitespace, control characters, `~`, `^`, `:`, `?`,
//!   `*`, `[`, `\`
//! - Must not contain `..` or `@{`
//! - Must not start with `-` or `.`, nor end with `.`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::TypeError;
use crate::schema::{HumanReadable, StoreTag};

const FORBIDDEN_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

/// Validate a tag name, returning `Ok(())` if valid.
///
/// ```
/// use strand_types::validate_tag_name;
///
/// assert!(validate_tag_name("master").is_ok());
/// assert!(validate_tag_name("release/1.0").is_ok());
/// assert!(validate_tag_name("").is_err());
/// assert!(validate_tag_name("bad..name").is_err());
/// ```
pub fn validate_tag_name(name: &str) -> Result<(), TypeError> {
    let invalid = |reason: String| TypeError::InvalidTagName {
        name: name.to_string(),
        reason,
    };

    if name.is_empty() {
        return Err(invalid("tag name must not be empty".into()));
    }
    if let Some(ch) = name.chars().find(|c| c.is_whitespace() || c.is_control()) {
        return Err(invalid(format!("contains whitespace or control character: {ch:?}")));
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
        return Err(invalid(format!("contains forbidden character: {ch:?}")));
    }
    if name.contains("..") {
        return Err(invalid("must not contain '..'".into()));
    }
    if name.contains("@{") {
        return Err(invalid("must not contain '@{'".into()));
    }
    if name.starts_with('-') || name.starts_with('.') {
        return Err(invalid("must not start with '-' or '.'".into()));
    }
    if name.ends_with('.') {
        return Err(invalid("must not end with '.'".into()));
    }
    Ok(())
}

/// A validated, human-readable branch name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TagName(String);

impl TagName {
    /// Name of the branch stored at the root of the remote store.
    pub const MASTER: &'static str = "master";

    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        validate_tag_name(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TagName {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl<'de> Deserialize<'de> for TagName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl HumanReadable for TagName {
    fn to_human(&self) -> String {
        self.0.clone()
    }

    fn from_human(s: &str) -> Result<Self, TypeError> {
        Self::new(s)
    }
}

impl StoreTag for TagName {
    fn master() -> Self {
        Self(Self::MASTER.to_string())
    }
}
