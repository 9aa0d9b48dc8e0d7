use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::commit::Commit;

/// A bounded snapshot of the object graph.
///
/// Contents and tree nodes are carried in the remote store's own encoding and
/// are opaque here; commits are decoded so callers can inspect history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Slice<H> {
    #[serde(default = "Vec::new")]
    pub contents: Vec<(H, Value)>,
    #[serde(default = "Vec::new")]
    pub nodes: Vec<(H, Value)>,
    #[serde(default = "Vec::new")]
    pub commits: Vec<(H, Commit<H>)>,
}

impl<H> Slice<H> {
    pub fn empty() -> Self {
        Self {
            contents: Vec::new(),
            nodes: Vec::new(),
            commits: Vec::new(),
        }
    }

    /// Total number of objects in the slice.
    pub fn len(&self) -> usize {
        self.contents.len() + self.nodes.len() + self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn commit_hashes(&self) -> impl Iterator<Item = &H> {
        self.commits.iter().map(|(h, _)| h)
    }
}

impl<H> Default for Slice<H> {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Hash, Task};

    #[test]
    fn counts_every_object_kind() {
        let h = Hash::from_raw([1; 32]);
        let slice = Slice {
            contents: vec![(h, Value::from("x"))],
            nodes: vec![(h, serde_json::json!({"a": "b"}))],
            commits: vec![(
                h,
                Commit { parents: vec![], node: Some(h), task: Task::new("a", 0, "m") },
            )],
        };
        assert_eq!(slice.len(), 3);
        assert_eq!(slice.commit_hashes().count(), 1);
        assert!(Slice::<Hash>::empty().is_empty());
    }

    #[test]
    fn missing_sections_decode_as_empty() {
        let slice: Slice<Hash> = serde_json::from_str("{}").unwrap();
        assert!(slice.is_empty());
    }

    #[test]
    fn partial_slice_decodes() {
        let h = Hash::from_raw([4; 32]);
        let slice: Slice<Hash> =
            serde_json::from_value(serde_json::json!({"contents": [[h.to_hex(), 7]]})).unwrap();
        assert_eq!(slice.contents, vec![(h, Value::from(7))]);
        assert!(slice.nodes.is_empty());
        assert!(slice.commits.is_empty());
        let encoded = serde_json::to_value(&slice).unwrap();
        let back: Slice<Hash> = serde_json::from_value(encoded).unwrap();
        assert_eq!(back, slice);
    }
}
