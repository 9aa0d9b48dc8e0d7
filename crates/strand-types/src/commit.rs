use serde::{Deserialize, Serialize};

/// Metadata attached to every commit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub author: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub message: String,
}

impl Task {
    pub fn new(author: impl Into<String>, timestamp: i64, message: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            timestamp,
            message: message.into(),
        }
    }
}

/// A node of the commit DAG. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit<H> {
    pub parents: Vec<H>,
    /// Root of the committed tree, absent for an empty tree.
    pub node: Option<H>,
    pub task: Task,
}

impl<H> Commit<H> {
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Hash;

    #[test]
    fn root_and_merge_commits() {
        let task = Task::new("alice", 1_700_000_000, "init");
        let root: Commit<Hash> = Commit { parents: vec![], node: None, task: task.clone() };
        assert!(root.is_root());
        assert!(!root.is_merge());

        let merge = Commit {
            parents: vec![Hash::from_raw([1; 32]), Hash::from_raw([2; 32])],
            node: Some(Hash::from_raw([3; 32])),
            task,
        };
        assert!(merge.is_merge());
    }
}
