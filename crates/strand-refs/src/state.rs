//! The per-handle branch cell.
//!
//! [`BranchState`] holds the handle's current [`Branch`] behind a short
//! `RwLock` that is never held across an await. Every branch-relative request
//! is prefixed with [`BranchState::path`].

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use strand_protocol::endpoints;
use strand_types::encoding::encode_step;
use strand_types::{Branch, StoreHash, StoreTag};
use tracing::info;

use crate::error::{RefError, RefResult};

#[derive(Debug)]
pub struct BranchState<H, T> {
    branch: RwLock<Branch<H, T>>,
}

impl<H: StoreHash, T: StoreTag> BranchState<H, T> {
    pub fn new(branch: Branch<H, T>) -> Self {
        Self {
            branch: RwLock::new(branch),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Branch<H, T>> {
        self.branch.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Branch<H, T>> {
        self.branch.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// A snapshot of the current branch.
    pub fn get(&self) -> Branch<H, T> {
        self.read().clone()
    }

    pub fn tag(&self) -> Option<T> {
        self.read().tag().cloned()
    }

    /// The locally tracked head: `Some` only for a detached branch.
    pub fn local_head(&self) -> Option<H> {
        self.read().head().cloned()
    }

    /// Request path prefix for the current branch.
    ///
    /// `master` lives at the store root; any other tag or a detached head is
    /// addressed as `tree/<name>`. An empty branch has no address.
    pub fn path(&self) -> RefResult<Vec<String>> {
        match &*self.read() {
            Branch::Tag(t) if t.is_master() => Ok(Vec::new()),
            Branch::Tag(t) => Ok(vec![endpoints::TREE.to_string(), encode_step(&t.to_human())]),
            Branch::Head(h) => Ok(vec![endpoints::TREE.to_string(), encode_step(&h.to_human())]),
            Branch::Empty => Err(RefError::Unsupported {
                operation: "path resolution",
                branch: "empty",
            }),
        }
    }

    /// Switch to a persistent branch.
    pub fn set_tag(&self, tag: T) {
        info!(tag = %tag.to_human(), "branch switched to tag");
        *self.write() = Branch::Tag(tag);
    }

    /// Detach at `head`, or become empty for `None`.
    pub fn set_head(&self, head: Option<H>) {
        let next = match head {
            Some(h) => {
                info!(head = %h.to_human(), "branch detached");
                Branch::Head(h)
            }
            None => {
                info!("branch emptied");
                Branch::Empty
            }
        };
        *self.write() = next;
    }

    /// Record a commit the remote created on this branch.
    ///
    /// A detached or empty branch moves to `new`; a tag is left alone since
    /// the remote already advanced it. Returns `true` if the local pointer
    /// moved.
    pub fn apply_commit(&self, new: H) -> bool {
        let mut branch = self.write();
        match &*branch {
            Branch::Tag(_) => false,
            Branch::Head(_) | Branch::Empty => {
                *branch = Branch::Head(new);
                true
            }
        }
    }

    /// Local compare-and-set of a detached or empty branch.
    ///
    /// Succeeds when the local head equals `test` (`None` matching an empty
    /// branch) and then installs `set`. Always fails on a tag.
    pub fn compare_and_set_local(&self, test: Option<&H>, set: Option<H>) -> bool {
        let mut branch = self.write();
        let current = match &*branch {
            Branch::Tag(_) => return false,
            Branch::Head(h) => Some(h),
            Branch::Empty => None,
        };
        if current != test {
            return false;
        }
        *branch = match set {
            Some(h) => Branch::Head(h),
            None => Branch::Empty,
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strand_types::{Hash, TagName};

    type State = BranchState<Hash, TagName>;

    fn h(b: u8) -> Hash {
        Hash::from_raw([b; 32])
    }

    fn tag(name: &str) -> TagName {
        TagName::new(name).unwrap()
    }

    #[test]
    fn master_resolves_to_root() {
        let state = State::new(Branch::master());
        assert_eq!(state.path().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn other_tags_and_heads_resolve_under_tree() {
        let state = State::new(Branch::Tag(tag("feature/x")));
        assert_eq!(state.path().unwrap(), vec!["tree", "feature%2Fx"]);

        state.set_head(Some(h(0xAB)));
        assert_eq!(state.path().unwrap(), vec!["tree".to_string(), h(0xAB).to_hex()]);
    }

    #[test]
    fn empty_branch_has_no_path() {
        let state = State::new(Branch::Empty);
        assert_eq!(
            state.path(),
            Err(RefError::Unsupported {
                operation: "path resolution",
                branch: "empty"
            })
        );
    }

    #[test]
    fn commits_move_detached_and_empty_branches_only() {
        let tagged = State::new(Branch::Tag(tag("dev")));
        assert!(!tagged.apply_commit(h(1)));
        assert_eq!(tagged.get(), Branch::Tag(tag("dev")));

        let detached = State::new(Branch::Head(h(1)));
        assert!(detached.apply_commit(h(2)));
        assert_eq!(detached.local_head(), Some(h(2)));

        let empty = State::new(Branch::Empty);
        assert!(empty.apply_commit(h(3)));
        assert_eq!(empty.get(), Branch::Head(h(3)));
    }

    #[test]
    fn set_head_none_empties() {
        let state = State::new(Branch::Head(h(1)));
        state.set_head(None);
        assert!(state.get().is_empty());
        assert_eq!(state.tag(), None);
    }

    #[test]
    fn local_compare_and_set() {
        let state = State::new(Branch::Head(h(1)));
        assert!(state.compare_and_set_local(Some(&h(1)), Some(h(2))));
        assert!(!state.compare_and_set_local(Some(&h(1)), Some(h(2))));
        assert_eq!(state.local_head(), Some(h(2)));

        assert!(state.compare_and_set_local(Some(&h(2)), None));
        assert!(state.get().is_empty());
        assert!(state.compare_and_set_local(None, Some(h(5))));
        assert_eq!(state.local_head(), Some(h(5)));
    }

    #[test]
    fn local_compare_and_set_never_touches_a_tag() {
        let state = State::new(Branch::master());
        assert!(!state.compare_and_set_local(None, Some(h(1))));
        assert_eq!(state.get(), Branch::master());
    }
}
