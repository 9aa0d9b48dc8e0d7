/// Path segments of the remote store's operations.
pub mod endpoints {
    pub const TREE: &str = "tree";

    pub const READ: &str = "read";
    pub const MEM: &str = "mem";
    pub const LIST: &str = "list";
    pub const ITER: &str = "iter";
    pub const UPDATE: &str = "update";
    pub const REMOVE: &str = "remove";
    pub const REMOVE_REC: &str = "remove-rec";
    pub const COMPARE_AND_SET: &str = "compare-and-set";

    pub const HEAD: &str = "head";
    pub const HEADS: &str = "heads";
    pub const TAGS: &str = "tags";
    pub const UPDATE_TAG: &str = "update-tag";
    pub const REMOVE_TAG: &str = "remove-tag";
    pub const UPDATE_HEAD: &str = "update-head";
    pub const COMPARE_AND_SET_HEAD: &str = "compare-and-set-head";
    pub const FAST_FORWARD_HEAD: &str = "fast-forward-head";

    pub const MERGE_HEAD: &str = "merge-head";
    pub const MERGE_TAG: &str = "merge-tag";
    pub const LCAS_HEAD: &str = "lcas-head";
    pub const LCAS_TAG: &str = "lcas-tag";

    pub const CLONE: &str = "clone";
    pub const CLONE_FORCE: &str = "clone-force";

    pub const EXPORT: &str = "export";
    pub const IMPORT: &str = "import";
    pub const HISTORY: &str = "history";

    pub const WATCH_KEY: &str = "watch-key";
    pub const WATCH: &str = "watch";

    /// Query parameter carrying a depth bound.
    pub const DEPTH: &str = "depth";
    /// Query parameter carrying a candidate-count bound.
    pub const LIMIT: &str = "n";
    /// Query parameter asking an export to dereference every object.
    pub const FULL: &str = "full";
}
