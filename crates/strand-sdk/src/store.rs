//! The store handle.
//!
//! A [`Store`] is positioned on one branch of a remote store and owns
//! everything that tracks that position: the branch cell, the head lock, and
//! the watch hub. Only the transport is shared between handles; a handle
//! derived with [`Store::at_head`], [`Store::at_tag`] or a clone gets fresh
//! copies of the rest.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use strand_dag::HistoryClient;
use strand_merge::{LcaResolver, MergeEngine};
use strand_protocol::{endpoints, RemoteClient, Request, Transport};
use strand_refs::{BranchState, HeadController};
use strand_sync::SliceTransfer;
use strand_types::{Branch, HumanReadable, Schema, SearchBounds};
use strand_watch::WatchHub;
use tracing::info;

use crate::config::StoreConfig;
use crate::error::{SdkError, SdkResult};

pub type HashOf<S> = <S as Schema>::Hash;
pub type TagOf<S> = <S as Schema>::Tag;

/// Handle on one branch of a remote store.
pub struct Store<S: Schema> {
    pub(crate) client: RemoteClient,
    pub(crate) config: StoreConfig,
    pub(crate) state: Arc<BranchState<HashOf<S>, TagOf<S>>>,
    pub(crate) heads: HeadController<HashOf<S>, TagOf<S>>,
    pub(crate) merges: MergeEngine<HashOf<S>, TagOf<S>>,
    pub(crate) lcas: LcaResolver<HashOf<S>, TagOf<S>>,
    pub(crate) history: HistoryClient<HashOf<S>, TagOf<S>>,
    pub(crate) slices: SliceTransfer,
    pub(crate) watches: WatchHub<S::Key, S::Value>,
}

/// Result of [`Store::clone_tag`].
pub enum CloneOutcome<S: Schema> {
    /// The tag now points at this handle's head; the handle is on that tag.
    Ok(Store<S>),
    /// The tag already exists and was left alone.
    DuplicatedTag,
    /// This branch has no head to tag.
    EmptyHead,
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
enum CloneStatus {
    Ok,
    DuplicatedTag,
    EmptyHead,
}

impl<S: Schema> Store<S> {
    pub fn with_branch(
        transport: Arc<dyn Transport>,
        config: StoreConfig,
        branch: Branch<HashOf<S>, TagOf<S>>,
    ) -> Self {
        Self::from_client(RemoteClient::new(transport), config, branch)
    }

    /// A handle on the `master` tag.
    pub fn master(transport: Arc<dyn Transport>, config: StoreConfig) -> Self {
        Self::with_branch(transport, config, Branch::master())
    }

    pub fn of_tag(transport: Arc<dyn Transport>, config: StoreConfig, tag: TagOf<S>) -> Self {
        Self::with_branch(transport, config, Branch::Tag(tag))
    }

    pub fn of_head(transport: Arc<dyn Transport>, config: StoreConfig, head: HashOf<S>) -> Self {
        Self::with_branch(transport, config, Branch::Head(head))
    }

    pub fn empty(transport: Arc<dyn Transport>, config: StoreConfig) -> Self {
        Self::with_branch(transport, config, Branch::Empty)
    }

    fn from_client(
        client: RemoteClient,
        config: StoreConfig,
        branch: Branch<HashOf<S>, TagOf<S>>,
    ) -> Self {
        let state = Arc::new(BranchState::new(branch));
        Self {
            heads: HeadController::new(client.clone(), state.clone()),
            merges: MergeEngine::new(client.clone(), state.clone()),
            lcas: LcaResolver::new(client.clone(), state.clone()),
            history: HistoryClient::new(client.clone(), state.clone()),
            slices: SliceTransfer::new(client.clone()),
            watches: WatchHub::new(client.clone(), config.watch_failure_capacity),
            client,
            config,
            state,
        }
    }

    /// A new handle on the same remote, positioned on `branch`.
    pub fn derive(&self, branch: Branch<HashOf<S>, TagOf<S>>) -> Self {
        Self::from_client(self.client.clone(), self.config.clone(), branch)
    }

    /// A new handle detached at `head`.
    pub fn at_head(&self, head: HashOf<S>) -> Self {
        self.derive(Branch::Head(head))
    }

    /// A new handle on `tag`.
    pub fn at_tag(&self, tag: TagOf<S>) -> Self {
        self.derive(Branch::Tag(tag))
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub(crate) fn prefix(&self) -> SdkResult<Vec<String>> {
        Ok(self.state.path()?)
    }

    pub fn branch(&self) -> Branch<HashOf<S>, TagOf<S>> {
        self.state.get()
    }

    pub fn tag(&self) -> Option<TagOf<S>> {
        self.state.tag()
    }

    pub fn tag_exn(&self) -> SdkResult<TagOf<S>> {
        self.tag()
            .ok_or_else(|| SdkError::NotFound(format!("tag of {} branch", self.branch().kind())))
    }

    /// The branch's current head. Asks the remote when on a tag.
    pub async fn head(&self) -> SdkResult<Option<HashOf<S>>> {
        Ok(self.heads.head().await?)
    }

    pub async fn head_exn(&self) -> SdkResult<HashOf<S>> {
        self.head()
            .await?
            .ok_or_else(|| SdkError::NotFound(format!("head of {} branch", self.branch().kind())))
    }

    /// Heads of every branch in the store.
    pub async fn heads(&self) -> SdkResult<Vec<HashOf<S>>> {
        Ok(self.client.send(Request::get().segment(endpoints::HEADS)).await?)
    }

    /// Every tag in the store.
    pub async fn tags(&self) -> SdkResult<Vec<TagOf<S>>> {
        Ok(self.client.send(Request::get().segment(endpoints::TAGS)).await?)
    }

    /// Point `tag` at this branch's head and switch this handle onto it.
    pub async fn update_tag(&self, tag: TagOf<S>) -> SdkResult<()> {
        let request = Request::post()
            .at(&self.prefix()?)
            .segment(endpoints::UPDATE_TAG)
            .param(&tag);
        self.client.send_unit(request).await?;
        info!(tag = %tag.to_human(), "tag updated");
        self.state.set_tag(tag);
        Ok(())
    }

    pub async fn remove_tag(&self, tag: &TagOf<S>) -> SdkResult<()> {
        let request = Request::delete().segment(endpoints::REMOVE_TAG).param(tag);
        self.client.send_unit(request).await?;
        info!(tag = %tag.to_human(), "tag removed");
        Ok(())
    }

    pub async fn update_head(&self, head: HashOf<S>) -> SdkResult<()> {
        Ok(self.heads.update_head(head).await?)
    }

    pub async fn compare_and_set_head(
        &self,
        test: Option<HashOf<S>>,
        set: Option<HashOf<S>>,
    ) -> SdkResult<bool> {
        Ok(self.heads.compare_and_set_head(test, set).await?)
    }

    /// Fast-forward within the configured bounds.
    pub async fn fast_forward_head(&self, head: HashOf<S>) -> SdkResult<bool> {
        self.fast_forward_head_with(head, self.config.fast_forward_bounds).await
    }

    pub async fn fast_forward_head_with(
        &self,
        head: HashOf<S>,
        bounds: SearchBounds,
    ) -> SdkResult<bool> {
        Ok(self.heads.fast_forward_head(head, bounds).await?)
    }

    /// Create `tag` at this branch's head unless it already exists.
    ///
    /// An empty branch has no head, so this answers `EmptyHead` without
    /// asking the remote.
    pub async fn clone_tag(&self, tag: TagOf<S>) -> SdkResult<CloneOutcome<S>> {
        if self.branch().is_empty() {
            return Ok(CloneOutcome::EmptyHead);
        }
        let request = Request::post()
            .at(&self.prefix()?)
            .segment(endpoints::CLONE)
            .param(&tag);
        let status: CloneStatus = self.client.send(request).await?;
        Ok(match status {
            CloneStatus::Ok => {
                info!(tag = %tag.to_human(), "branch cloned");
                CloneOutcome::Ok(self.at_tag(tag))
            }
            CloneStatus::DuplicatedTag => CloneOutcome::DuplicatedTag,
            CloneStatus::EmptyHead => CloneOutcome::EmptyHead,
        })
    }

    /// Point `tag` at this branch's head, overwriting it if it exists.
    pub async fn clone_force(&self, tag: TagOf<S>) -> SdkResult<Store<S>> {
        let request = Request::post()
            .at(&self.prefix()?)
            .segment(endpoints::CLONE_FORCE)
            .param(&tag);
        self.client.send_unit(request).await?;
        info!(tag = %tag.to_human(), "branch force-cloned");
        Ok(self.at_tag(tag))
    }
}

impl<S: Schema> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("branch", &self.state.get())
            .field("watches", &self.watches)
            .finish_non_exhaustive()
    }
}

impl<S: Schema> fmt::Debug for CloneOutcome<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneOutcome::Ok(store) => f.debug_tuple("Ok").field(store).finish(),
            CloneOutcome::DuplicatedTag => f.write_str("DuplicatedTag"),
            CloneOutcome::EmptyHead => f.write_str("EmptyHead"),
        }
    }
}
