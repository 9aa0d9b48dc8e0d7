//! Serialized head updates.
//!
//! [`HeadController`] implements compare-and-set, fast-forward and head
//! update for one handle. On a tag the remote owns the head and each
//! operation is one request; on a detached or empty branch the head is local
//! and compare-and-set never touches the network. All operations take the
//! handle's head lock, so two of them never interleave on one handle.

use std::sync::Arc;

use strand_protocol::{endpoints, RemoteClient, Request};
use strand_types::{Branch, SearchBounds, StoreHash, StoreTag};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::RefResult;
use crate::state::BranchState;

pub struct HeadController<H, T> {
    client: RemoteClient,
    state: Arc<BranchState<H, T>>,
    lock: Mutex<()>,
}

impl<H: StoreHash, T: StoreTag> HeadController<H, T> {
    pub fn new(client: RemoteClient, state: Arc<BranchState<H, T>>) -> Self {
        Self {
            client,
            state,
            lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> &Arc<BranchState<H, T>> {
        &self.state
    }

    /// The current head: fetched from the remote for a tag, local otherwise.
    pub async fn head(&self) -> RefResult<Option<H>> {
        let _guard = self.lock.lock().await;
        match self.state.get() {
            Branch::Tag(_) => {
                let request = Request::get().at(&self.state.path()?).segment(endpoints::HEAD);
                Ok(self.client.send(request).await?)
            }
            Branch::Head(h) => Ok(Some(h)),
            Branch::Empty => Ok(None),
        }
    }

    /// Replace the head if it currently equals `test`.
    ///
    /// `None` stands for "no head" on both sides. On a tag this is a single
    /// remote call; otherwise the comparison is made against the local
    /// pointer and `set = None` empties the branch.
    pub async fn compare_and_set_head(&self, test: Option<H>, set: Option<H>) -> RefResult<bool> {
        let _guard = self.lock.lock().await;
        let swapped = match self.state.get() {
            Branch::Tag(_) => {
                let request = Request::post()
                    .at(&self.state.path()?)
                    .segment(endpoints::COMPARE_AND_SET_HEAD)
                    .json_body(&(&test, &set))?;
                self.client.send::<bool>(request).await?
            }
            Branch::Head(_) | Branch::Empty => self.state.compare_and_set_local(test.as_ref(), set),
        };
        if !swapped {
            warn!(
                expected = ?test.as_ref().map(|h| h.to_human()),
                "head compare-and-set mismatch"
            );
        }
        Ok(swapped)
    }

    /// Move the head to `new` if it descends from the current head within
    /// `bounds`. Returns `false` when the remote refuses.
    pub async fn fast_forward_head(&self, new: H, bounds: SearchBounds) -> RefResult<bool> {
        let _guard = self.lock.lock().await;
        let request = Request::post()
            .at(&self.state.path()?)
            .segment(endpoints::FAST_FORWARD_HEAD)
            .param(&new)
            .bounds(&bounds);
        let moved = self.client.send::<bool>(request).await?;
        if moved {
            self.state.apply_commit(new);
        } else {
            debug!(head = %new.to_human(), "fast-forward refused");
        }
        Ok(moved)
    }

    /// Point the branch at `head` unconditionally.
    pub async fn update_head(&self, head: H) -> RefResult<()> {
        let _guard = self.lock.lock().await;
        match self.state.get() {
            Branch::Tag(_) => {
                let request = Request::post()
                    .at(&self.state.path()?)
                    .segment(endpoints::UPDATE_HEAD)
                    .param(&head);
                self.client.send_unit(request).await?;
            }
            Branch::Head(_) | Branch::Empty => self.state.set_head(Some(head)),
        }
        Ok(())
    }
}
