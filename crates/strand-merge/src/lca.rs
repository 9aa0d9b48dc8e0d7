use std::sync::Arc;

use strand_protocol::{endpoints, RemoteClient, Request};
use strand_refs::BranchState;
use strand_types::{Branch, LcaOutcome, SearchBounds, StoreHash, StoreTag};
use tracing::debug;

use crate::error::MergeResult;

/// Bounded lowest-common-ancestor search between the handle's branch and
/// another head or tag.
pub struct LcaResolver<H, T> {
    client: RemoteClient,
    state: Arc<BranchState<H, T>>,
}

impl<H: StoreHash, T: StoreTag> LcaResolver<H, T> {
    pub fn new(client: RemoteClient, state: Arc<BranchState<H, T>>) -> Self {
        Self { client, state }
    }

    async fn search(&self, request: Request) -> MergeResult<LcaOutcome<H>> {
        let outcome: LcaOutcome<H> = self.client.send(request).await?;
        if outcome.is_exhausted() {
            debug!(?outcome, "common-ancestor search hit its bound");
        }
        Ok(outcome)
    }

    pub async fn lcas_head(&self, other: &H, bounds: SearchBounds) -> MergeResult<LcaOutcome<H>> {
        let request = Request::get()
            .at(&self.state.path()?)
            .segment(endpoints::LCAS_HEAD)
            .param(other)
            .bounds(&bounds);
        self.search(request).await
    }

    pub async fn lcas_tag(&self, other: &T, bounds: SearchBounds) -> MergeResult<LcaOutcome<H>> {
        let request = Request::get()
            .at(&self.state.path()?)
            .segment(endpoints::LCAS_TAG)
            .param(other)
            .bounds(&bounds);
        self.search(request).await
    }

    /// Common ancestors with `other`. An empty branch shares nothing, so the
    /// answer is `Ok([])` without a request.
    pub async fn lcas_branch(
        &self,
        other: &Branch<H, T>,
        bounds: SearchBounds,
    ) -> MergeResult<LcaOutcome<H>> {
        match other {
            Branch::Tag(t) => self.lcas_tag(t, bounds).await,
            Branch::Head(h) => self.lcas_head(h, bounds).await,
            Branch::Empty => Ok(LcaOutcome::Ok(Vec::new())),
        }
    }
}
