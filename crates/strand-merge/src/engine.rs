use std::sync::Arc;

use strand_protocol::{endpoints, RemoteClient, Request};
use strand_refs::BranchState;
use strand_types::{Branch, Conflict, MergeReply, SearchBounds, StoreHash, StoreTag};
use tracing::{info, warn};

use crate::error::MergeResult;

/// Merges other heads and tags into the handle's branch.
///
/// A successful merge on a detached or empty branch moves the local head to
/// the merge commit; on a tag the remote has already advanced it.
pub struct MergeEngine<H, T> {
    client: RemoteClient,
    state: Arc<BranchState<H, T>>,
}

impl<H: StoreHash, T: StoreTag> MergeEngine<H, T> {
    pub fn new(client: RemoteClient, state: Arc<BranchState<H, T>>) -> Self {
        Self { client, state }
    }

    async fn merge(&self, request: Request) -> MergeResult<Result<H, Conflict>> {
        let reply: MergeReply<H> = self.client.send(request).await?;
        let outcome = reply.into_result();
        match &outcome {
            Ok(h) => {
                if self.state.apply_commit(h.clone()) {
                    info!(head = %h.to_human(), "merge moved local head");
                }
            }
            Err(conflict) => warn!(%conflict, "merge reported a conflict"),
        }
        Ok(outcome)
    }

    /// Merge the commit `other` into this branch.
    pub async fn merge_head(
        &self,
        other: &H,
        bounds: SearchBounds,
    ) -> MergeResult<Result<H, Conflict>> {
        let request = Request::post()
            .at(&self.state.path()?)
            .segment(endpoints::MERGE_HEAD)
            .param(other)
            .bounds(&bounds);
        self.merge(request).await
    }

    /// Merge the current head of tag `other` into this branch.
    pub async fn merge_tag(
        &self,
        other: &T,
        bounds: SearchBounds,
    ) -> MergeResult<Result<H, Conflict>> {
        let request = Request::post()
            .at(&self.state.path()?)
            .segment(endpoints::MERGE_TAG)
            .param(other)
            .bounds(&bounds);
        self.merge(request).await
    }

    pub async fn merge_head_exn(&self, other: &H, bounds: SearchBounds) -> MergeResult<H> {
        Ok(self.merge_head(other, bounds).await??)
    }

    pub async fn merge_tag_exn(&self, other: &T, bounds: SearchBounds) -> MergeResult<H> {
        Ok(self.merge_tag(other, bounds).await??)
    }

    /// Merge whatever `source` points at. An empty source has nothing to
    /// merge and succeeds with `None` without contacting the remote.
    pub async fn merge_branch(
        &self,
        source: &Branch<H, T>,
        bounds: SearchBounds,
    ) -> MergeResult<Result<Option<H>, Conflict>> {
        let outcome = match source {
            Branch::Tag(t) => self.merge_tag(t, bounds).await?,
            Branch::Head(h) => self.merge_head(h, bounds).await?,
            Branch::Empty => return Ok(Ok(None)),
        };
        Ok(outcome.map(Some))
    }

    pub async fn merge_branch_exn(
        &self,
        source: &Branch<H, T>,
        bounds: SearchBounds,
    ) -> MergeResult<Option<H>> {
        Ok(self.merge_branch(source, bounds).await??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MergeError;
    use serde_json::json;
    use strand_protocol::{Method, ScriptedTransport};
    use strand_types::{Hash, TagName};

    fn h(b: u8) -> Hash {
        Hash::from_raw([b; 32])
    }

    type Fixture = (
        Arc<ScriptedTransport>,
        MergeEngine<Hash, TagName>,
        Arc<BranchState<Hash, TagName>>,
    );

    fn engine(branch: Branch<Hash, TagName>) -> Fixture {
        let transport = Arc::new(ScriptedTransport::new());
        let state = Arc::new(BranchState::new(branch));
        let engine = MergeEngine::new(RemoteClient::new(transport.clone()), state.clone());
        (transport, engine, state)
    }

    #[tokio::test]
    async fn merge_head_moves_detached_branch() {
        let (transport, engine, state) = engine(Branch::Head(h(1)));
        let path = format!("tree/{}/merge-head/{}", h(1).to_hex(), h(2).to_hex());
        transport.reply_ok(Method::Post, &path, json!({"ok": h(3).to_hex()}));

        let merged = engine
            .merge_head(&h(2), SearchBounds::unbounded().with_depth(5))
            .await
            .unwrap();
        assert_eq!(merged, Ok(h(3)));
        assert_eq!(state.local_head(), Some(h(3)));
        assert_eq!(transport.calls_to(&path)[0].query_value("depth"), Some("5"));
    }

    #[tokio::test]
    async fn merge_tag_keeps_tag_identity() {
        let (transport, engine, state) = engine(Branch::master());
        transport.reply_ok(Method::Post, "merge-tag/dev", json!({"ok": h(4).to_hex()}));

        let dev = TagName::new("dev").unwrap();
        assert_eq!(engine.merge_tag(&dev, SearchBounds::default()).await.unwrap(), Ok(h(4)));
        assert_eq!(state.get(), Branch::master());
    }

    #[tokio::test]
    async fn conflict_is_a_value_and_leaves_head() {
        let (transport, engine, state) = engine(Branch::Head(h(1)));
        let path = format!("tree/{}/merge-head/{}", h(1).to_hex(), h(2).to_hex());
        transport.reply_ok(Method::Post, &path, json!({"conflict": "k: both sides changed"}));

        let merged = engine.merge_head(&h(2), SearchBounds::default()).await.unwrap();
        assert_eq!(merged, Err(Conflict::new("k: both sides changed")));
        assert_eq!(state.local_head(), Some(h(1)));
    }

    #[tokio::test]
    async fn exn_variant_raises_conflict() {
        let (transport, engine, _state) = engine(Branch::master());
        transport.reply_ok(Method::Post, "merge-tag/dev", json!({"conflict": "x"}));
        let err = engine
            .merge_tag_exn(&TagName::new("dev").unwrap(), SearchBounds::default())
            .await
            .unwrap_err();
        assert_eq!(err, MergeError::Conflict(Conflict::new("x")));
    }

    #[tokio::test]
    async fn merge_branch_dispatches_on_source() {
        let (transport, engine, _state) = engine(Branch::master());
        transport.reply_ok(
            Method::Post,
            &format!("merge-head/{}", h(7).to_hex()),
            json!({"ok": h(8).to_hex()}),
        );

        let merged = engine
            .merge_branch(&Branch::Head(h(7)), SearchBounds::default())
            .await
            .unwrap();
        assert_eq!(merged, Ok(Some(h(8))));

        let nothing = engine
            .merge_branch_exn(&Branch::Empty, SearchBounds::default())
            .await
            .unwrap();
        assert_eq!(nothing, None);
        assert_eq!(transport.call_count(), 1);
    }

    #[tokio::test]
    async fn merging_into_empty_branch_is_unsupported() {
        let (transport, engine, _state) = engine(Branch::Empty);
        let err = engine.merge_head(&h(1), SearchBounds::default()).await.unwrap_err();
        assert!(matches!(err, MergeError::Ref(_)));
        assert_eq!(transport.call_count(), 0);
    }
}
