//! Merges, common ancestors, history and slice transfer.

use strand_dag::{HistoryGraph, HistoryQuery};
use strand_sync::ExportQuery;
use strand_types::{Conflict, LcaOutcome, Schema, SearchBounds, Slice};

use crate::error::SdkResult;
use crate::store::{HashOf, Store, TagOf};

impl<S: Schema> Store<S> {
    pub async fn merge_head(
        &self,
        other: &HashOf<S>,
        bounds: SearchBounds,
    ) -> SdkResult<Result<HashOf<S>, Conflict>> {
        Ok(self.merges.merge_head(other, bounds).await?)
    }

    pub async fn merge_head_exn(
        &self,
        other: &HashOf<S>,
        bounds: SearchBounds,
    ) -> SdkResult<HashOf<S>> {
        Ok(self.merges.merge_head_exn(other, bounds).await?)
    }

    pub async fn merge_tag(
        &self,
        other: &TagOf<S>,
        bounds: SearchBounds,
    ) -> SdkResult<Result<HashOf<S>, Conflict>> {
        Ok(self.merges.merge_tag(other, bounds).await?)
    }

    pub async fn merge_tag_exn(
        &self,
        other: &TagOf<S>,
        bounds: SearchBounds,
    ) -> SdkResult<HashOf<S>> {
        Ok(self.merges.merge_tag_exn(other, bounds).await?)
    }

    /// Merge the branch `other` is on into this one, within the configured
    /// merge bounds. Merging from an empty branch is a no-op and yields
    /// `Ok(None)`.
    pub async fn merge(&self, other: &Store<S>) -> SdkResult<Result<Option<HashOf<S>>, Conflict>> {
        Ok(self
            .merges
            .merge_branch(&other.branch(), self.config.merge_bounds)
            .await?)
    }

    pub async fn merge_exn(&self, other: &Store<S>) -> SdkResult<Option<HashOf<S>>> {
        Ok(self
            .merges
            .merge_branch_exn(&other.branch(), self.config.merge_bounds)
            .await?)
    }

    pub async fn lcas_head(
        &self,
        other: &HashOf<S>,
        bounds: SearchBounds,
    ) -> SdkResult<LcaOutcome<HashOf<S>>> {
        Ok(self.lcas.lcas_head(other, bounds).await?)
    }

    pub async fn lcas_tag(
        &self,
        other: &TagOf<S>,
        bounds: SearchBounds,
    ) -> SdkResult<LcaOutcome<HashOf<S>>> {
        Ok(self.lcas.lcas_tag(other, bounds).await?)
    }

    /// Common ancestors with the branch `other` is on, within the
    /// configured LCA bounds.
    pub async fn lcas(&self, other: &Store<S>) -> SdkResult<LcaOutcome<HashOf<S>>> {
        Ok(self
            .lcas
            .lcas_branch(&other.branch(), self.config.lca_bounds)
            .await?)
    }

    pub async fn history(
        &self,
        query: &HistoryQuery<HashOf<S>>,
    ) -> SdkResult<HistoryGraph<HashOf<S>>> {
        Ok(self.history.history(query).await?)
    }

    pub async fn export(&self, query: &ExportQuery<HashOf<S>>) -> SdkResult<Slice<HashOf<S>>> {
        Ok(self.slices.export(query).await?)
    }

    pub async fn import(&self, slice: &Slice<HashOf<S>>) -> SdkResult<()> {
        Ok(self.slices.import(slice).await?)
    }

    /// Copy the slice selected by `query` from this store into `target`.
    /// Returns the number of objects sent.
    pub async fn transfer_to(
        &self,
        target: &Store<S>,
        query: &ExportQuery<HashOf<S>>,
    ) -> SdkResult<usize> {
        Ok(strand_sync::transfer(&self.slices, &target.slices, query).await?)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use strand_protocol::{Method, ScriptedTransport};
    use strand_sync::SyncError;
    use strand_types::{Branch, DefaultSchema};

    use super::*;
    use crate::config::StoreConfig;
    use crate::error::{ErrorKind, SdkError};
    use crate::testing::{h, master, tag};

    #[tokio::test]
    async fn merge_head_moves_detached_handle() {
        let (transport, store) = master();
        let detached = store.at_head(h(1));
        let path = format!("tree/{}/merge-head/{}", h(1).to_hex(), h(2).to_hex());
        transport.reply_ok(Method::Post, &path, json!({"ok": h(3).to_hex()}));

        let merged = detached.merge_head(&h(2), SearchBounds::default()).await.unwrap();
        assert_eq!(merged, Ok(h(3)));
        assert_eq!(detached.branch(), Branch::Head(h(3)));
    }

    #[tokio::test]
    async fn conflicts_are_values_until_escalated() {
        let (transport, store) = master();
        transport.reply_ok(Method::Post, "merge-tag/dev", json!({"conflict": "a changed twice"}));
        transport.reply_ok(Method::Post, "merge-tag/dev", json!({"conflict": "a changed twice"}));

        let merged = store.merge_tag(&tag("dev"), SearchBounds::default()).await.unwrap();
        assert_eq!(merged, Err(Conflict::new("a changed twice")));

        let err = store.merge_tag_exn(&tag("dev"), SearchBounds::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(store.branch(), Branch::master());
    }

    #[tokio::test]
    async fn merge_exn_passes_through_success() {
        let (transport, store) = master();
        let path = format!("merge-head/{}", h(4).to_hex());
        transport.reply_ok(Method::Post, &path, json!({"ok": h(5).to_hex()}));
        assert_eq!(store.merge_head_exn(&h(4), SearchBounds::default()).await.unwrap(), h(5));
    }

    #[tokio::test]
    async fn merge_other_handle_uses_configured_bounds() {
        let transport = Arc::new(ScriptedTransport::new());
        let config = StoreConfig {
            merge_bounds: SearchBounds::unbounded().with_depth(16),
            ..StoreConfig::default()
        };
        let store = Store::<DefaultSchema>::master(transport.clone(), config);
        let dev = store.at_tag(tag("dev"));
        transport.reply_ok(Method::Post, "merge-tag/dev", json!({"ok": h(6).to_hex()}));

        assert_eq!(store.merge(&dev).await.unwrap(), Ok(Some(h(6))));
        assert_eq!(transport.calls_to("merge-tag/dev")[0].query_value("depth"), Some("16"));
    }

    #[tokio::test]
    async fn merging_into_a_tag_keeps_the_tag() {
        let (transport, store) = master();
        let dev = store.at_tag(tag("dev"));
        let other = store.at_head(h(8));
        let path = format!("tree/dev/merge-head/{}", h(8).to_hex());
        transport.reply_ok(Method::Post, &path, json!({"ok": h(9).to_hex()}));
        transport.reply_ok(Method::Get, "tree/dev/head", json!(h(9).to_hex()));

        assert_eq!(dev.merge(&other).await.unwrap(), Ok(Some(h(9))));
        assert_eq!(dev.branch(), Branch::Tag(tag("dev")));
        assert_eq!(dev.head().await.unwrap(), Some(h(9)));
        assert_eq!(other.branch(), Branch::Head(h(8)));
    }

    #[tokio::test]
    async fn merging_an_empty_handle_is_a_no_op() {
        let (transport, store) = master();
        let empty = store.derive(Branch::Empty);
        assert_eq!(store.merge(&empty).await.unwrap(), Ok(None));
        assert_eq!(store.merge_exn(&empty).await.unwrap(), None);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn lca_outcomes() {
        let (transport, store) = master();
        let path = format!("lcas-head/{}", h(2).to_hex());
        transport.reply_ok(Method::Get, &path, json!({"ok": [h(1).to_hex()]}));
        transport.reply_ok(Method::Get, "lcas-tag/dev", json!("max-depth-reached"));

        let bounds = SearchBounds::unbounded().with_limit(1);
        assert_eq!(store.lcas_head(&h(2), bounds).await.unwrap(), LcaOutcome::Ok(vec![h(1)]));
        assert_eq!(
            store.lcas_tag(&tag("dev"), bounds).await.unwrap(),
            LcaOutcome::MaxDepthReached
        );
    }

    #[tokio::test]
    async fn lcas_with_other_handle() {
        let (transport, store) = master();
        let detached = store.at_head(h(7));
        let path = format!("lcas-head/{}", h(7).to_hex());
        transport.reply_ok(Method::Get, &path, json!("too-many-lcas"));
        assert_eq!(store.lcas(&detached).await.unwrap(), LcaOutcome::TooManyLcas);
    }

    #[tokio::test]
    async fn history_of_tag_branch() {
        let (transport, store) = master();
        let dev = store.at_tag(tag("dev"));
        transport.reply_ok(
            Method::Post,
            "tree/dev/history",
            json!({
                "vertices": [h(1).to_hex(), h(2).to_hex()],
                "edges": [[h(1).to_hex(), h(2).to_hex()]],
            }),
        );

        let graph = dev.history(&HistoryQuery::new().with_depth(5)).await.unwrap();
        assert_eq!(graph.vertex_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(transport.calls()[0].query_value("depth"), Some("5"));
    }

    #[tokio::test]
    async fn history_of_empty_branch_is_invalid() {
        let (_, store) = master();
        let empty = store.derive(Branch::Empty);
        let err = empty.history(&HistoryQuery::default()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[tokio::test]
    async fn export_and_import_address_the_root() {
        let (transport, store) = master();
        let dev = store.at_tag(tag("dev"));
        transport.reply_ok(Method::Post, "export", json!({"contents": [[h(1).to_hex(), "v"]]}));
        transport.reply_ok(Method::Post, "import", json!(null));

        let slice = dev.export(&ExportQuery::new().with_max(vec![h(1)])).await.unwrap();
        assert_eq!(slice.contents, vec![(h(1), json!("v"))]);
        dev.import(&slice).await.unwrap();

        let paths: Vec<String> = transport.calls().iter().map(|c| c.path()).collect();
        assert_eq!(paths, vec!["export".to_string(), "import".to_string()]);
    }

    #[tokio::test]
    async fn transfer_between_stores() {
        let (source_transport, source) = master();
        let (target_transport, target) = master();
        let exported = json!({"contents": [[h(1).to_hex(), 1]]});
        source_transport.reply_ok(Method::Post, "export", exported);
        target_transport.reply_ok(Method::Post, "import", json!(null));

        assert_eq!(source.transfer_to(&target, &ExportQuery::new()).await.unwrap(), 1);
        assert_eq!(target_transport.calls_to("import").len(), 1);
    }

    #[tokio::test]
    async fn failed_import_reports_its_phase() {
        let (source_transport, source) = master();
        let (target_transport, target) = master();
        let exported = json!({"contents": [[h(1).to_hex(), 1]]});
        source_transport.reply_ok(Method::Post, "export", exported);
        target_transport.reply_error(Method::Post, "import", "disk full");

        let err = source.transfer_to(&target, &ExportQuery::new()).await.unwrap_err();
        assert!(matches!(err, SdkError::Sync(SyncError::Import(_))));
        assert_eq!(err.kind(), ErrorKind::Protocol);
    }
}
