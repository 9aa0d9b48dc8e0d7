//! Reads and writes of the content tree.
//!
//! Every mutation returns the hash of the commit the remote created. The
//! commit moves a detached or empty handle; a tag handle stays on its tag.

use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use strand_protocol::{endpoints, Request};
use strand_types::{HumanReadable, Schema};
use tracing::debug;

use crate::error::{SdkError, SdkResult};
use crate::store::{HashOf, Store};

/// Keys yielded by [`Store::iter`].
pub type KeyStream<K> = BoxStream<'static, SdkResult<K>>;

impl<S: Schema> Store<S> {
    pub async fn read(&self, key: &S::Key) -> SdkResult<Option<S::Value>> {
        let request = Request::get().at(&self.prefix()?).segment(endpoints::READ).key(key);
        Ok(self.client.send(request).await?)
    }

    pub async fn read_exn(&self, key: &S::Key) -> SdkResult<S::Value> {
        self.read(key)
            .await?
            .ok_or_else(|| SdkError::NotFound(format!("key /{}", key.to_human())))
    }

    pub async fn mem(&self, key: &S::Key) -> SdkResult<bool> {
        let request = Request::get().at(&self.prefix()?).segment(endpoints::MEM).key(key);
        Ok(self.client.send(request).await?)
    }

    /// Direct children of `key`.
    pub async fn list(&self, key: &S::Key) -> SdkResult<Vec<S::Key>> {
        let request = Request::get().at(&self.prefix()?).segment(endpoints::LIST).key(key);
        Ok(self.client.send(request).await?)
    }

    /// Stream every key holding a value.
    pub async fn iter(&self) -> SdkResult<KeyStream<S::Key>> {
        let request = Request::get().at(&self.prefix()?).segment(endpoints::ITER);
        let keys = self.client.subscribe::<S::Key>(request).await?;
        Ok(keys.map(|k| k.map_err(SdkError::from)).boxed())
    }

    /// Every key holding a value, collected from [`Store::iter`].
    pub async fn keys(&self) -> SdkResult<Vec<S::Key>> {
        self.iter().await?.try_collect().await
    }

    pub async fn update(&self, key: &S::Key, value: &S::Value) -> SdkResult<HashOf<S>> {
        let request = Request::post()
            .at(&self.prefix()?)
            .segment(endpoints::UPDATE)
            .key(key)
            .json_body(value)?;
        self.commit(request).await
    }

    pub async fn remove(&self, key: &S::Key) -> SdkResult<HashOf<S>> {
        let request = Request::delete().at(&self.prefix()?).segment(endpoints::REMOVE).key(key);
        self.commit(request).await
    }

    /// Remove `dir` and everything below it.
    pub async fn remove_rec(&self, dir: &S::Key) -> SdkResult<HashOf<S>> {
        let request = Request::delete()
            .at(&self.prefix()?)
            .segment(endpoints::REMOVE_REC)
            .key(dir);
        self.commit(request).await
    }

    /// Replace the value at `key` if it currently equals `test`. `None`
    /// means absent on either side. The local branch is not moved.
    pub async fn compare_and_set(
        &self,
        key: &S::Key,
        test: Option<&S::Value>,
        set: Option<&S::Value>,
    ) -> SdkResult<bool> {
        let request = Request::post()
            .at(&self.prefix()?)
            .segment(endpoints::COMPARE_AND_SET)
            .key(key)
            .json_body(&(test, set))?;
        Ok(self.client.send(request).await?)
    }

    async fn commit(&self, request: Request) -> SdkResult<HashOf<S>> {
        let head: HashOf<S> = self.client.send(request).await?;
        if self.state.apply_commit(head.clone()) {
            debug!(head = %head.to_human(), "local head moved");
        }
        Ok(head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{eventually, h, key, master};
    use serde_json::json;
    use strand_protocol::Method;
    use strand_refs::RefError;
    use strand_types::{Branch, Path, TagName};

    #[tokio::test]
    async fn tag_branch_identity_survives_mutations() {
        let (transport, store) = master();
        let dev = store.at_tag(TagName::new("dev").unwrap());
        transport.reply_ok(Method::Post, "tree/dev/update/k", json!(h(1).to_hex()));
        transport.reply_ok(Method::Delete, "tree/dev/remove/k", json!(h(2).to_hex()));
        transport.reply_ok(Method::Delete, "tree/dev/remove-rec/d", json!(h(3).to_hex()));

        assert_eq!(dev.update(&key(&["k"]), &json!(1)).await.unwrap(), h(1));
        assert_eq!(dev.remove(&key(&["k"])).await.unwrap(), h(2));
        assert_eq!(dev.remove_rec(&key(&["d"])).await.unwrap(), h(3));
        assert_eq!(dev.tag().map(|t| t.as_str().to_string()), Some("dev".into()));
    }

    #[tokio::test]
    async fn failed_mutation_leaves_detached_head() {
        let (transport, store) = master();
        let detached = store.at_head(h(1));
        transport.reply_error(
            Method::Delete,
            &format!("tree/{}/remove/k", h(1).to_hex()),
            "read-only",
        );

        let err = detached.remove(&key(&["k"])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Protocol);
        assert_eq!(detached.branch(), Branch::Head(h(1)));
    }

    #[tokio::test]
    async fn update_sends_value_body() {
        let (transport, store) = master();
        transport.reply_ok(Method::Post, "update/a%20b/c", json!(h(1).to_hex()));
        store.update(&key(&["a b", "c"]), &json!({"n": 1})).await.unwrap();
        assert_eq!(transport.calls()[0].body_value(), Some(&json!({"n": 1})));
    }

    #[tokio::test]
    async fn read_absent_and_read_exn() {
        let (transport, store) = master();
        transport.reply_ok(Method::Get, "read/missing", json!(null));
        transport.reply_ok(Method::Get, "read/missing", json!(null));

        assert_eq!(store.read(&key(&["missing"])).await.unwrap(), None);
        let err = store.read_exn(&key(&["missing"])).await.unwrap_err();
        assert_eq!(err, SdkError::NotFound("key /missing".into()));
    }

    #[tokio::test]
    async fn mem_and_list() {
        let (transport, store) = master();
        transport.reply_ok(Method::Get, "mem/a", json!(true));
        transport.reply_ok(Method::Get, "list/a", json!([["a", "x"], ["a", "y"]]));

        assert!(store.mem(&key(&["a"])).await.unwrap());
        assert_eq!(
            store.list(&key(&["a"])).await.unwrap(),
            vec![key(&["a", "x"]), key(&["a", "y"])]
        );
    }

    #[tokio::test]
    async fn list_of_root() {
        let (transport, store) = master();
        transport.reply_ok(Method::Get, "list", json!([["a"]]));
        assert_eq!(store.list(&Path::root()).await.unwrap(), vec![key(&["a"])]);
    }

    #[tokio::test]
    async fn key_compare_and_set_does_not_move_branch() {
        let (transport, store) = master();
        let detached = store.at_head(h(1));
        let path = format!("tree/{}/compare-and-set/k", h(1).to_hex());
        transport.reply_ok(Method::Post, &path, json!(true));

        let set = json!("new");
        assert!(detached.compare_and_set(&key(&["k"]), None, Some(&set)).await.unwrap());
        assert_eq!(transport.calls()[0].body_value(), Some(&json!([null, "new"])));
        assert_eq!(detached.branch(), Branch::Head(h(1)));
    }

    #[tokio::test]
    async fn iter_streams_keys() {
        let (transport, store) = master();
        let mut keys = store.iter().await.unwrap();
        transport.push("iter", json!(["a"]));
        transport.push("iter", json!(["b", "c"]));
        transport.close_streams("iter");

        assert_eq!(keys.next().await, Some(Ok(key(&["a"]))));
        assert_eq!(keys.next().await, Some(Ok(key(&["b", "c"]))));
        assert_eq!(keys.next().await, None);
    }

    #[tokio::test]
    async fn keys_collects_until_close_or_error() {
        let (transport, store) = master();
        let feed = async {
            eventually(|| transport.stream_opens("iter") == 1).await;
            transport.push("iter", json!(["a"]));
            transport.close_streams("iter");
        };
        let (keys, ()) = tokio::join!(store.keys(), feed);
        assert_eq!(keys.unwrap(), vec![key(&["a"])]);

        let feed = async {
            eventually(|| transport.stream_opens("iter") == 2).await;
            transport.push("iter", json!(["a"]));
            transport.push_error("iter", "tree gone");
        };
        let (keys, ()) = tokio::join!(store.keys(), feed);
        assert_eq!(keys.unwrap_err().kind(), ErrorKind::Protocol);
    }

    #[tokio::test]
    async fn empty_branch_mutations_are_unsupported() {
        let (transport, store) = master();
        let empty = store.derive(Branch::Empty);

        let err = empty.update(&key(&["a"]), &json!(1)).await.unwrap_err();
        assert!(matches!(err, SdkError::Ref(RefError::Unsupported { .. })));
        let err = empty.remove(&key(&["a"])).await.unwrap_err();
        assert!(matches!(err, SdkError::Ref(RefError::Unsupported { .. })));
        let err = empty.remove_rec(&key(&["a"])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert_eq!(empty.branch(), Branch::Empty);
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_branch_cannot_read() {
        let (transport, store) = master();
        let empty = store.derive(Branch::Empty);
        let err = empty.read(&key(&["a"])).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert_eq!(transport.call_count(), 0);
    }
}
