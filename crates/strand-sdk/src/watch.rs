use strand_types::Schema;
use strand_watch::{GlobalCallback, KeyCallback, WatchError, WatchId};
use tokio::sync::broadcast;

use crate::error::SdkResult;
use crate::store::Store;

impl<S: Schema> Store<S> {
    /// Call `callback` whenever `key` changes on this branch.
    ///
    /// `initial` is the value the caller believes the key holds; the remote
    /// reports a change immediately if it differs. Watchers of the same key
    /// on the same branch share a single stream. The stream follows the
    /// branch the handle is on at registration; after the handle moves, new
    /// registrations open a stream on the new branch.
    pub async fn watch_key(
        &self,
        key: S::Key,
        initial: Option<S::Value>,
        callback: KeyCallback<S::Value>,
    ) -> SdkResult<WatchId> {
        let prefix = self.prefix()?;
        Ok(self.watches.watch_key(&prefix, key, initial, callback).await?)
    }

    /// Call `callback` for every change on this branch.
    pub async fn watch(
        &self,
        initial: Option<Vec<(S::Key, S::Value)>>,
        callback: GlobalCallback<S::Key, S::Value>,
    ) -> SdkResult<WatchId> {
        let prefix = self.prefix()?;
        Ok(self.watches.watch(&prefix, initial, callback).await?)
    }

    /// Drop a watcher. Returns `false` if `id` was not registered.
    pub fn unwatch(&self, id: WatchId) -> bool {
        self.watches.unwatch(id)
    }

    /// Failures of this handle's watch streams. A failed stream is not
    /// reopened; its watchers are dropped and must register again.
    pub fn watch_failures(&self) -> broadcast::Receiver<WatchError> {
        self.watches.failures()
    }
}
