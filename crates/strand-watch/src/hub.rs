//! Subscription registry and stream workers.
//!
//! The hub keeps one group per watched key and at most one global group for
//! each branch prefix a subscription was opened under. A handle that moves to
//! another branch therefore opens fresh streams for its new position, while
//! callbacks registered earlier stay on the branch they were registered for.
//! Each group owns the cancel signal of the worker task pumping its stream.
//! Groups are tagged with a generation so that a worker that outlived its
//! group (cancelled, then replaced by a fresh registration) never removes
//! its successor.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use serde::de::DeserializeOwned;
use strand_protocol::{endpoints, ProtocolError, RemoteClient, Request};
use strand_types::{StoreKey, StoreValue};
use tokio::sync::{broadcast, oneshot};
use tracing::{debug, error, info};

use crate::callback::{GlobalCallback, KeyCallback};
use crate::connection::Connection;
use crate::error::{WatchError, WatchResult};

/// Handle identifying one registered callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u64);

impl fmt::Display for WatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

struct Group<C> {
    generation: u64,
    callbacks: BTreeMap<WatchId, C>,
    cancel: Option<oneshot::Sender<()>>,
}

impl<C> Group<C> {
    fn cancel(mut self) {
        if let Some(tx) = self.cancel.take() {
            let _ = tx.send(());
        }
    }
}

type Prefix = Vec<String>;

enum Owner<K> {
    Key(Prefix, K),
    Global(Prefix),
}

struct Registry<K, V> {
    next_id: u64,
    next_generation: u64,
    keys: HashMap<(Prefix, K), Group<KeyCallback<V>>>,
    global: HashMap<Prefix, Group<GlobalCallback<K, V>>>,
    owners: HashMap<WatchId, Owner<K>>,
}

impl<K: StoreKey, V> Registry<K, V> {
    fn new() -> Self {
        Self {
            next_id: 0,
            next_generation: 0,
            keys: HashMap::new(),
            global: HashMap::new(),
            owners: HashMap::new(),
        }
    }

    fn allocate_id(&mut self) -> WatchId {
        self.next_id += 1;
        WatchId(self.next_id)
    }

    fn allocate_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Drop a failed key group, if it is still the one the worker served.
    fn evict_key(&mut self, slot: &(Prefix, K), generation: u64) -> bool {
        if self.keys.get(slot).map(|g| g.generation) != Some(generation) {
            return false;
        }
        if let Some(group) = self.keys.remove(slot) {
            for id in group.callbacks.keys() {
                self.owners.remove(id);
            }
        }
        true
    }

    fn evict_global(&mut self, prefix: &Prefix, generation: u64) -> bool {
        if self.global.get(prefix).map(|g| g.generation) != Some(generation) {
            return false;
        }
        if let Some(group) = self.global.remove(prefix) {
            for id in group.callbacks.keys() {
                self.owners.remove(id);
            }
        }
        true
    }
}

type Shared<K, V> = Arc<Mutex<Registry<K, V>>>;

fn lock<K, V>(registry: &Mutex<Registry<K, V>>) -> MutexGuard<'_, Registry<K, V>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

enum Exit {
    Cancelled,
    Failed(ProtocolError),
    Closed,
}

/// Pump `conn` until cancelled or the stream stops, handing each event to
/// `dispatch`. Dropping the cancel sender counts as cancellation.
async fn pump<E, F>(
    mut conn: Connection<E>,
    mut cancel: oneshot::Receiver<()>,
    mut dispatch: F,
) -> Exit
where
    E: DeserializeOwned + Send + 'static,
    F: FnMut(E) -> BoxFuture<'static, ()>,
{
    loop {
        tokio::select! {
            biased;
            _ = &mut cancel => return Exit::Cancelled,
            item = conn.next() => match item {
                Some(Ok(event)) => dispatch(event).await,
                Some(Err(e)) => return Exit::Failed(e),
                None => return Exit::Closed,
            },
        }
    }
}

/// Deduplicating registry of watch callbacks for one store handle.
pub struct WatchHub<K, V> {
    client: RemoteClient,
    registry: Shared<K, V>,
    registration: tokio::sync::Mutex<()>,
    failures: broadcast::Sender<WatchError>,
}

impl<K: StoreKey, V: StoreValue> WatchHub<K, V> {
    /// Create a hub whose failure channel buffers `failure_capacity` reports.
    pub fn new(client: RemoteClient, failure_capacity: usize) -> Self {
        let (failures, _) = broadcast::channel(failure_capacity.max(1));
        Self {
            client,
            registry: Arc::new(Mutex::new(Registry::new())),
            registration: tokio::sync::Mutex::new(()),
            failures,
        }
    }

    /// Subscribe to stream failures reported after this call.
    pub fn failures(&self) -> broadcast::Receiver<WatchError> {
        self.failures.subscribe()
    }

    /// Register `callback` for changes to `key` under the branch `prefix`.
    ///
    /// The first registration for a key under `prefix` opens
    /// `watch-key/<key>` with `initial` as the body and returns once the
    /// stream is open; later registrations for the same key and prefix join
    /// the open stream and `initial` is ignored.
    pub async fn watch_key(
        &self,
        prefix: &[String],
        key: K,
        initial: Option<V>,
        callback: KeyCallback<V>,
    ) -> WatchResult<WatchId> {
        let _serial = self.registration.lock().await;
        let slot = (prefix.to_vec(), key);
        {
            let mut reg = lock(&self.registry);
            if reg.keys.contains_key(&slot) {
                let id = reg.allocate_id();
                if let Some(group) = reg.keys.get_mut(&slot) {
                    group.callbacks.insert(id, callback);
                }
                let (prefix, key) = slot;
                reg.owners.insert(id, Owner::Key(prefix, key));
                return Ok(id);
            }
        }

        let request = Request::post()
            .at(prefix)
            .segment(endpoints::WATCH_KEY)
            .key(&slot.1)
            .json_body(&initial)?;
        let scope = request.path();
        let mut conn = Connection::<Option<V>>::new(self.client.clone(), request);
        conn.connect()
            .await
            .map_err(|source| WatchError::Open { scope: scope.clone(), source })?;
        info!(%scope, "watch stream opened");

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let (id, generation) = {
            let mut reg = lock(&self.registry);
            let id = reg.allocate_id();
            let generation = reg.allocate_generation();
            let mut callbacks = BTreeMap::new();
            callbacks.insert(id, callback);
            reg.keys.insert(
                slot.clone(),
                Group {
                    generation,
                    callbacks,
                    cancel: Some(cancel_tx),
                },
            );
            reg.owners.insert(id, Owner::Key(slot.0.clone(), slot.1.clone()));
            (id, generation)
        };

        let registry = self.registry.clone();
        let failures = self.failures.clone();
        tokio::spawn(async move {
            let snapshot_of = registry.clone();
            let snapshot_slot = slot.clone();
            let dispatch = move |value: Option<V>| -> BoxFuture<'static, ()> {
                let callbacks: Vec<KeyCallback<V>> = lock(&snapshot_of)
                    .keys
                    .get(&snapshot_slot)
                    .filter(|g| g.generation == generation)
                    .map(|g| g.callbacks.values().cloned().collect())
                    .unwrap_or_default();
                async move {
                    for callback in callbacks {
                        callback(value.clone()).await;
                    }
                }
                .boxed()
            };
            let exit = pump(conn, cancel_rx, dispatch).await;
            let evicted = match &exit {
                Exit::Cancelled => false,
                Exit::Failed(_) | Exit::Closed => lock(&registry).evict_key(&slot, generation),
            };
            report(exit, evicted, scope, &failures);
        });

        Ok(id)
    }

    /// Register `callback` for every change under the branch `prefix`.
    ///
    /// The first global registration under `prefix` opens `watch` with
    /// `initial` as the body; later ones under the same prefix join it.
    pub async fn watch(
        &self,
        prefix: &[String],
        initial: Option<Vec<(K, V)>>,
        callback: GlobalCallback<K, V>,
    ) -> WatchResult<WatchId> {
        let _serial = self.registration.lock().await;
        {
            let mut reg = lock(&self.registry);
            if reg.global.contains_key(prefix) {
                let id = reg.allocate_id();
                if let Some(group) = reg.global.get_mut(prefix) {
                    group.callbacks.insert(id, callback);
                }
                reg.owners.insert(id, Owner::Global(prefix.to_vec()));
                return Ok(id);
            }
        }

        let request = Request::post()
            .at(prefix)
            .segment(endpoints::WATCH)
            .json_body(&initial)?;
        let scope = request.path();
        let mut conn = Connection::<(K, Option<V>)>::new(self.client.clone(), request);
        conn.connect()
            .await
            .map_err(|source| WatchError::Open { scope: scope.clone(), source })?;
        info!(%scope, "watch stream opened");

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let (id, generation) = {
            let mut reg = lock(&self.registry);
            let id = reg.allocate_id();
            let generation = reg.allocate_generation();
            let mut callbacks = BTreeMap::new();
            callbacks.insert(id, callback);
            reg.global.insert(
                prefix.to_vec(),
                Group {
                    generation,
                    callbacks,
                    cancel: Some(cancel_tx),
                },
            );
            reg.owners.insert(id, Owner::Global(prefix.to_vec()));
            (id, generation)
        };

        let registry = self.registry.clone();
        let failures = self.failures.clone();
        let prefix = prefix.to_vec();
        tokio::spawn(async move {
            let snapshot_of = registry.clone();
            let snapshot_prefix = prefix.clone();
            let dispatch = move |(key, value): (K, Option<V>)| -> BoxFuture<'static, ()> {
                let callbacks: Vec<GlobalCallback<K, V>> = lock(&snapshot_of)
                    .global
                    .get(&snapshot_prefix)
                    .filter(|g| g.generation == generation)
                    .map(|g| g.callbacks.values().cloned().collect())
                    .unwrap_or_default();
                async move {
                    for callback in callbacks {
                        callback(key.clone(), value.clone()).await;
                    }
                }
                .boxed()
            };
            let exit = pump(conn, cancel_rx, dispatch).await;
            let evicted = match &exit {
                Exit::Cancelled => false,
                Exit::Failed(_) | Exit::Closed => lock(&registry).evict_global(&prefix, generation),
            };
            report(exit, evicted, scope, &failures);
        });

        Ok(id)
    }

    /// Remove a callback. Cancels its stream when it was the last one.
    ///
    /// Returns `false` for an unknown or already removed id.
    pub fn unwatch(&self, id: WatchId) -> bool {
        let mut reg = lock(&self.registry);
        let Some(owner) = reg.owners.remove(&id) else {
            return false;
        };
        match owner {
            Owner::Key(prefix, key) => {
                let slot = (prefix, key);
                let drained = match reg.keys.get_mut(&slot) {
                    Some(group) => {
                        group.callbacks.remove(&id);
                        group.callbacks.is_empty()
                    }
                    None => false,
                };
                if drained {
                    if let Some(group) = reg.keys.remove(&slot) {
                        info!(
                            key = %slot.1.to_human(),
                            prefix = %slot.0.join("/"),
                            "watch stream closed"
                        );
                        group.cancel();
                    }
                }
            }
            Owner::Global(prefix) => {
                let drained = match reg.global.get_mut(&prefix) {
                    Some(group) => {
                        group.callbacks.remove(&id);
                        group.callbacks.is_empty()
                    }
                    None => false,
                };
                if drained {
                    if let Some(group) = reg.global.remove(&prefix) {
                        info!(prefix = %prefix.join("/"), "global watch stream closed");
                        group.cancel();
                    }
                }
            }
        }
        true
    }

    /// Callbacks currently registered on `key`, under any prefix.
    pub fn key_watchers(&self, key: &K) -> usize {
        lock(&self.registry)
            .keys
            .iter()
            .filter(|((_, k), _)| k == key)
            .map(|(_, g)| g.callbacks.len())
            .sum()
    }

    /// Callbacks currently registered on global streams.
    pub fn global_watchers(&self) -> usize {
        lock(&self.registry)
            .global
            .values()
            .map(|g| g.callbacks.len())
            .sum()
    }

    /// Keys with an open subscription under any prefix.
    pub fn watched_keys(&self) -> Vec<K> {
        let mut keys: Vec<K> = lock(&self.registry)
            .keys
            .keys()
            .map(|(_, k)| k.clone())
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Number of open subscriptions, per-key and global.
    pub fn streams(&self) -> usize {
        let reg = lock(&self.registry);
        reg.keys.len() + reg.global.len()
    }

    /// Total number of registered callbacks.
    pub fn len(&self) -> usize {
        lock(&self.registry).owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn report(exit: Exit, evicted: bool, scope: String, failures: &broadcast::Sender<WatchError>) {
    let failure = match exit {
        Exit::Cancelled => {
            debug!(%scope, "watch worker cancelled");
            return;
        }
        _ if !evicted => {
            debug!(%scope, "watch worker stopped after its group was removed");
            return;
        }
        Exit::Failed(source) => WatchError::Stream { scope, source },
        Exit::Closed => WatchError::Closed { scope },
    };
    error!(error = %failure, "watch worker failed");
    let _ = failures.send(failure);
}

impl<K, V> Drop for WatchHub<K, V> {
    fn drop(&mut self) {
        let mut reg = lock(&self.registry);
        for (_, group) in reg.keys.drain() {
            group.cancel();
        }
        for (_, group) in reg.global.drain() {
            group.cancel();
        }
        reg.owners.clear();
    }
}

impl<K, V> fmt::Debug for WatchHub<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reg = lock(&self.registry);
        f.debug_struct("WatchHub")
            .field("keys", &reg.keys.len())
            .field("global", &reg.global.len())
            .field("watchers", &reg.owners.len())
            .finish()
    }
}
