use std::future::Future;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};

/// Invoked with the new value of a watched key; `None` means it was removed.
pub type KeyCallback<V> = Arc<dyn Fn(Option<V>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Invoked with every changed key and its new value.
pub type GlobalCallback<K, V> = Arc<dyn Fn(K, Option<V>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Wrap an async closure as a [`KeyCallback`].
pub fn on_value<V, F, Fut>(f: F) -> KeyCallback<V>
where
    F: Fn(Option<V>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |value| f(value).boxed())
}

/// Wrap an async closure as a [`GlobalCallback`].
pub fn on_change<K, V, F, Fut>(f: F) -> GlobalCallback<K, V>
where
    F: Fn(K, Option<V>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move |key, value| f(key, value).boxed())
}
