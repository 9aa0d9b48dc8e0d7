//! Fixtures shared by the unit tests of this crate.

use std::sync::Arc;
use std::time::Duration;

use strand_protocol::ScriptedTransport;
use strand_types::{DefaultSchema, Hash, Path, TagName};
use tokio::sync::mpsc;

use crate::config::StoreConfig;
use crate::store::Store;

pub(crate) fn h(b: u8) -> Hash {
    Hash::from_raw([b; 32])
}

pub(crate) fn key(steps: &[&str]) -> Path {
    Path::new(steps.iter().copied())
}

pub(crate) fn tag(name: &str) -> TagName {
    TagName::new(name).unwrap()
}

/// A handle on `master` over a fresh scripted transport.
pub(crate) fn master() -> (Arc<ScriptedTransport>, Store<DefaultSchema>) {
    let transport = Arc::new(ScriptedTransport::new());
    let store = Store::master(transport.clone(), StoreConfig::default());
    (transport, store)
}

pub(crate) async fn eventually(mut check: impl FnMut() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached");
}

pub(crate) async fn recv<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out")
        .expect("channel closed")
}
