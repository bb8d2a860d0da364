//! Background refresh of a versioned remote cache

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::debug;

use crate::sync::cache::VersionedRemoteCache;
use crate::sync::store::KeyValueStore;

/// Run `load()` now and then once per `period` until the handle is aborted.
///
/// Loads never overlap: the next tick waits for the previous load to finish,
/// and ticks missed meanwhile are skipped.
pub fn spawn_periodic_refresh<T, S>(
    cache: Arc<VersionedRemoteCache<T, S>>,
    period: Duration,
) -> JoinHandle<()>
where
    T: DeserializeOwned + Send + Sync + 'static,
    S: KeyValueStore,
{
    tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            let outcome = cache.load().await;
            debug!("Periodic refresh finished: {}", outcome);
        }
    })
}
