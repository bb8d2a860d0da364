//! Versioned remote cache: local-first publication with version-checked refresh

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::{PAYLOAD_KEY, STAMP_KEY};
use crate::sync::error::StoreError;
use crate::sync::remote::RemoteSource;
use crate::sync::store::KeyValueStore;
use crate::sync::types::{SyncOutcome, SyncStatus};

/// Stamp used when nothing has been synced yet
const NEVER_SYNCED: i64 = 0;

/// Keeps a durable local copy of a remote document and publishes the best
/// available version to subscribers.
///
/// The payload type `T` is decoded from the stored/fetched JSON; documents that
/// fail to decode are treated as absent (local) or as a failed fetch (remote).
pub struct VersionedRemoteCache<T, S: KeyValueStore> {
    remote: Arc<dyn RemoteSource>,
    store: Arc<S>,
    supported_schema: String,
    current: watch::Sender<Option<Arc<T>>>,
    status: watch::Sender<SyncStatus>,
}

impl<T, S> VersionedRemoteCache<T, S>
where
    T: DeserializeOwned + Send + Sync + 'static,
    S: KeyValueStore,
{
    pub fn new(remote: Arc<dyn RemoteSource>, store: Arc<S>, supported_schema: &str) -> Self {
        Self {
            remote,
            store,
            supported_schema: supported_schema.to_string(),
            current: watch::Sender::new(None),
            status: watch::Sender::new(SyncStatus::Idle),
        }
    }

    /// Subscribe to the current value.
    ///
    /// The receiver sees the latest published value immediately through
    /// `borrow()` and is notified of every later change.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<T>>> {
        self.current.subscribe()
    }

    /// Snapshot of the current value
    pub fn current(&self) -> Option<Arc<T>> {
        self.current.borrow().clone()
    }

    /// Subscribe to the synchronization status side channel
    pub fn status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    /// Version stamp of the locally stored payload, or 0 if absent or unreadable
    pub fn stored_version(&self) -> i64 {
        match self.store.get(STAMP_KEY) {
            Ok(Some(raw)) => raw.trim().parse().unwrap_or_else(|_| {
                debug!("Ignoring unparsable version stamp {:?}", raw);
                NEVER_SYNCED
            }),
            Ok(None) => NEVER_SYNCED,
            Err(e) => {
                error!("Failed to read version stamp: {}", e);
                NEVER_SYNCED
            }
        }
    }

    /// Remove the stored payload and stamp, and publish `None`.
    ///
    /// The stamp goes first so an interrupted clear never leaves a stamp
    /// without its payload.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(STAMP_KEY)?;
        self.store.remove(PAYLOAD_KEY)?;
        self.current.send_replace(None);
        info!("Cleared cached payload");
        Ok(())
    }

    /// Publish the locally stored payload if nothing has been published yet.
    ///
    /// Returns whether a value is available afterwards. Never touches the
    /// network.
    pub fn restore(&self) -> bool {
        let already_published = self.current.borrow().is_some();
        if already_published {
            return true;
        }

        match self.read_cached_payload() {
            Some(cached) => {
                debug!("Publishing locally cached payload");
                self.current.send_replace(Some(Arc::new(cached)));
                true
            }
            None => false,
        }
    }

    /// Run the synchronization sequence once.
    ///
    /// Never fails: every error is logged and reported through the returned
    /// outcome and the status channel, while the current value keeps the best
    /// data available. If the future is dropped before completion (for example
    /// by a caller's timeout), the status becomes `Finished(Failed)`.
    pub async fn load(&self) -> SyncOutcome {
        self.status.send_replace(SyncStatus::Syncing);
        let mut status = StatusGuard {
            status: &self.status,
            outcome: None,
        };
        let outcome = self.synchronize().await;
        status.outcome = Some(outcome.clone());
        outcome
    }

    async fn synchronize(&self) -> SyncOutcome {
        // Local data first, without waiting on the network
        let has_payload = self.restore();

        let descriptor = match self.remote.fetch_update_descriptor().await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                error!("Failed to fetch update descriptor: {}", e);
                return SyncOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        // A stamp without a usable payload does not count as synced
        let stored_version = if has_payload {
            self.stored_version()
        } else {
            NEVER_SYNCED
        };

        if descriptor.last_update <= stored_version {
            debug!(
                "Stored version {} is current (remote {})",
                stored_version, descriptor.last_update
            );
            return SyncOutcome::UpToDate {
                version: stored_version,
            };
        }

        if descriptor.schema_version != self.supported_schema {
            warn!(
                "Unsupported remote schema version {} (supported {}), skipping version {}",
                descriptor.schema_version, self.supported_schema, descriptor.last_update
            );
            return SyncOutcome::SchemaMismatch {
                remote: descriptor.schema_version,
                supported: self.supported_schema.clone(),
            };
        }

        info!(
            "New payload version {} available (stored {})",
            descriptor.last_update, stored_version
        );

        let raw = match self.remote.fetch_payload().await {
            Ok(raw) => raw,
            Err(e) => {
                error!("Failed to fetch payload: {}", e);
                return SyncOutcome::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let serialized = raw.to_string();
        let payload: T = match serde_json::from_value(raw) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Fetched payload does not match the expected structure: {}", e);
                return SyncOutcome::Failed {
                    reason: format!("Invalid payload: {}", e),
                };
            }
        };

        self.persist_and_publish(payload, &serialized, descriptor.last_update)
    }

    /// Payload write happens-before stamp write; the stamp never names a
    /// version whose payload was not saved.
    fn persist_and_publish(&self, payload: T, serialized: &str, version: i64) -> SyncOutcome {
        if let Err(e) = self.store.set(PAYLOAD_KEY, serialized) {
            error!("Failed to persist payload version {}: {}", version, e);
            return SyncOutcome::Failed {
                reason: e.to_string(),
            };
        }

        let stamp_result = self.store.set(STAMP_KEY, &version.to_string());

        // The stored payload is newer than anything published, stamp or not
        self.current.send_replace(Some(Arc::new(payload)));

        if let Err(e) = stamp_result {
            error!("Failed to persist version stamp {}: {}", version, e);
            return SyncOutcome::Failed {
                reason: e.to_string(),
            };
        }

        info!("Refreshed payload to version {}", version);
        SyncOutcome::Refreshed { version }
    }

    fn read_cached_payload(&self) -> Option<T> {
        let raw = match self.store.get(PAYLOAD_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                error!("Failed to read cached payload: {}", e);
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|e| debug!("Ignoring corrupted cached payload: {}", e))
            .ok()
    }
}

/// Publishes the final status when `load()` completes or is dropped mid-way
struct StatusGuard<'a> {
    status: &'a watch::Sender<SyncStatus>,
    outcome: Option<SyncOutcome>,
}

impl Drop for StatusGuard<'_> {
    fn drop(&mut self) {
        let outcome = self.outcome.take().unwrap_or_else(|| SyncOutcome::Failed {
            reason: "Sync cancelled".to_string(),
        });
        self.status.send_replace(SyncStatus::Finished(outcome));
    }
}
