//! Store test utilities

use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;

use stats_cache::config::{PAYLOAD_KEY, STAMP_KEY, SUPPORTED_SCHEMA_VERSION};
use stats_cache::sync::cache::VersionedRemoteCache;
use stats_cache::sync::remote::RemoteSource;
use stats_cache::sync::store::KeyValueStore;
use stats_cache::sync::stores::SqliteStore;

/// Create a SQLite store, optionally pre-populated with a payload and stamp
pub fn create_test_store(payload: Option<&str>, stamp: Option<&str>) -> (TempDir, Arc<SqliteStore>) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let store = SqliteStore::new(&db_path).unwrap();

    if let Some(payload) = payload {
        store.set(PAYLOAD_KEY, payload).unwrap();
    }
    if let Some(stamp) = stamp {
        store.set(STAMP_KEY, stamp).unwrap();
    }

    (temp_dir, Arc::new(store))
}

pub fn create_test_cache(
    remote: Arc<dyn RemoteSource>,
    store: Arc<SqliteStore>,
) -> VersionedRemoteCache<Value, SqliteStore> {
    VersionedRemoteCache::new(remote, store, SUPPORTED_SCHEMA_VERSION)
}
