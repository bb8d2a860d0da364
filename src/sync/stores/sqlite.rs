use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::sync::error::StoreError;
use crate::sync::store::KeyValueStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        info!("Initializing store database at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // WAL keeps readers from blocking the single writer
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        debug!("Database connection established");

        let store = Self {
            conn: Mutex::new(conn),
        };

        store.create_schema()?;
        info!("Store initialized successfully");

        Ok(store)
    }

    /// Acquire database connection lock with proper error handling
    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Get current timestamp in milliseconds since UNIX epoch
    fn current_timestamp_ms() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or_default()
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating database schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
            [],
        )?;

        debug!("Database schema created successfully");
        Ok(())
    }

    /// Timestamp (ms since UNIX epoch) of the last write to `key`
    pub fn updated_at(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let conn = self.lock_conn()?;
        let updated_at = conn
            .query_row(
                "SELECT updated_at FROM entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(updated_at)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let conn = self.lock_conn()?;
        let value = conn
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        debug!("Saving {} bytes under {}", value.len(), key);

        let now = Self::current_timestamp_ms();
        let conn = self.lock_conn()?;
        conn.execute(
            r#"
            INSERT INTO entries (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            (key, value, now),
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let conn = self.lock_conn()?;
        conn.execute("DELETE FROM entries WHERE key = ?1", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, SqliteStore) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let store = SqliteStore::new(&db_path).unwrap();
        (temp_dir, store)
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let (_temp_dir, store) = create_test_store();
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn set_overwrites_existing_value() {
        let (_temp_dir, store) = create_test_store();

        store.set("stamp", "5").unwrap();
        store.set("stamp", "6").unwrap();

        assert_eq!(store.get("stamp").unwrap(), Some("6".to_string()));
    }

    #[test]
    fn set_records_updated_at() {
        let (_temp_dir, store) = create_test_store();
        assert_eq!(store.updated_at("stamp").unwrap(), None);

        store.set("stamp", "5").unwrap();

        let updated_at = store.updated_at("stamp").unwrap().unwrap();
        assert!(updated_at > 0);
    }

    #[test]
    fn remove_deletes_entry() {
        let (_temp_dir, store) = create_test_store();

        store.set("payload", "{}").unwrap();
        store.remove("payload").unwrap();
        store.remove("payload").unwrap();

        assert_eq!(store.get("payload").unwrap(), None);
    }

    #[test]
    fn values_survive_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        {
            let store = SqliteStore::new(&db_path).unwrap();
            store.set("payload", r#"{"a":1}"#).unwrap();
        }

        let store = SqliteStore::new(&db_path).unwrap();
        assert_eq!(store.get("payload").unwrap(), Some(r#"{"a":1}"#.to_string()));
    }

    #[test]
    fn schema_records_write_time_per_entry() {
        let (_temp_dir, store) = create_test_store();
        let conn = store.lock_conn().unwrap();

        let mut stmt = conn.prepare("PRAGMA table_info(entries)").unwrap();
        let columns: Vec<String> = stmt
            .query_map([], |row| row.get(1))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect();

        assert_eq!(columns, vec!["key", "value", "updated_at"]);
    }
}
