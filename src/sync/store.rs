//! Durable key-value storage used to persist the payload and its version stamp

#[cfg(test)]
use mockall::automock;

use crate::sync::error::StoreError;

/// Trait for storing and retrieving string values by key
#[cfg_attr(test, automock)]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Get the value stored under `key`, if any
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// The write must be durable once this returns `Ok`.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`; removing a missing key is not an error
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
