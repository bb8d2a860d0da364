//! Remote trait for fetching the update descriptor and the payload document

#[cfg(test)]
use mockall::automock;

use crate::sync::error::RemoteError;
use crate::sync::types::UpdateDescriptor;

/// Trait for the two read-only endpoints of a published document
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RemoteSource: Send + Sync {
    /// Fetches the small descriptor announcing the latest published version
    async fn fetch_update_descriptor(&self) -> Result<UpdateDescriptor, RemoteError>;

    /// Fetches the full payload document
    ///
    /// # Returns
    /// * `Ok(Value)` - The raw JSON document, decoded by the caller
    /// * `Err(RemoteError)` - If the fetch fails
    async fn fetch_payload(&self) -> Result<serde_json::Value, RemoteError>;
}
