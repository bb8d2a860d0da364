//! Shared test utilities

pub mod remote;
pub mod store;

pub use remote::{http_remote, mock_payload, mock_update, unreachable_remote};
pub use store::{create_test_cache, create_test_store};
