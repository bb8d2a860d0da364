//! Versioned synchronization of a remotely published JSON document
//!
//! This module keeps a durable local copy of a remote document and refreshes it
//! only when the remote update descriptor announces a newer version whose schema
//! this build understands.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────────────┐     ┌─────────────┐
//! │   Remote    │────▶│ VersionedRemoteCache │────▶│    Store    │
//! │  (fetch)    │     │  (decide, publish)   │     │  (persist)  │
//! └─────────────┘     └──────────────────────┘     └─────────────┘
//!        │                       │                        │
//!        ▼                       ▼                        ▼
//! ┌─────────────┐         ┌─────────────┐          ┌─────────────┐
//! │   Remotes   │         │ subscribers │          │   Stores    │
//! │   (http)    │         │   (watch)   │          │(sqlite, mem)│
//! └─────────────┘         └─────────────┘          └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cache`]: The synchronization sequence and current-value publication
//! - [`remote`]: Trait for fetching the descriptor and payload
//! - [`remotes`]: Concrete remote implementations (HTTP)
//! - [`store`]: Trait for durable key-value storage
//! - [`stores`]: Concrete store implementations (SQLite, in-memory)
//! - [`refresh`]: Periodic background refresh
//! - [`error`]: Error types for remote and storage operations
//! - [`types`]: Descriptor, outcome and status types

pub mod cache;
pub mod error;
pub mod refresh;
pub mod remote;
pub mod remotes;
pub mod store;
pub mod stores;
pub mod types;
