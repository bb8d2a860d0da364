//! Common types shared by the synchronization layer

use std::fmt;

use serde::{Deserialize, Serialize};

/// Update descriptor published next to the payload document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDescriptor {
    /// Timestamp of the last payload change, used as the version stamp
    pub last_update: i64,
    /// Schema version the published payload conforms to
    pub schema_version: String,
}

/// Result of one synchronization run
///
/// This is a status report, not an error: `load()` never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The locally cached version is at least as new as the remote one
    UpToDate { version: i64 },
    /// A newer payload was fetched, persisted and published
    Refreshed { version: i64 },
    /// The remote announced a newer payload with a schema this build cannot read
    SchemaMismatch { remote: String, supported: String },
    /// Fetching or persisting failed; the previous state is kept
    Failed { reason: String },
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncOutcome::UpToDate { version } => write!(f, "up to date (version {})", version),
            SyncOutcome::Refreshed { version } => write!(f, "refreshed to version {}", version),
            SyncOutcome::SchemaMismatch { remote, supported } => write!(
                f,
                "skipped: remote schema {} is not supported (expected {})",
                remote, supported
            ),
            SyncOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Observable state of the synchronization side channel
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// No load has been started yet
    #[default]
    Idle,
    /// A load is in progress
    Syncing,
    /// The most recent load finished with this outcome
    Finished(SyncOutcome),
}
