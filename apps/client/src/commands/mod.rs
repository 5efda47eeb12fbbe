//! Write flows the UI calls: each writes through the content provider and
//! then asks for a sync.

pub mod checkin;
pub mod reminders;
pub mod status;

use std::sync::Arc;

use symptom_core::Clock;

use crate::db::{ContentProvider, DbError};
use crate::sync::{ApiClient, SyncError, SyncTrigger};

pub use checkin::{CheckInInput, CheckInReceipt, MedicationTaken};

/// Command error type surfaced to the UI.
#[derive(Debug, serde::Serialize)]
pub struct CommandError {
    pub message: String,
}

impl CommandError {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<DbError> for CommandError {
    fn from(e: DbError) -> Self {
        Self::new(format!("Database error: {}", e))
    }
}

impl From<SyncError> for CommandError {
    fn from(e: SyncError) -> Self {
        Self::new(format!("Sync error: {}", e))
    }
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for CommandError {}

/// Entry point for UI-initiated writes.
#[derive(Clone)]
pub struct Commands {
    provider: Arc<ContentProvider>,
    trigger: Arc<dyn SyncTrigger>,
    clock: Arc<dyn Clock>,
    /// Used for edits to records the server already knows.
    api: Option<ApiClient>,
}

impl Commands {
    pub fn new(
        provider: Arc<ContentProvider>,
        trigger: Arc<dyn SyncTrigger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            trigger,
            clock,
            api: None,
        }
    }

    pub fn with_api(mut self, api: ApiClient) -> Self {
        self.api = Some(api);
        self
    }
}
