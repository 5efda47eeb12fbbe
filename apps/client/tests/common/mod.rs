//! Common test utilities for the client integration tests.
//!
//! - in-memory providers and change-notification helpers
//! - a recording sync trigger
//! - [`backend::FakeBackend`], an in-process HTTP server speaking the remote API

#![allow(dead_code)]

pub mod backend;
pub mod fixtures;

use std::sync::{Arc, Mutex};

use tokio::sync::broadcast;

use symptom_client::db::{ContentProvider, ContentUri};
use symptom_client::sync::SyncTrigger;

pub const AUTHORITY: &str = "test.symptoms.provider";

/// Provider over a private in-memory database.
pub fn provider() -> Arc<ContentProvider> {
    Arc::new(ContentProvider::in_memory(AUTHORITY))
}

/// Every notification received so far, without waiting.
pub fn drain(rx: &mut broadcast::Receiver<ContentUri>) -> Vec<ContentUri> {
    let mut seen = Vec::new();
    while let Ok(uri) = rx.try_recv() {
        seen.push(uri);
    }
    seen
}

/// Trigger that remembers which patients asked for a sync.
#[derive(Default)]
pub struct RecordingTrigger {
    requests: Mutex<Vec<String>>,
}

impl RecordingTrigger {
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl SyncTrigger for RecordingTrigger {
    fn request_sync(&self, patient_id: &str) {
        self.requests.lock().unwrap().push(patient_id.to_string());
    }
}
