//! Requesting sync cycles after local writes.

use std::collections::BTreeSet;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::{SyncEngine, SyncError};

/// Capability handed to code that writes local rows and wants them pushed.
///
/// Requests are opportunistic: implementations must not block the caller
/// and may coalesce or drop requests.
pub trait SyncTrigger: Send + Sync {
    fn request_sync(&self, patient_id: &str);
}

/// Queues requests for a worker started with [`spawn_sync_worker`].
#[derive(Debug, Clone)]
pub struct ChannelTrigger {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelTrigger {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl SyncTrigger for ChannelTrigger {
    fn request_sync(&self, patient_id: &str) {
        if self.sender.send(patient_id.to_string()).is_err() {
            tracing::warn!(patient_id, "sync worker stopped, request dropped");
        }
    }
}

/// Trigger for a client with no backend configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTrigger;

impl SyncTrigger for NoopTrigger {
    fn request_sync(&self, patient_id: &str) {
        tracing::trace!(patient_id, "no backend, sync request ignored");
    }
}

/// Drain sync requests and run one cycle per distinct patient.
///
/// Requests that pile up while a cycle runs are merged. The task ends when
/// every [`ChannelTrigger`] clone has been dropped.
pub fn spawn_sync_worker(
    engine: SyncEngine,
    mut requests: mpsc::UnboundedReceiver<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(first) = requests.recv().await {
            let mut batch = BTreeSet::from([first]);
            while let Ok(next) = requests.try_recv() {
                batch.insert(next);
            }

            for patient_id in batch {
                // Other failures are logged by the engine; the next request retries.
                if let Err(SyncError::AlreadyInProgress) = engine.sync(&patient_id).await {
                    tracing::debug!(%patient_id, "sync already running, request skipped");
                }
            }
        }
        tracing::debug!("sync worker exiting");
    })
}
