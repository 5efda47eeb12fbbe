//! Sync engine: pushes locally recorded rows to the server and refreshes the
//! cache from it.

pub mod api;
pub mod trigger;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::Mutex;

use symptom_core::{
    Clock, MedicationLog, PatientPrefs, PainLog, PhysicianLink, Prescription, Reminder, StatusLog,
};

use crate::db::contract::columns::PATIENT_ID;
use crate::db::mapping::patient_values;
use crate::db::{decode_all, ContentProvider, ContentValues, DbError, Value};

pub use api::{ApiClient, RemoteResource};
pub use trigger::{spawn_sync_worker, ChannelTrigger, NoopTrigger, SyncTrigger};

/// Sync errors.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Sync already in progress")]
    AlreadyInProgress,

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Sync status for observers.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SyncStatus {
    Idle,
    Syncing { stage: SyncStage, progress: f32 },
    Completed { synced_at: String, stats: SyncStats },
    Failed { error: String },
}

/// Current sync stage.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "name")]
pub enum SyncStage {
    Connecting,
    PushingRecords { collection: &'static str },
    PullingPatient,
    PullingRecords { collection: &'static str },
}

/// Sync statistics.
#[derive(Debug, Clone, Serialize, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub records_pushed: usize,
    pub patients_pulled: usize,
    pub records_pulled: usize,
    /// Pulled records already present in the cache.
    pub records_skipped: usize,
}

/// Inner state shared across clones.
struct SyncEngineInner {
    api: ApiClient,
    provider: Arc<ContentProvider>,
    clock: Arc<dyn Clock>,
    status: Mutex<SyncStatus>,
    stats: Mutex<SyncStats>,
}

/// Runs push/pull cycles for one patient at a time.
///
/// Clone-able: all state lives behind an `Arc`, so a clone can be moved into
/// a background task.
#[derive(Clone)]
pub struct SyncEngine {
    inner: Arc<SyncEngineInner>,
}

impl SyncEngine {
    pub fn new(api: ApiClient, provider: Arc<ContentProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(SyncEngineInner {
                api,
                provider,
                clock,
                status: Mutex::new(SyncStatus::Idle),
                stats: Mutex::new(SyncStats::default()),
            }),
        }
    }

    /// Get current sync status.
    pub async fn status(&self) -> SyncStatus {
        self.inner.status.lock().await.clone()
    }

    /// Run one full cycle for `patient_id`.
    pub async fn sync(&self, patient_id: &str) -> Result<SyncStats, SyncError> {
        {
            let mut current = self.inner.status.lock().await;
            if matches!(*current, SyncStatus::Syncing { .. }) {
                return Err(SyncError::AlreadyInProgress);
            }
            *current = SyncStatus::Syncing {
                stage: SyncStage::Connecting,
                progress: 0.0,
            };
        }
        *self.inner.stats.lock().await = SyncStats::default();

        tracing::info!(patient_id, backend = self.inner.api.backend_url(), "sync started");
        match self.run_cycle(patient_id).await {
            Ok(stats) => {
                let synced_at = Utc::now().to_rfc3339();
                tracing::info!(
                    patient_id,
                    pushed = stats.records_pushed,
                    pulled = stats.records_pulled,
                    skipped = stats.records_skipped,
                    "sync completed"
                );
                self.set_status(SyncStatus::Completed {
                    synced_at,
                    stats: stats.clone(),
                })
                .await;
                Ok(stats)
            }
            Err(e) => {
                tracing::warn!(patient_id, error = %e, "sync failed");
                self.set_status(SyncStatus::Failed {
                    error: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    async fn run_cycle(&self, patient_id: &str) -> Result<SyncStats, SyncError> {
        // 1. Check connectivity
        if !self.inner.api.check_connectivity().await? {
            return Err(SyncError::Network("Backend not reachable".to_string()));
        }

        // 2. Push rows recorded while offline
        self.push_pending::<PainLog>(patient_id, 0.1).await?;
        self.push_pending::<MedicationLog>(patient_id, 0.2).await?;
        self.push_pending::<StatusLog>(patient_id, 0.3).await?;
        self.push_pending::<Reminder>(patient_id, 0.4).await?;

        // 3. Refresh the patient record
        self.set_status(SyncStatus::Syncing {
            stage: SyncStage::PullingPatient,
            progress: 0.5,
        })
        .await;
        let patient = self.inner.api.get_patient(patient_id).await?;
        let provider = &self.inner.provider;
        provider.insert(
            &provider.collection_uri(crate::db::Resource::Patient),
            &patient_values(&patient),
        )?;
        self.inner.stats.lock().await.patients_pulled += 1;

        // 4. Pull collections into the cache
        self.pull::<Prescription>(patient_id, 0.6).await?;
        self.pull::<PhysicianLink>(patient_id, 0.65).await?;
        self.pull::<Reminder>(patient_id, 0.7).await?;
        self.pull::<PatientPrefs>(patient_id, 0.75).await?;
        self.pull::<PainLog>(patient_id, 0.8).await?;
        self.pull::<MedicationLog>(patient_id, 0.85).await?;
        self.pull::<StatusLog>(patient_id, 0.9).await?;

        Ok(self.inner.stats.lock().await.clone())
    }

    /// Send every row of `R` that has no server id yet, then record the id
    /// the server assigned.
    async fn push_pending<R: RemoteResource>(
        &self,
        patient_id: &str,
        progress: f32,
    ) -> Result<(), SyncError> {
        let provider = &self.inner.provider;
        let Some(server_column) = R::RESOURCE.server_id_column() else {
            return Ok(());
        };

        let collection = provider.collection_uri(R::RESOURCE);
        let selection = format!("{} = ? AND {} IS NULL", PATIENT_ID, server_column);
        let cursor = provider.query(
            &collection,
            None,
            Some(selection.as_str()),
            &[Value::Text(patient_id.to_string())],
            Some("created ASC"),
        )?;
        let pending: Vec<R> = decode_all(&cursor)?;
        if pending.is_empty() {
            return Ok(());
        }

        self.set_status(SyncStatus::Syncing {
            stage: SyncStage::PushingRecords {
                collection: R::COLLECTION,
            },
            progress,
        })
        .await;

        for record in &pending {
            let saved = self.inner.api.add(patient_id, record).await?;
            let Some(server_id) = saved.server_id() else {
                return Err(SyncError::Parse(format!(
                    "{} response carried no server id",
                    R::COLLECTION
                )));
            };

            let row = provider.item_uri(R::RESOURCE, record.row_id());
            if R::RESOURCE.allows_update() {
                let mut change = ContentValues::new();
                change.put_text(server_column, server_id);
                provider.update(&row, &change, None, &[])?;
            } else {
                // Logs cannot be updated in place; replace the row keeping
                // the local timestamps.
                let mut values = record.to_values(self.inner.clock.as_ref());
                values.put_text(server_column, server_id);
                provider.apply_batch(|batch| {
                    batch.delete(&row, None, &[])?;
                    batch.insert(&collection, &values)
                })?;
            }
            self.inner.stats.lock().await.records_pushed += 1;
        }

        tracing::debug!(collection = R::COLLECTION, count = pending.len(), "pushed records");
        Ok(())
    }

    /// Bulk insert the server's copy of `R`; existing rows dedupe via the
    /// table's conflict policy.
    async fn pull<R: RemoteResource>(&self, patient_id: &str, progress: f32) -> Result<(), SyncError> {
        self.set_status(SyncStatus::Syncing {
            stage: SyncStage::PullingRecords {
                collection: R::COLLECTION,
            },
            progress,
        })
        .await;

        let records: Vec<R> = self.inner.api.list(patient_id).await?;
        if records.is_empty() {
            return Ok(());
        }

        let clock = self.inner.clock.as_ref();
        let rows: Vec<ContentValues> = records.iter().map(|r| r.to_values(clock)).collect();
        let provider = &self.inner.provider;
        let inserted = provider.bulk_insert(&provider.collection_uri(R::RESOURCE), &rows)?;

        let mut stats = self.inner.stats.lock().await;
        stats.records_pulled += inserted;
        stats.records_skipped += rows.len() - inserted;
        Ok(())
    }

    async fn set_status(&self, status: SyncStatus) {
        *self.inner.status.lock().await = status;
    }
}
