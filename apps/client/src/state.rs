//! Application state.

use std::sync::Arc;

use symptom_core::{Clock, SystemClock};
use tokio::task::JoinHandle;

use crate::commands::Commands;
use crate::config::ClientConfig;
use crate::db::ContentProvider;
use crate::sync::{spawn_sync_worker, ApiClient, ChannelTrigger, NoopTrigger, SyncEngine};

/// Everything a running client shares.
///
/// Must be built inside a tokio runtime when a backend is configured, since
/// the sync worker is spawned here.
pub struct AppState {
    pub provider: Arc<ContentProvider>,
    pub commands: Commands,
    pub sync: Option<SyncEngine>,
    worker: Option<JoinHandle<()>>,
}

impl AppState {
    pub fn new(config: &ClientConfig) -> Self {
        let provider = Arc::new(ContentProvider::new(
            config.authority.clone(),
            config.database_path.clone(),
        ));
        Self::with_provider(config, provider, Arc::new(SystemClock))
    }

    pub fn with_provider(
        config: &ClientConfig,
        provider: Arc<ContentProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let Some(backend_url) = config.backend_url.as_deref() else {
            tracing::info!("no backend configured, running offline");
            let commands = Commands::new(provider.clone(), Arc::new(NoopTrigger), clock);
            return Self {
                provider,
                commands,
                sync: None,
                worker: None,
            };
        };

        let api = ApiClient::new(backend_url, config.api_token.clone());
        let engine = SyncEngine::new(api.clone(), provider.clone(), clock.clone());
        let (trigger, requests) = ChannelTrigger::new();
        let worker = spawn_sync_worker(engine.clone(), requests);
        let commands = Commands::new(provider.clone(), Arc::new(trigger), clock).with_api(api);

        Self {
            provider,
            commands,
            sync: Some(engine),
            worker: Some(worker),
        }
    }

    /// Drop the command handle and wait for queued syncs to finish.
    pub async fn shutdown(self) {
        let Self {
            commands, worker, ..
        } = self;
        drop(commands);
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                tracing::warn!(error = %e, "sync worker ended abnormally");
            }
        }
    }
}
