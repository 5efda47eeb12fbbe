//! HTTP client for the remote symptom API.
//!
//! Routes:
//! - `GET|PUT /patients/{patient_id}`
//! - `GET|POST /patients/{patient_id}/{collection}`
//! - `GET|PUT|DELETE /patients/{patient_id}/{collection}/{server_id}`

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use symptom_core::{
    MedicationLog, Patient, PatientPrefs, PainLog, PhysicianLink, Prescription, Reminder,
    StatusLog,
};

use super::SyncError;
use crate::db::Mapped;

/// A patient-scoped record the server exposes as a collection.
pub trait RemoteResource: Mapped + Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    /// Server-assigned identifier, `None` until the server has seen the record.
    fn server_id(&self) -> Option<&str>;
}

impl RemoteResource for Prescription {
    const COLLECTION: &'static str = "prescriptions";

    fn server_id(&self) -> Option<&str> {
        Some(self.medication_id.as_str())
    }
}

impl RemoteResource for PhysicianLink {
    const COLLECTION: &'static str = "physicians";

    fn server_id(&self) -> Option<&str> {
        Some(self.physician_id.as_str())
    }
}

impl RemoteResource for PainLog {
    const COLLECTION: &'static str = "pain";

    fn server_id(&self) -> Option<&str> {
        self.log_id.as_deref()
    }
}

impl RemoteResource for MedicationLog {
    const COLLECTION: &'static str = "medlogs";

    fn server_id(&self) -> Option<&str> {
        self.log_id.as_deref()
    }
}

impl RemoteResource for StatusLog {
    const COLLECTION: &'static str = "status";

    fn server_id(&self) -> Option<&str> {
        self.log_id.as_deref()
    }
}

impl RemoteResource for Reminder {
    const COLLECTION: &'static str = "reminders";

    fn server_id(&self) -> Option<&str> {
        self.reminder_id.as_deref()
    }
}

impl RemoteResource for PatientPrefs {
    const COLLECTION: &'static str = "prefs";

    fn server_id(&self) -> Option<&str> {
        self.pref_id.as_deref()
    }
}

/// Thin JSON client; every call either returns the decoded body or a [`SyncError`].
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    backend_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(backend_url: &str, token: Option<String>) -> Self {
        Self {
            client: Client::new(),
            backend_url: backend_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    pub fn backend_url(&self) -> &str {
        &self.backend_url
    }

    /// Check if backend is reachable.
    pub async fn check_connectivity(&self) -> Result<bool, SyncError> {
        let url = format!("{}/health", self.backend_url);
        match self.client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) => Err(SyncError::Network(e.to_string())),
        }
    }

    pub async fn get_patient(&self, patient_id: &str) -> Result<Patient, SyncError> {
        let url = format!("{}/patients/{}", self.backend_url, patient_id);
        let resp = self.send(self.request(Method::GET, &url)).await?;
        decode(resp).await
    }

    pub async fn update_patient(&self, patient: &Patient) -> Result<Patient, SyncError> {
        let url = format!("{}/patients/{}", self.backend_url, patient.patient_id);
        let resp = self
            .send(self.request(Method::PUT, &url).json(patient))
            .await?;
        decode(resp).await
    }

    pub async fn list<R: RemoteResource>(&self, patient_id: &str) -> Result<Vec<R>, SyncError> {
        let url = self.collection_url::<R>(patient_id);
        let resp = self.send(self.request(Method::GET, &url)).await?;
        decode(resp).await
    }

    pub async fn get<R: RemoteResource>(
        &self,
        patient_id: &str,
        server_id: &str,
    ) -> Result<R, SyncError> {
        let url = self.item_url::<R>(patient_id, server_id);
        let resp = self.send(self.request(Method::GET, &url)).await?;
        decode(resp).await
    }

    /// Create a record; the response carries the server-assigned id.
    pub async fn add<R: RemoteResource>(&self, patient_id: &str, record: &R) -> Result<R, SyncError> {
        let url = self.collection_url::<R>(patient_id);
        let resp = self
            .send(self.request(Method::POST, &url).json(record))
            .await?;
        decode(resp).await
    }

    pub async fn update<R: RemoteResource>(
        &self,
        patient_id: &str,
        server_id: &str,
        record: &R,
    ) -> Result<R, SyncError> {
        let url = self.item_url::<R>(patient_id, server_id);
        let resp = self
            .send(self.request(Method::PUT, &url).json(record))
            .await?;
        decode(resp).await
    }

    pub async fn delete<R: RemoteResource>(
        &self,
        patient_id: &str,
        server_id: &str,
    ) -> Result<(), SyncError> {
        let url = self.item_url::<R>(patient_id, server_id);
        self.send(self.request(Method::DELETE, &url)).await?;
        Ok(())
    }

    // === Private methods ===

    fn collection_url<R: RemoteResource>(&self, patient_id: &str) -> String {
        format!(
            "{}/patients/{}/{}",
            self.backend_url,
            patient_id,
            R::COLLECTION
        )
    }

    fn item_url<R: RemoteResource>(&self, patient_id: &str, server_id: &str) -> String {
        format!("{}/{}", self.collection_url::<R>(patient_id), server_id)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, SyncError> {
        let resp = builder
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(SyncError::Backend { status, message });
        }
        Ok(resp)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, SyncError> {
    resp.json()
        .await
        .map_err(|e| SyncError::Parse(e.to_string()))
}
