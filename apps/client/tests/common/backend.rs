//! In-process stand-in for the remote symptom API.
//!
//! Records are kept as JSON documents per `(patient_id, collection)`. POST
//! assigns a server id (`srv-N`) to the collection's id field unless ids are
//! withheld.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::Value;

#[derive(Default)]
struct Store {
    patients: HashMap<String, Value>,
    collections: HashMap<(String, String), Vec<Value>>,
    next_id: u64,
    withhold_ids: bool,
    last_token: Option<String>,
}

type Shared = Arc<Mutex<Store>>;

pub struct FakeBackend {
    pub url: String,
    store: Shared,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let store = Shared::default();
        let app = Router::new()
            .route("/health", get(|| async { "ok" }))
            .route("/patients/:patient_id", get(get_patient).put(put_patient))
            .route(
                "/patients/:patient_id/:collection",
                get(list_records).post(add_record),
            )
            .route(
                "/patients/:patient_id/:collection/:server_id",
                get(get_record).put(put_record).delete(delete_record),
            )
            .with_state(store.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend");
        });

        Self {
            url: format!("http://{}", addr),
            store,
        }
    }

    pub fn seed_patient(&self, patient: Value) {
        let id = patient["patient_id"].as_str().unwrap_or_default().to_string();
        self.store.lock().unwrap().patients.insert(id, patient);
    }

    pub fn seed(&self, patient_id: &str, collection: &str, records: Vec<Value>) {
        self.store
            .lock()
            .unwrap()
            .collections
            .entry((patient_id.to_string(), collection.to_string()))
            .or_default()
            .extend(records);
    }

    pub fn records(&self, patient_id: &str, collection: &str) -> Vec<Value> {
        self.store
            .lock()
            .unwrap()
            .collections
            .get(&(patient_id.to_string(), collection.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn patient(&self, patient_id: &str) -> Option<Value> {
        self.store.lock().unwrap().patients.get(patient_id).cloned()
    }

    /// Answer later POSTs without a server id.
    pub fn withhold_ids(&self) {
        self.store.lock().unwrap().withhold_ids = true;
    }

    /// Bearer token of the last patient request.
    pub fn last_token(&self) -> Option<String> {
        self.store.lock().unwrap().last_token.clone()
    }
}

fn id_field(collection: &str) -> &'static str {
    match collection {
        "prescriptions" => "medication_id",
        "physicians" => "physician_id",
        "reminders" => "reminder_id",
        "prefs" => "pref_id",
        _ => "log_id",
    }
}

async fn get_patient(
    State(store): State<Shared>,
    Path(patient_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, StatusCode> {
    let mut store = store.lock().unwrap();
    store.last_token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string);
    store
        .patients
        .get(&patient_id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn put_patient(
    State(store): State<Shared>,
    Path(patient_id): Path<String>,
    Json(patient): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = store.lock().unwrap();
    if !store.patients.contains_key(&patient_id) {
        return Err(StatusCode::NOT_FOUND);
    }
    store.patients.insert(patient_id, patient.clone());
    Ok(Json(patient))
}

async fn list_records(
    State(store): State<Shared>,
    Path((patient_id, collection)): Path<(String, String)>,
) -> Json<Value> {
    let store = store.lock().unwrap();
    let records = store
        .collections
        .get(&(patient_id, collection))
        .cloned()
        .unwrap_or_default();
    Json(Value::Array(records))
}

async fn add_record(
    State(store): State<Shared>,
    Path((patient_id, collection)): Path<(String, String)>,
    Json(mut record): Json<Value>,
) -> Json<Value> {
    let mut store = store.lock().unwrap();
    if store.withhold_ids {
        record[id_field(&collection)] = Value::Null;
    } else {
        store.next_id += 1;
        let server_id = format!("srv-{}", store.next_id);
        record[id_field(&collection)] = Value::String(server_id);
    }
    store
        .collections
        .entry((patient_id, collection))
        .or_default()
        .push(record.clone());
    Json(record)
}

async fn get_record(
    State(store): State<Shared>,
    Path((patient_id, collection, server_id)): Path<(String, String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = store.lock().unwrap();
    let field = id_field(&collection);
    store
        .collections
        .get(&(patient_id, collection))
        .and_then(|records| records.iter().find(|r| r[field] == server_id.as_str()))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn put_record(
    State(store): State<Shared>,
    Path((patient_id, collection, server_id)): Path<(String, String, String)>,
    Json(record): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut store = store.lock().unwrap();
    let field = id_field(&collection);
    let slot = store
        .collections
        .get_mut(&(patient_id, collection))
        .and_then(|records| records.iter_mut().find(|r| r[field] == server_id.as_str()))
        .ok_or(StatusCode::NOT_FOUND)?;
    *slot = record.clone();
    Ok(Json(record))
}

async fn delete_record(
    State(store): State<Shared>,
    Path((patient_id, collection, server_id)): Path<(String, String, String)>,
) -> StatusCode {
    let mut store = store.lock().unwrap();
    let field = id_field(&collection);
    let Some(records) = store.collections.get_mut(&(patient_id, collection)) else {
        return StatusCode::NOT_FOUND;
    };
    let before = records.len();
    records.retain(|r| r[field] != server_id.as_str());
    if records.len() < before {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
