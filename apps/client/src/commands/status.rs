//! Free-text status notes.

use symptom_core::StatusLog;

use super::{CommandError, Commands};
use crate::db::contract::columns::{CREATED, PATIENT_ID};
use crate::db::mapping::status_log_values;
use crate::db::{decode_all, ContentUri, Resource, Value};

impl Commands {
    pub fn add_status_note(
        &self,
        patient_id: &str,
        note: &str,
        image_location: Option<&str>,
    ) -> Result<ContentUri, CommandError> {
        let log = StatusLog {
            row_id: 0,
            patient_id: patient_id.to_string(),
            log_id: None,
            note: note.to_string(),
            image_location: image_location.map(str::to_string),
            created: 0,
        };
        let provider = self.provider.as_ref();
        let uri = provider.insert(
            &provider.collection_uri(Resource::Status),
            &status_log_values(&log, self.clock.as_ref()),
        )?;

        self.trigger.request_sync(patient_id);
        Ok(uri)
    }

    /// Status notes of a patient, newest first.
    pub fn status_notes(&self, patient_id: &str) -> Result<Vec<StatusLog>, CommandError> {
        let provider = self.provider.as_ref();
        let cursor = provider.query(
            &provider.collection_uri(Resource::Status),
            None,
            Some(format!("{} = ?", PATIENT_ID).as_str()),
            &[Value::Text(patient_id.to_string())],
            Some(format!("{} DESC", CREATED).as_str()),
        )?;
        Ok(decode_all(&cursor)?)
    }
}
