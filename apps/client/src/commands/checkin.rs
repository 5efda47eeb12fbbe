//! Check-in sessions: one check-in row plus the pain and medication logs
//! recorded with it, all sharing one checkin id.

use serde::{Deserialize, Serialize};

use symptom_core::{CheckInLog, Eating, MedicationLog, PainLog, Severity};

use super::{CommandError, Commands};
use crate::db::contract::columns::{CHECKIN_ID, CREATED, PATIENT_ID};
use crate::db::mapping::{checkin_values, medication_log_values, pain_log_values};
use crate::db::{decode_all, Batch, ContentUri, DbError, Resource, Value};

/// A prescribed medication the patient reports on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationTaken {
    pub med_id: String,
    pub med_name: String,
    /// When it was taken; zero if it was not.
    pub taken: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckInInput {
    pub severity: Severity,
    pub eating: Eating,
    pub medications: Vec<MedicationTaken>,
}

/// Rows written by one check-in.
#[derive(Debug, Clone)]
pub struct CheckInReceipt {
    pub checkin_id: i64,
    pub checkin: ContentUri,
    pub pain: ContentUri,
    pub medications: Vec<ContentUri>,
}

impl Commands {
    /// Record a check-in session and request a sync.
    ///
    /// The check-in, pain and medication rows are written in one transaction.
    /// Each medication log takes the first `created` at or after `checkin_id`
    /// not yet used by the patient, so logs stay distinct under the
    /// `(patient_id, created)` key even when sessions are milliseconds apart.
    pub fn record_checkin(
        &self,
        patient_id: &str,
        input: &CheckInInput,
    ) -> Result<CheckInReceipt, CommandError> {
        let clock = self.clock.as_ref();
        let provider = self.provider.as_ref();

        let values = checkin_values(&CheckInLog::new(patient_id), clock);
        let checkin_id = values
            .get_i64(CHECKIN_ID)
            .ok_or_else(|| CommandError::new("check-in has no checkin id"))?;
        let pain = PainLog {
            row_id: 0,
            patient_id: patient_id.to_string(),
            log_id: None,
            severity: input.severity,
            eating: input.eating,
            checkin_id,
            created: checkin_id,
        };
        let pain = pain_log_values(&pain, clock);

        let receipt = provider.apply_batch(|batch| {
            let checkin = batch.insert(&provider.collection_uri(Resource::CheckIn), &values)?;
            let pain = batch.insert(&provider.collection_uri(Resource::Pain), &pain)?;

            let medication_uri = provider.collection_uri(Resource::Medication);
            let mut medications = Vec::with_capacity(input.medications.len());
            let mut from = checkin_id;
            for med in &input.medications {
                let created = next_free_created(batch, &medication_uri, patient_id, from)?;
                let log = MedicationLog {
                    row_id: 0,
                    patient_id: patient_id.to_string(),
                    log_id: None,
                    med_id: med.med_id.clone(),
                    med_name: med.med_name.clone(),
                    taken: med.taken,
                    checkin_id,
                    created,
                };
                medications.push(batch.insert(&medication_uri, &medication_log_values(&log, clock))?);
                from = created + 1;
            }

            Ok(CheckInReceipt {
                checkin_id,
                checkin,
                pain,
                medications,
            })
        })?;

        tracing::info!(
            patient_id,
            checkin_id,
            medications = receipt.medications.len(),
            "check-in recorded"
        );
        self.trigger.request_sync(patient_id);
        Ok(receipt)
    }

    /// Check-ins of a patient, newest first.
    pub fn checkin_history(&self, patient_id: &str) -> Result<Vec<CheckInLog>, CommandError> {
        let provider = self.provider.as_ref();
        let cursor = provider.query(
            &provider.collection_uri(Resource::CheckIn),
            None,
            Some(format!("{} = ?", PATIENT_ID).as_str()),
            &[Value::Text(patient_id.to_string())],
            Some(format!("{} DESC", CREATED).as_str()),
        )?;
        Ok(decode_all(&cursor)?)
    }

    /// Pain and medication logs recorded during one check-in.
    pub fn checkin_logs(
        &self,
        patient_id: &str,
        checkin_id: i64,
    ) -> Result<(Vec<PainLog>, Vec<MedicationLog>), CommandError> {
        let provider = self.provider.as_ref();
        let selection = format!("{} = ? AND {} = ?", PATIENT_ID, CHECKIN_ID);
        let args = [
            Value::Text(patient_id.to_string()),
            Value::Integer(checkin_id),
        ];
        let order = format!("{} ASC", CREATED);

        let pain = provider.query(
            &provider.collection_uri(Resource::Pain),
            None,
            Some(selection.as_str()),
            &args,
            Some(order.as_str()),
        )?;
        let medications = provider.query(
            &provider.collection_uri(Resource::Medication),
            None,
            Some(selection.as_str()),
            &args,
            Some(order.as_str()),
        )?;
        Ok((decode_all(&pain)?, decode_all(&medications)?))
    }
}

/// First `created` at or after `from` with no medication log of the patient.
fn next_free_created(
    batch: &Batch<'_>,
    medication_uri: &ContentUri,
    patient_id: &str,
    from: i64,
) -> Result<i64, DbError> {
    let cursor = batch.query(
        medication_uri,
        Some(&[CREATED][..]),
        Some(format!("{} = ? AND {} >= ?", PATIENT_ID, CREATED).as_str()),
        &[Value::Text(patient_id.to_string()), Value::Integer(from)],
        Some(format!("{} ASC", CREATED).as_str()),
    )?;
    let mut candidate = from;
    for row in cursor.rows() {
        let taken = row.get_i64(CREATED)?;
        if taken > candidate {
            break;
        }
        candidate = taken + 1;
    }
    Ok(candidate)
}
