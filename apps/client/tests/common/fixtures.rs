//! Factory functions for test records.

use serde_json::{json, Value};

use symptom_core::{
    Eating, Patient, PatientPrefs, PainLog, PhysicianLink, Reminder, ReminderType, Severity,
    StatusLog, UserCredential, UserRole,
};

pub const PATIENT: &str = "patient-1";

pub fn patient(first_name: &str) -> Patient {
    Patient {
        row_id: 0,
        patient_id: PATIENT.to_string(),
        first_name: first_name.to_string(),
        last_name: "Doe".to_string(),
        birthdate: "1970-01-01".to_string(),
        last_login: 0,
        active: true,
        process_status: 0,
    }
}

pub fn pain_log(created: i64) -> PainLog {
    PainLog {
        row_id: 0,
        patient_id: PATIENT.to_string(),
        log_id: None,
        severity: Severity::Moderate,
        eating: Eating::SomeEating,
        checkin_id: 0,
        created,
    }
}

pub fn status_log(note: &str, created: i64) -> StatusLog {
    StatusLog {
        row_id: 0,
        patient_id: PATIENT.to_string(),
        log_id: None,
        note: note.to_string(),
        image_location: None,
        created,
    }
}

pub fn physician(physician_id: &str) -> PhysicianLink {
    PhysicianLink {
        row_id: 0,
        patient_id: PATIENT.to_string(),
        physician_id: physician_id.to_string(),
        name: format!("Dr. {}", physician_id),
    }
}

pub fn reminder(name: &str, created: i64) -> Reminder {
    Reminder {
        row_id: 0,
        patient_id: PATIENT.to_string(),
        reminder_id: None,
        name: name.to_string(),
        reminder_type: ReminderType::Medication,
        day_of_week: 2,
        hour: 8,
        minute: 30,
        alarm: None,
        enabled: true,
        created,
    }
}

pub fn credential(user_id: &str, username: &str) -> UserCredential {
    UserCredential {
        row_id: 0,
        user_id: user_id.to_string(),
        username: username.to_string(),
        password: "secret".to_string(),
        last_login: 0,
        user_role: UserRole::Patient,
    }
}

pub fn prefs(timezone: &str, created: i64) -> PatientPrefs {
    PatientPrefs {
        row_id: 0,
        patient_id: PATIENT.to_string(),
        pref_id: None,
        notifications: true,
        timezone: timezone.to_string(),
        created,
    }
}

/// Server-side patient document.
pub fn patient_json() -> Value {
    json!({
        "patient_id": PATIENT,
        "first_name": "Jane",
        "last_name": "Doe",
        "birthdate": "1970-01-01",
        "last_login": 1_000,
        "active": true,
        "process_status": 1
    })
}

pub fn prescription_json(medication_id: &str, name: &str) -> Value {
    json!({
        "patient_id": PATIENT,
        "medication_id": medication_id,
        "name": name
    })
}

pub fn physician_json(physician_id: &str) -> Value {
    json!({
        "patient_id": PATIENT,
        "physician_id": physician_id,
        "name": format!("Dr. {}", physician_id)
    })
}
