//! Conversions between domain records and provider rows.
//!
//! The `*_values` functions produce the column map for an insert. Any
//! `created` timestamp that is unset or non-positive is filled from the clock
//! when the map is built, so callers that care about the event time must set
//! it beforehand. The `*_update_values` variants leave out `created` so that
//! an update never moves a row's timestamp.

use symptom_core::{
    CheckInLog, Clock, Eating, MedicationLog, Patient, PatientPrefs, PainLog, PhysicianLink,
    Prescription, Reminder, ReminderType, Severity, StatusLog, UserCredential, UserRole,
};

use super::contract::columns::*;
use super::contract::{Resource, ROW_ID};
use super::error::DbError;
use super::values::{ContentValues, Cursor, CursorRow};

type Result<T> = std::result::Result<T, DbError>;

/// A domain record stored in one provider resource.
pub trait Mapped: Sized {
    const RESOURCE: Resource;

    /// Local row id, `0` when not stored.
    fn row_id(&self) -> i64;

    /// Column map for an insert.
    fn to_values(&self, clock: &dyn Clock) -> ContentValues;

    fn from_row(row: &CursorRow<'_>) -> Result<Self>;
}

/// Decode every row of a cursor.
pub fn decode_all<T: Mapped>(cursor: &Cursor) -> Result<Vec<T>> {
    cursor.rows().map(|row| T::from_row(&row)).collect()
}

fn created_or_now(created: i64, clock: &dyn Clock) -> i64 {
    if created > 0 {
        created
    } else {
        clock.now_millis()
    }
}

fn put_optional_key(values: &mut ContentValues, column: &str, key: i64) {
    if key > 0 {
        values.put(column, key);
    } else {
        values.put_null(column);
    }
}

// === Patient ===

pub fn patient_values(patient: &Patient) -> ContentValues {
    let mut values = patient_update_values(patient);
    values.put_text(PATIENT_ID, &patient.patient_id);
    values
}

pub fn patient_update_values(patient: &Patient) -> ContentValues {
    let mut values = ContentValues::new();
    values
        .put_text(FIRST_NAME, &patient.first_name)
        .put_text(LAST_NAME, &patient.last_name)
        .put_text(BIRTHDATE, &patient.birthdate)
        .put(LAST_LOGIN, patient.last_login)
        .put_bool(ACTIVE, patient.active)
        .put(PROCESS_STATUS, patient.process_status);
    values
}

impl Mapped for Patient {
    const RESOURCE: Resource = Resource::Patient;

    fn row_id(&self) -> i64 {
        self.row_id
    }

    fn to_values(&self, _clock: &dyn Clock) -> ContentValues {
        patient_values(self)
    }

    fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.get_i64(ROW_ID)?,
            patient_id: row.get_text(PATIENT_ID)?,
            first_name: row.get_text(FIRST_NAME)?,
            last_name: row.get_text(LAST_NAME)?,
            birthdate: row.get_opt_text(BIRTHDATE)?.unwrap_or_default(),
            last_login: row.get_i64_or_zero(LAST_LOGIN)?,
            active: row.get_bool(ACTIVE)?,
            process_status: row.get_i64_or_zero(PROCESS_STATUS)?,
        })
    }
}

// === Credential ===

pub fn credential_values(credential: &UserCredential) -> ContentValues {
    let mut values = credential_update_values(credential);
    values.put_text(USER_ID, &credential.user_id);
    values
}

pub fn credential_update_values(credential: &UserCredential) -> ContentValues {
    let mut values = ContentValues::new();
    values
        .put_text(USERNAME, &credential.username)
        .put_text(PASSWORD, &credential.password)
        .put(LAST_LOGIN, credential.last_login)
        .put(USER_ROLE, credential.user_role.code());
    values
}

impl Mapped for UserCredential {
    const RESOURCE: Resource = Resource::Credential;

    fn row_id(&self) -> i64 {
        self.row_id
    }

    fn to_values(&self, _clock: &dyn Clock) -> ContentValues {
        credential_values(self)
    }

    fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.get_i64(ROW_ID)?,
            user_id: row.get_text(USER_ID)?,
            username: row.get_text(USERNAME)?,
            password: row.get_text(PASSWORD)?,
            last_login: row.get_i64_or_zero(LAST_LOGIN)?,
            user_role: UserRole::from_code(row.get_i64(USER_ROLE)?)?,
        })
    }
}

// === Prescription and physician links ===

pub fn prescription_values(prescription: &Prescription) -> ContentValues {
    let mut values = ContentValues::new();
    values
        .put_text(PATIENT_ID, &prescription.patient_id)
        .put_text(MEDICATION_ID, &prescription.medication_id)
        .put_text(NAME, &prescription.name);
    values
}

impl Mapped for Prescription {
    const RESOURCE: Resource = Resource::Prescription;

    fn row_id(&self) -> i64 {
        self.row_id
    }

    fn to_values(&self, _clock: &dyn Clock) -> ContentValues {
        prescription_values(self)
    }

    fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.get_i64(ROW_ID)?,
            patient_id: row.get_text(PATIENT_ID)?,
            medication_id: row.get_text(MEDICATION_ID)?,
            name: row.get_text(NAME)?,
        })
    }
}

pub fn physician_values(physician: &PhysicianLink) -> ContentValues {
    let mut values = ContentValues::new();
    values
        .put_text(PATIENT_ID, &physician.patient_id)
        .put_text(PHYSICIAN_ID, &physician.physician_id)
        .put_text(NAME, &physician.name);
    values
}

impl Mapped for PhysicianLink {
    const RESOURCE: Resource = Resource::Physician;

    fn row_id(&self) -> i64 {
        self.row_id
    }

    fn to_values(&self, _clock: &dyn Clock) -> ContentValues {
        physician_values(self)
    }

    fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.get_i64(ROW_ID)?,
            patient_id: row.get_text(PATIENT_ID)?,
            physician_id: row.get_text(PHYSICIAN_ID)?,
            name: row.get_text(NAME)?,
        })
    }
}

// === Check-in sessions and logs ===

/// Column map for a check-in.
///
/// An unassigned checkin id (`<= 0`) starts a new session: the id and
/// `created` both take the same freshly read timestamp.
pub fn checkin_values(checkin: &CheckInLog, clock: &dyn Clock) -> ContentValues {
    let (checkin_id, created) = if checkin.checkin_id <= 0 {
        let now = clock.now_millis();
        (now, now)
    } else {
        (checkin.checkin_id, created_or_now(checkin.created, clock))
    };

    let mut values = ContentValues::new();
    values
        .put_text(PATIENT_ID, &checkin.patient_id)
        .put(CHECKIN_ID, checkin_id)
        .put(CREATED, created);
    values
}

impl Mapped for CheckInLog {
    const RESOURCE: Resource = Resource::CheckIn;

    fn row_id(&self) -> i64 {
        self.row_id
    }

    fn to_values(&self, clock: &dyn Clock) -> ContentValues {
        checkin_values(self, clock)
    }

    fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.get_i64(ROW_ID)?,
            patient_id: row.get_text(PATIENT_ID)?,
            checkin_id: row.get_i64(CHECKIN_ID)?,
            created: row.get_i64(CREATED)?,
        })
    }
}

pub fn pain_log_values(log: &PainLog, clock: &dyn Clock) -> ContentValues {
    let mut values = ContentValues::new();
    values
        .put_text(PATIENT_ID, &log.patient_id)
        .put_opt_text(LOG_ID, log.log_id.as_deref())
        .put(SEVERITY, log.severity.code())
        .put(EATING, log.eating.code())
        .put(CREATED, created_or_now(log.created, clock));
    put_optional_key(&mut values, CHECKIN_ID, log.checkin_id);
    values
}

impl Mapped for PainLog {
    const RESOURCE: Resource = Resource::Pain;

    fn row_id(&self) -> i64 {
        self.row_id
    }

    fn to_values(&self, clock: &dyn Clock) -> ContentValues {
        pain_log_values(self, clock)
    }

    fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.get_i64(ROW_ID)?,
            patient_id: row.get_text(PATIENT_ID)?,
            log_id: row.get_opt_text(LOG_ID)?,
            severity: Severity::from_code(row.get_i64(SEVERITY)?)?,
            eating: Eating::from_code(row.get_i64(EATING)?)?,
            checkin_id: row.get_i64_or_zero(CHECKIN_ID)?,
            created: row.get_i64(CREATED)?,
        })
    }
}

pub fn medication_log_values(log: &MedicationLog, clock: &dyn Clock) -> ContentValues {
    let mut values = ContentValues::new();
    values
        .put_text(PATIENT_ID, &log.patient_id)
        .put_opt_text(LOG_ID, log.log_id.as_deref())
        .put_text(MED_ID, &log.med_id)
        .put_text(MED_NAME, &log.med_name)
        .put(TAKEN, log.taken)
        .put(CREATED, created_or_now(log.created, clock));
    put_optional_key(&mut values, CHECKIN_ID, log.checkin_id);
    values
}

impl Mapped for MedicationLog {
    const RESOURCE: Resource = Resource::Medication;

    fn row_id(&self) -> i64 {
        self.row_id
    }

    fn to_values(&self, clock: &dyn Clock) -> ContentValues {
        medication_log_values(self, clock)
    }

    fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.get_i64(ROW_ID)?,
            patient_id: row.get_text(PATIENT_ID)?,
            log_id: row.get_opt_text(LOG_ID)?,
            med_id: row.get_text(MED_ID)?,
            med_name: row.get_text(MED_NAME)?,
            taken: row.get_i64_or_zero(TAKEN)?,
            checkin_id: row.get_i64_or_zero(CHECKIN_ID)?,
            created: row.get_i64(CREATED)?,
        })
    }
}

pub fn status_log_values(log: &StatusLog, clock: &dyn Clock) -> ContentValues {
    let mut values = ContentValues::new();
    values
        .put_text(PATIENT_ID, &log.patient_id)
        .put_opt_text(LOG_ID, log.log_id.as_deref())
        .put_text(NOTE, &log.note)
        .put_opt_text(IMAGE_LOCATION, log.image_location.as_deref())
        .put(CREATED, created_or_now(log.created, clock));
    values
}

impl Mapped for StatusLog {
    const RESOURCE: Resource = Resource::Status;

    fn row_id(&self) -> i64 {
        self.row_id
    }

    fn to_values(&self, clock: &dyn Clock) -> ContentValues {
        status_log_values(self, clock)
    }

    fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.get_i64(ROW_ID)?,
            patient_id: row.get_text(PATIENT_ID)?,
            log_id: row.get_opt_text(LOG_ID)?,
            note: row.get_text(NOTE)?,
            image_location: row.get_opt_text(IMAGE_LOCATION)?,
            created: row.get_i64(CREATED)?,
        })
    }
}

// === Reminders ===

/// Column map for a reminder insert. Inserting with an existing
/// `(patient_id, created)` pair replaces that reminder.
pub fn reminder_values(reminder: &Reminder, clock: &dyn Clock) -> ContentValues {
    let mut values = reminder_update_values(reminder);
    values
        .put_text(PATIENT_ID, &reminder.patient_id)
        .put(CREATED, created_or_now(reminder.created, clock));
    values
}

pub fn reminder_update_values(reminder: &Reminder) -> ContentValues {
    let mut values = ContentValues::new();
    values
        .put_opt_text(REMINDER_ID, reminder.reminder_id.as_deref())
        .put_text(NAME, &reminder.name)
        .put(REMINDER_TYPE, reminder.reminder_type.code())
        .put(DAY_OF_WEEK, reminder.day_of_week)
        .put(HOUR, reminder.hour)
        .put(MINUTE, reminder.minute)
        .put_opt_text(ALARM, reminder.alarm.as_deref())
        .put_bool(ENABLED, reminder.enabled);
    values
}

impl Mapped for Reminder {
    const RESOURCE: Resource = Resource::Reminder;

    fn row_id(&self) -> i64 {
        self.row_id
    }

    fn to_values(&self, clock: &dyn Clock) -> ContentValues {
        reminder_values(self, clock)
    }

    fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.get_i64(ROW_ID)?,
            patient_id: row.get_text(PATIENT_ID)?,
            reminder_id: row.get_opt_text(REMINDER_ID)?,
            name: row.get_text(NAME)?,
            reminder_type: ReminderType::from_code(row.get_i64(REMINDER_TYPE)?)?,
            day_of_week: row.get_i64(DAY_OF_WEEK)?,
            hour: row.get_i64(HOUR)?,
            minute: row.get_i64(MINUTE)?,
            alarm: row.get_opt_text(ALARM)?,
            enabled: row.get_bool(ENABLED)?,
            created: row.get_i64(CREATED)?,
        })
    }
}

// === Preferences ===

pub fn prefs_values(prefs: &PatientPrefs, clock: &dyn Clock) -> ContentValues {
    let mut values = prefs_update_values(prefs);
    values
        .put_text(PATIENT_ID, &prefs.patient_id)
        .put(CREATED, created_or_now(prefs.created, clock));
    values
}

pub fn prefs_update_values(prefs: &PatientPrefs) -> ContentValues {
    let mut values = ContentValues::new();
    values
        .put_opt_text(PREF_ID, prefs.pref_id.as_deref())
        .put_bool(NOTIFICATIONS, prefs.notifications)
        .put_text(TIMEZONE, &prefs.timezone);
    values
}

impl Mapped for PatientPrefs {
    const RESOURCE: Resource = Resource::Prefs;

    fn row_id(&self) -> i64 {
        self.row_id
    }

    fn to_values(&self, clock: &dyn Clock) -> ContentValues {
        prefs_values(self, clock)
    }

    fn from_row(row: &CursorRow<'_>) -> Result<Self> {
        Ok(Self {
            row_id: row.get_i64(ROW_ID)?,
            patient_id: row.get_text(PATIENT_ID)?,
            pref_id: row.get_opt_text(PREF_ID)?,
            notifications: row.get_bool(NOTIFICATIONS)?,
            timezone: row.get_text(TIMEZONE)?,
            created: row.get_i64(CREATED)?,
        })
    }
}
