//! Core types for the symptom tracker.
//!
//! Every record carries a `row_id`, the local auto-increment key of its cache
//! row. It is never sent over the wire and is `0` for records that have not
//! been stored locally. Timestamps are milliseconds since the Unix epoch.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Pain severity reported at check-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    NotDefined,
    Well,
    Moderate,
    Severe,
}

impl Default for Severity {
    fn default() -> Self {
        Self::NotDefined
    }
}

impl Severity {
    /// Numeric code persisted in the local store.
    pub fn code(self) -> i64 {
        match self {
            Self::NotDefined => 0,
            Self::Well => 100,
            Self::Moderate => 200,
            Self::Severe => 300,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::NotDefined),
            100 => Ok(Self::Well),
            200 => Ok(Self::Moderate),
            300 => Ok(Self::Severe),
            _ => Err(CoreError::UnknownCode {
                kind: "severity",
                code,
            }),
        }
    }
}

/// How well the patient is eating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Eating {
    NotDefined,
    NotEating,
    SomeEating,
    Eating,
}

impl Default for Eating {
    fn default() -> Self {
        Self::NotDefined
    }
}

impl Eating {
    pub fn code(self) -> i64 {
        match self {
            Self::NotDefined => 0,
            Self::NotEating => 100,
            Self::SomeEating => 200,
            Self::Eating => 300,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(Self::NotDefined),
            100 => Ok(Self::NotEating),
            200 => Ok(Self::SomeEating),
            300 => Ok(Self::Eating),
            _ => Err(CoreError::UnknownCode {
                kind: "eating",
                code,
            }),
        }
    }
}

/// Role attached to a login credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Patient,
    Physician,
}

impl UserRole {
    pub fn code(self) -> i64 {
        match self {
            Self::Admin => 1,
            Self::Patient => 2,
            Self::Physician => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Self::Admin),
            2 => Ok(Self::Patient),
            3 => Ok(Self::Physician),
            _ => Err(CoreError::UnknownCode {
                kind: "user role",
                code,
            }),
        }
    }
}

/// What a reminder asks the patient to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    Pain,
    Medication,
    Status,
}

impl Default for ReminderType {
    fn default() -> Self {
        Self::Pain
    }
}

impl ReminderType {
    pub fn code(self) -> i64 {
        match self {
            Self::Pain => 1,
            Self::Medication => 2,
            Self::Status => 3,
        }
    }

    pub fn from_code(code: i64) -> Result<Self> {
        match code {
            1 => Ok(Self::Pain),
            2 => Ok(Self::Medication),
            3 => Ok(Self::Status),
            _ => Err(CoreError::UnknownCode {
                kind: "reminder type",
                code,
            }),
        }
    }
}

/// Patient record as cached from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    #[serde(skip)]
    pub row_id: i64,
    pub patient_id: String,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: String,
    #[serde(default)]
    pub last_login: i64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub process_status: i64,
}

impl Patient {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Stored login for one user of the device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserCredential {
    #[serde(skip)]
    pub row_id: i64,
    pub user_id: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub last_login: i64,
    pub user_role: UserRole,
}

/// A medication prescribed to a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    #[serde(skip)]
    pub row_id: i64,
    pub patient_id: String,
    pub medication_id: String,
    pub name: String,
}

/// A physician attending a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicianLink {
    #[serde(skip)]
    pub row_id: i64,
    pub patient_id: String,
    pub physician_id: String,
    pub name: String,
}

/// Marker row for one check-in session.
///
/// `checkin_id` is the correlation key shared with the pain and medication
/// logs recorded during the same session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInLog {
    #[serde(skip)]
    pub row_id: i64,
    pub patient_id: String,
    #[serde(default)]
    pub checkin_id: i64,
    #[serde(default)]
    pub created: i64,
}

impl CheckInLog {
    /// A session whose key and timestamp are assigned at mapping time.
    pub fn new(patient_id: impl Into<String>) -> Self {
        Self {
            row_id: 0,
            patient_id: patient_id.into(),
            checkin_id: 0,
            created: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PainLog {
    #[serde(skip)]
    pub row_id: i64,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,
    pub severity: Severity,
    pub eating: Eating,
    #[serde(default)]
    pub checkin_id: i64,
    #[serde(default)]
    pub created: i64,
}

/// Whether (and when) a prescribed medication was taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationLog {
    #[serde(skip)]
    pub row_id: i64,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,
    pub med_id: String,
    pub med_name: String,
    /// Zero when the medication was not taken.
    #[serde(default)]
    pub taken: i64,
    #[serde(default)]
    pub checkin_id: i64,
    #[serde(default)]
    pub created: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusLog {
    #[serde(skip)]
    pub row_id: i64,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_id: Option<String>,
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_location: Option<String>,
    #[serde(default)]
    pub created: i64,
}

/// Weekly reminder that fires at `day_of_week` (1 = Sunday) `hour:minute`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(skip)]
    pub row_id: i64,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reminder_id: Option<String>,
    pub name: String,
    pub reminder_type: ReminderType,
    pub day_of_week: i64,
    pub hour: i64,
    pub minute: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alarm: Option<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub created: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientPrefs {
    #[serde(skip)]
    pub row_id: i64,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pref_id: Option<String>,
    #[serde(default)]
    pub notifications: bool,
    pub timezone: String,
    #[serde(default)]
    pub created: i64,
}
