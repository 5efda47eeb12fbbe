//! Core symptom-tracking library shared by the client applications.
//!
//! Provides:
//! - Domain records (patients, check-ins, pain/medication/status logs, reminders)
//! - Numeric codes for the enums persisted in the local store
//! - A clock abstraction for default timestamps

pub mod clock;
pub mod error;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{CoreError, Result};
pub use types::{
    CheckInLog, Eating, MedicationLog, Patient, PatientPrefs, PhysicianLink, PainLog,
    Prescription, Reminder, ReminderType, Severity, StatusLog, UserCredential, UserRole,
};
