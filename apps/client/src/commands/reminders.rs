//! Reminder edits.
//!
//! A reminder the server has not seen yet is written locally and pushed on
//! the next sync. Once it carries a server id, edits and deletes go to the
//! server first, otherwise the next pull would restore the server's copy.

use symptom_core::Reminder;

use super::{CommandError, Commands};
use crate::db::contract::columns::{DAY_OF_WEEK, HOUR, MINUTE, PATIENT_ID};
use crate::db::mapping::{reminder_update_values, reminder_values};
use crate::db::{decode_all, ContentUri, Resource, Value};

impl Commands {
    /// Reminders of a patient in weekly order.
    pub fn reminders(&self, patient_id: &str) -> Result<Vec<Reminder>, CommandError> {
        let provider = self.provider.as_ref();
        let cursor = provider.query(
            &provider.collection_uri(Resource::Reminder),
            None,
            Some(format!("{} = ?", PATIENT_ID).as_str()),
            &[Value::Text(patient_id.to_string())],
            Some(format!("{}, {}, {}", DAY_OF_WEEK, HOUR, MINUTE).as_str()),
        )?;
        Ok(decode_all(&cursor)?)
    }

    /// Create or edit a reminder.
    ///
    /// A reminder without a row id is inserted; one that reuses the
    /// `created` stamp of a stored reminder replaces it.
    pub async fn save_reminder(&self, reminder: &Reminder) -> Result<ContentUri, CommandError> {
        if let Some(server_id) = reminder.reminder_id.as_deref() {
            self.push_reminder_edit(reminder, server_id).await?;
        }

        let provider = self.provider.as_ref();
        let uri = if reminder.row_id > 0 {
            let uri = provider.item_uri(Resource::Reminder, reminder.row_id);
            let changed = provider.update(&uri, &reminder_update_values(reminder), None, &[])?;
            if changed == 0 {
                return Err(CommandError::new(format!("reminder {} not found", uri)));
            }
            uri
        } else {
            provider.insert(
                &provider.collection_uri(Resource::Reminder),
                &reminder_values(reminder, self.clock.as_ref()),
            )?
        };

        if reminder.reminder_id.is_none() {
            self.trigger.request_sync(&reminder.patient_id);
        }
        Ok(uri)
    }

    pub async fn set_reminder_enabled(
        &self,
        reminder: &Reminder,
        enabled: bool,
    ) -> Result<ContentUri, CommandError> {
        let edited = Reminder {
            enabled,
            ..reminder.clone()
        };
        self.save_reminder(&edited).await
    }

    /// Delete a reminder. Returns whether a local row was removed.
    pub async fn delete_reminder(&self, reminder: &Reminder) -> Result<bool, CommandError> {
        if let (Some(server_id), Some(api)) = (reminder.reminder_id.as_deref(), &self.api) {
            api.delete::<Reminder>(&reminder.patient_id, server_id).await?;
        }

        let provider = self.provider.as_ref();
        let removed = provider.delete(
            &provider.item_uri(Resource::Reminder, reminder.row_id),
            None,
            &[],
        )?;
        Ok(removed > 0)
    }

    async fn push_reminder_edit(
        &self,
        reminder: &Reminder,
        server_id: &str,
    ) -> Result<(), CommandError> {
        match &self.api {
            Some(api) => {
                api.update(&reminder.patient_id, server_id, reminder).await?;
                Ok(())
            }
            None => {
                tracing::warn!(
                    reminder_id = server_id,
                    "no backend configured, reminder edit stays local"
                );
                Ok(())
            }
        }
    }
}
