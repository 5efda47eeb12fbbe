//! Table, column and URI contract for every cached resource.
//!
//! [`TABLES`] is the only place resource names are spelled out. DDL
//! generation, URI matching and MIME types are all derived from it.

/// Local auto-increment key present on every table.
pub const ROW_ID: &str = "_id";

pub const CONTENT_SCHEME: &str = "content://";
pub const DIR_MIME_PREFIX: &str = "vnd.android.cursor.dir";
pub const ITEM_MIME_PREFIX: &str = "vnd.android.cursor.item";

/// Column names shared by the resource tables.
pub mod columns {
    pub const PATIENT_ID: &str = "patient_id";
    pub const CREATED: &str = "created";
    pub const CHECKIN_ID: &str = "checkin_id";
    pub const NAME: &str = "name";

    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const BIRTHDATE: &str = "birthdate";
    pub const LAST_LOGIN: &str = "last_login";
    pub const ACTIVE: &str = "active";
    pub const PROCESS_STATUS: &str = "process_status";

    pub const USER_ID: &str = "user_id";
    pub const USERNAME: &str = "username";
    pub const PASSWORD: &str = "password";
    pub const USER_ROLE: &str = "user_role";

    pub const MEDICATION_ID: &str = "medication_id";
    pub const PHYSICIAN_ID: &str = "physician_id";

    pub const LOG_ID: &str = "log_id";
    pub const SEVERITY: &str = "severity";
    pub const EATING: &str = "eating";
    pub const MED_ID: &str = "med_id";
    pub const MED_NAME: &str = "med_name";
    pub const TAKEN: &str = "taken";
    pub const NOTE: &str = "note";
    pub const IMAGE_LOCATION: &str = "image_location";

    pub const REMINDER_ID: &str = "reminder_id";
    pub const REMINDER_TYPE: &str = "reminder_type";
    pub const DAY_OF_WEEK: &str = "day_of_week";
    pub const HOUR: &str = "hour";
    pub const MINUTE: &str = "minute";
    pub const ALARM: &str = "alarm";
    pub const ENABLED: &str = "enabled";

    pub const PREF_ID: &str = "pref_id";
    pub const NOTIFICATIONS: &str = "notifications";
    pub const TIMEZONE: &str = "timezone";
}

use columns::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Text,
}

impl SqlType {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub not_null: bool,
}

const fn text(name: &'static str) -> Column {
    Column {
        name,
        sql_type: SqlType::Text,
        not_null: true,
    }
}

const fn opt_text(name: &'static str) -> Column {
    Column {
        name,
        sql_type: SqlType::Text,
        not_null: false,
    }
}

const fn int(name: &'static str) -> Column {
    Column {
        name,
        sql_type: SqlType::Integer,
        not_null: true,
    }
}

const fn opt_int(name: &'static str) -> Column {
    Column {
        name,
        sql_type: SqlType::Integer,
        not_null: false,
    }
}

const ROW_ID_COLUMN: Column = Column {
    name: ROW_ID,
    sql_type: SqlType::Integer,
    not_null: true,
};

/// What the store does when an insert violates a table's unique key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Delete the existing row and write the new one.
    Replace,
    /// Keep the existing row and drop the new one without error.
    Ignore,
}

impl ConflictPolicy {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Replace => "REPLACE",
            Self::Ignore => "IGNORE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Patient,
    Credential,
    Prescription,
    Physician,
    CheckIn,
    Pain,
    Medication,
    Status,
    Reminder,
    Prefs,
}

/// Everything the store and the provider need to know about one resource.
#[derive(Debug)]
pub struct TableSpec {
    pub resource: Resource,
    pub table: &'static str,
    pub path: &'static str,
    pub columns: &'static [Column],
    pub unique: &'static [&'static str],
    pub on_conflict: ConflictPolicy,
    /// Column holding the server-assigned identifier, if the resource has one.
    pub server_id: Option<&'static str>,
    pub updatable: bool,
    pub deletable: bool,
}

/// Indexed by `Resource as usize`; the order must match [`Resource::ALL`].
pub static TABLES: [TableSpec; 10] = [
    TableSpec {
        resource: Resource::Patient,
        table: "patient",
        path: "patient",
        columns: &[
            text(PATIENT_ID),
            text(FIRST_NAME),
            text(LAST_NAME),
            opt_text(BIRTHDATE),
            opt_int(LAST_LOGIN),
            int(ACTIVE),
            opt_int(PROCESS_STATUS),
        ],
        unique: &[PATIENT_ID],
        on_conflict: ConflictPolicy::Replace,
        server_id: Some(PATIENT_ID),
        updatable: true,
        deletable: true,
    },
    TableSpec {
        resource: Resource::Credential,
        table: "credential",
        path: "credential",
        columns: &[
            text(USER_ID),
            text(USERNAME),
            text(PASSWORD),
            opt_int(LAST_LOGIN),
            int(USER_ROLE),
        ],
        unique: &[USER_ID],
        on_conflict: ConflictPolicy::Replace,
        server_id: Some(USER_ID),
        updatable: true,
        deletable: true,
    },
    TableSpec {
        resource: Resource::Prescription,
        table: "prescription",
        path: "prescription",
        columns: &[text(PATIENT_ID), text(MEDICATION_ID), text(NAME)],
        unique: &[PATIENT_ID, MEDICATION_ID],
        on_conflict: ConflictPolicy::Ignore,
        server_id: Some(MEDICATION_ID),
        updatable: false,
        deletable: true,
    },
    TableSpec {
        resource: Resource::Physician,
        table: "physician",
        path: "physician",
        columns: &[text(PATIENT_ID), text(PHYSICIAN_ID), text(NAME)],
        unique: &[PATIENT_ID, PHYSICIAN_ID],
        on_conflict: ConflictPolicy::Ignore,
        server_id: Some(PHYSICIAN_ID),
        updatable: false,
        deletable: true,
    },
    TableSpec {
        resource: Resource::CheckIn,
        table: "checkin_log",
        path: "checkin",
        columns: &[text(PATIENT_ID), int(CHECKIN_ID), int(CREATED)],
        unique: &[PATIENT_ID, CREATED],
        on_conflict: ConflictPolicy::Ignore,
        server_id: None,
        updatable: false,
        deletable: true,
    },
    TableSpec {
        resource: Resource::Pain,
        table: "pain_log",
        path: "pain",
        columns: &[
            text(PATIENT_ID),
            opt_text(LOG_ID),
            int(SEVERITY),
            int(EATING),
            opt_int(CHECKIN_ID),
            int(CREATED),
        ],
        unique: &[PATIENT_ID, CREATED],
        on_conflict: ConflictPolicy::Ignore,
        server_id: Some(LOG_ID),
        updatable: false,
        deletable: true,
    },
    TableSpec {
        resource: Resource::Medication,
        table: "med_log",
        path: "medlog",
        columns: &[
            text(PATIENT_ID),
            opt_text(LOG_ID),
            text(MED_ID),
            text(MED_NAME),
            opt_int(TAKEN),
            opt_int(CHECKIN_ID),
            int(CREATED),
        ],
        unique: &[PATIENT_ID, CREATED],
        on_conflict: ConflictPolicy::Ignore,
        server_id: Some(LOG_ID),
        updatable: false,
        deletable: true,
    },
    TableSpec {
        resource: Resource::Status,
        table: "status_log",
        path: "status",
        columns: &[
            text(PATIENT_ID),
            opt_text(LOG_ID),
            text(NOTE),
            opt_text(IMAGE_LOCATION),
            int(CREATED),
        ],
        unique: &[PATIENT_ID, CREATED],
        on_conflict: ConflictPolicy::Ignore,
        server_id: Some(LOG_ID),
        updatable: false,
        deletable: true,
    },
    TableSpec {
        resource: Resource::Reminder,
        table: "reminder",
        path: "reminder",
        columns: &[
            text(PATIENT_ID),
            opt_text(REMINDER_ID),
            text(NAME),
            int(REMINDER_TYPE),
            int(DAY_OF_WEEK),
            int(HOUR),
            int(MINUTE),
            opt_text(ALARM),
            int(ENABLED),
            int(CREATED),
        ],
        unique: &[PATIENT_ID, CREATED],
        on_conflict: ConflictPolicy::Replace,
        server_id: Some(REMINDER_ID),
        updatable: true,
        deletable: true,
    },
    TableSpec {
        resource: Resource::Prefs,
        table: "prefs",
        path: "prefs",
        columns: &[
            text(PATIENT_ID),
            opt_text(PREF_ID),
            int(NOTIFICATIONS),
            text(TIMEZONE),
            int(CREATED),
        ],
        unique: &[PATIENT_ID, CREATED],
        on_conflict: ConflictPolicy::Ignore,
        server_id: Some(PREF_ID),
        updatable: true,
        deletable: true,
    },
];

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Patient,
        Resource::Credential,
        Resource::Prescription,
        Resource::Physician,
        Resource::CheckIn,
        Resource::Pain,
        Resource::Medication,
        Resource::Status,
        Resource::Reminder,
        Resource::Prefs,
    ];

    pub fn spec(self) -> &'static TableSpec {
        &TABLES[self as usize]
    }

    pub fn table(self) -> &'static str {
        self.spec().table
    }

    pub fn path(self) -> &'static str {
        self.spec().path
    }

    /// Declared columns, excluding [`ROW_ID`].
    pub fn columns(self) -> &'static [Column] {
        self.spec().columns
    }

    /// Look up a column by name, [`ROW_ID`] included.
    pub fn column(self, name: &str) -> Option<&'static Column> {
        if name == ROW_ID {
            return Some(&ROW_ID_COLUMN);
        }
        self.columns().iter().find(|c| c.name == name)
    }

    pub fn server_id_column(self) -> Option<&'static str> {
        self.spec().server_id
    }

    pub fn allows_update(self) -> bool {
        self.spec().updatable
    }

    pub fn allows_delete(self) -> bool {
        self.spec().deletable
    }

    /// Resolve a URI path segment.
    pub fn from_path(path: &str) -> Option<Resource> {
        TABLES.iter().find(|t| t.path == path).map(|t| t.resource)
    }

    /// MIME type of a collection URI.
    pub fn dir_type(self, authority: &str) -> String {
        format!("{}/{}/{}", DIR_MIME_PREFIX, authority, self.path())
    }

    /// MIME type of a single-row URI.
    pub fn item_type(self, authority: &str) -> String {
        format!("{}/{}/{}", ITEM_MIME_PREFIX, authority, self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tables_are_indexed_by_resource() {
        for (i, resource) in Resource::ALL.iter().enumerate() {
            assert_eq!(TABLES[i].resource, *resource);
            assert_eq!(resource.spec().resource, *resource);
        }
    }

    #[test]
    fn names_and_paths_are_distinct() {
        let tables: HashSet<_> = TABLES.iter().map(|t| t.table).collect();
        let paths: HashSet<_> = TABLES.iter().map(|t| t.path).collect();
        assert_eq!(tables.len(), TABLES.len());
        assert_eq!(paths.len(), TABLES.len());
    }

    #[test]
    fn unique_keys_name_declared_columns() {
        for resource in Resource::ALL {
            for key in resource.spec().unique {
                assert!(resource.column(key).is_some(), "{key} on {resource:?}");
            }
            if let Some(server_id) = resource.server_id_column() {
                assert!(resource.column(server_id).is_some());
            }
        }
    }

    #[test]
    fn from_path_resolves_every_resource() {
        for resource in Resource::ALL {
            assert_eq!(Resource::from_path(resource.path()), Some(resource));
        }
        assert_eq!(Resource::from_path("alerts"), None);
    }

    #[test]
    fn update_scope() {
        let updatable: Vec<_> = Resource::ALL
            .into_iter()
            .filter(|r| r.allows_update())
            .collect();
        assert_eq!(
            updatable,
            vec![
                Resource::Patient,
                Resource::Credential,
                Resource::Reminder,
                Resource::Prefs
            ]
        );
        assert!(Resource::ALL.iter().all(|r| r.allows_delete()));
    }

    #[test]
    fn mime_types() {
        assert_eq!(
            Resource::Pain.dir_type("org.example"),
            "vnd.android.cursor.dir/org.example/pain"
        );
        assert_eq!(
            Resource::Reminder.item_type("org.example"),
            "vnd.android.cursor.item/org.example/reminder"
        );
    }

    #[test]
    fn column_lookup_includes_row_id() {
        assert_eq!(Resource::Status.column(ROW_ID).map(|c| c.name), Some(ROW_ID));
        assert!(Resource::Status.column("severity").is_none());
    }
}
