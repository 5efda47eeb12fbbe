//! SQLite schema generated from the resource contract.

use rusqlite::Connection;

use super::contract::{Resource, ROW_ID};
use super::error::DbError;

/// Current schema version, stored in `PRAGMA user_version`.
///
/// Bumping it drops every resource table on the next open.
pub const SCHEMA_VERSION: u32 = 1;

/// `CREATE TABLE` statement for one resource.
pub fn create_table_sql(resource: Resource) -> String {
    let spec = resource.spec();
    let mut lines = Vec::with_capacity(spec.columns.len() + 2);
    lines.push(format!("    {} INTEGER PRIMARY KEY AUTOINCREMENT", ROW_ID));
    for column in spec.columns {
        let mut line = format!("    {} {}", column.name, column.sql_type.as_sql());
        if column.not_null {
            line.push_str(" NOT NULL");
        }
        lines.push(line);
    }
    lines.push(format!(
        "    UNIQUE ({}) ON CONFLICT {}",
        spec.unique.join(", "),
        spec.on_conflict.as_sql()
    ));

    format!("CREATE TABLE {} (\n{}\n)", spec.table, lines.join(",\n"))
}

pub fn drop_table_sql(resource: Resource) -> String {
    format!("DROP TABLE IF EXISTS {}", resource.table())
}

/// Create every resource table.
pub fn create_all(conn: &Connection) -> Result<(), DbError> {
    for resource in Resource::ALL {
        conn.execute_batch(&create_table_sql(resource))?;
    }
    Ok(())
}

/// Drop every resource table. Existing rows are lost.
pub fn drop_all(conn: &Connection) -> Result<(), DbError> {
    for resource in Resource::ALL {
        conn.execute_batch(&drop_table_sql(resource))?;
    }
    Ok(())
}
