//! Local store: opens the SQLite file and keeps its schema current.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use super::error::DbError;
use super::schema::{self, SCHEMA_VERSION};

type Result<T> = std::result::Result<T, DbError>;

/// Owner of the on-device database connection.
pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    /// Open database at path, creating or upgrading it if necessary.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_at_version(path, SCHEMA_VERSION)
    }

    /// Open in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        initialize(&mut conn, SCHEMA_VERSION)?;
        Ok(Self { conn })
    }

    /// Open database at path as if the code's schema version were `version`.
    pub fn open_at_version<P: AsRef<Path>>(path: P, version: u32) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(journal_mode = %mode, "opened local store");
        initialize(&mut conn, version)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn conn_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Schema version recorded in the file.
    pub fn version(&self) -> Result<u32> {
        user_version(&self.conn)
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.conn.path().map(PathBuf::from)
    }
}

fn user_version(conn: &Connection) -> Result<u32> {
    conn.pragma_query_value(None, "user_version", |row| row.get(0))
        .map_err(Into::into)
}

/// Create the schema on a fresh file, rebuild it on upgrade, refuse downgrade.
fn initialize(conn: &mut Connection, target: u32) -> Result<()> {
    let current = user_version(conn)?;
    if current == target {
        return Ok(());
    }
    if current > target {
        return Err(DbError::Downgrade {
            found: current,
            expected: target,
        });
    }

    let tx = conn.transaction()?;
    if current == 0 {
        tracing::info!(version = target, "creating local store schema");
        schema::create_all(&tx)?;
    } else {
        // Cached rows are discarded; the server repopulates them on next sync.
        tracing::info!(
            from = current,
            to = target,
            "upgrading local store schema, dropping cached data"
        );
        schema::drop_all(&tx)?;
        schema::create_all(&tx)?;
    }
    tx.pragma_update(None, "user_version", target)?;
    tx.commit()?;
    Ok(())
}
