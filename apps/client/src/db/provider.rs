//! URI-addressed CRUD gateway over the local store.
//!
//! Every read and write of cached data goes through [`ContentProvider`]. It
//! resolves a [`ContentUri`] to its table via the contract, validates column
//! names, runs the statement and notifies observers after successful writes.
//!
//! Selections are raw SQL `WHERE` fragments using positional `?` parameters;
//! their arguments are always bound, never interpolated.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params_from_iter, Connection};

use super::contract::{Resource, ROW_ID};
use super::error::DbError;
use super::notify::ChangeNotifier;
use super::store::LocalStore;
use super::uri::ContentUri;
use super::values::{ContentValues, Cursor, Value};

type Result<T> = std::result::Result<T, DbError>;

enum StoreSource {
    File(PathBuf),
    Memory,
}

pub struct ContentProvider {
    authority: String,
    source: StoreSource,
    store: Mutex<Option<LocalStore>>,
    notifier: ChangeNotifier,
}

impl ContentProvider {
    /// Provider over the database file at `path`, opened on first use.
    pub fn new(authority: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::with_source(authority.into(), StoreSource::File(path.into()))
    }

    /// Provider over a private in-memory database (for testing).
    pub fn in_memory(authority: impl Into<String>) -> Self {
        Self::with_source(authority.into(), StoreSource::Memory)
    }

    /// Provider over an already opened store.
    pub fn with_store(authority: impl Into<String>, store: LocalStore) -> Self {
        let provider = Self::with_source(authority.into(), StoreSource::Memory);
        if let Ok(mut slot) = provider.store.lock() {
            *slot = Some(store);
        }
        provider
    }

    fn with_source(authority: String, source: StoreSource) -> Self {
        Self {
            authority,
            source,
            store: Mutex::new(None),
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    pub fn collection_uri(&self, resource: Resource) -> ContentUri {
        ContentUri::collection(self.authority.clone(), resource)
    }

    pub fn item_uri(&self, resource: Resource, id: i64) -> ContentUri {
        ContentUri::item(self.authority.clone(), resource, id)
    }

    /// MIME type for `uri`.
    pub fn get_type(&self, uri: &ContentUri) -> Result<String> {
        let resource = self.route(uri, "get_type")?;
        Ok(if uri.is_item() {
            resource.item_type(&self.authority)
        } else {
            resource.dir_type(&self.authority)
        })
    }

    /// Read rows.
    ///
    /// For an item URI the caller's selection is ignored and the row is
    /// selected by its id. `projection` of `None` returns `_id` and every
    /// declared column.
    pub fn query(
        &self,
        uri: &ContentUri,
        projection: Option<&[&str]>,
        selection: Option<&str>,
        selection_args: &[Value],
        sort_order: Option<&str>,
    ) -> Result<Cursor> {
        let resource = self.route(uri, "query")?;
        self.with_open_store(|store| {
            select_rows(
                store.conn(),
                uri,
                resource,
                projection,
                selection,
                selection_args,
                sort_order,
            )
        })
    }

    /// Insert one row and return its item URI.
    ///
    /// A row the store declines to write (an IGNORE conflict) fails with
    /// [`DbError::InsertFailed`].
    pub fn insert(&self, uri: &ContentUri, values: &ContentValues) -> Result<ContentUri> {
        let resource = self.route(uri, "insert")?;

        let row = self.with_open_store(|store| insert_one(store.conn(), uri, resource, values))?;
        self.notifier.notify_change(uri);
        Ok(row)
    }

    /// Update rows of a resource that accepts updates; returns the row count.
    pub fn update(
        &self,
        uri: &ContentUri,
        values: &ContentValues,
        selection: Option<&str>,
        selection_args: &[Value],
    ) -> Result<usize> {
        let resource = self.route(uri, "update")?;
        if !resource.allows_update() {
            return Err(DbError::unsupported("update", uri));
        }
        if values.is_empty() {
            return Err(DbError::InvalidData("update with no values".to_string()));
        }
        check_columns(resource, values)?;

        let (filter, args) = filter_for(uri, selection, selection_args);
        let assignments: Vec<String> = values.columns().map(|c| format!("{} = ?", c)).collect();
        let mut sql = format!("UPDATE {} SET {}", resource.table(), assignments.join(", "));
        if let Some(filter) = &filter {
            sql.push_str(" WHERE ");
            sql.push_str(filter);
        }

        let params: Vec<&Value> = values.values().chain(args.iter()).collect();
        let count = self.with_open_store(|store| {
            store
                .conn()
                .execute(&sql, params_from_iter(params))
                .map_err(Into::into)
        })?;

        tracing::debug!(%uri, count, "updated");
        if count > 0 {
            self.notifier.notify_change(uri);
        }
        Ok(count)
    }

    /// Delete rows; returns the row count.
    ///
    /// Observers are notified when rows were removed or when no selection was
    /// given, even if the table was already empty.
    pub fn delete(
        &self,
        uri: &ContentUri,
        selection: Option<&str>,
        selection_args: &[Value],
    ) -> Result<usize> {
        let resource = self.route(uri, "delete")?;
        if !resource.allows_delete() {
            return Err(DbError::unsupported("delete", uri));
        }

        let count = self.with_open_store(|store| {
            delete_rows(store.conn(), uri, resource, selection, selection_args)
        })?;

        tracing::debug!(%uri, count, "deleted");
        if selection.is_none() || count > 0 {
            self.notifier.notify_change(uri);
        }
        Ok(count)
    }

    /// Insert a batch in one transaction and return how many rows were written.
    ///
    /// Rows skipped by an IGNORE conflict are not counted and do not fail the
    /// batch. Any other error rolls the whole batch back.
    pub fn bulk_insert(&self, uri: &ContentUri, rows: &[ContentValues]) -> Result<usize> {
        let resource = self.route(uri, "bulk_insert")?;
        if uri.is_item() {
            return Err(DbError::unsupported("bulk_insert", uri));
        }

        let inserted = self.with_open_store(|store| {
            let tx = store.conn_mut().transaction()?;
            let mut inserted: usize = 0;
            for values in rows {
                if insert_row(&tx, resource, values)?.is_some() {
                    inserted += 1;
                }
            }
            tx.commit()?;
            Ok(inserted)
        })?;

        tracing::debug!(%uri, inserted, offered = rows.len(), "bulk inserted");
        if inserted > 0 {
            self.notifier.notify_change(uri);
        }
        Ok(inserted)
    }

    /// Run several reads and writes in one transaction.
    ///
    /// The transaction commits only if `f` returns `Ok`; any error rolls back
    /// every write made through the [`Batch`]. Observers hear about the
    /// changed URIs after the commit.
    pub fn apply_batch<T>(&self, f: impl FnOnce(&mut Batch<'_>) -> Result<T>) -> Result<T> {
        let (value, changed) = self.with_open_store(|store| {
            let tx = store.conn_mut().transaction()?;
            let mut batch = Batch {
                provider: self,
                conn: &*tx,
                changed: Vec::new(),
            };
            let value = f(&mut batch)?;
            let changed = batch.changed;
            tx.commit()?;
            Ok((value, changed))
        })?;

        tracing::debug!(changed = changed.len(), "batch committed");
        for uri in &changed {
            self.notifier.notify_change(uri);
        }
        Ok(value)
    }

    /// Resolve the resource of a URI owned by this provider.
    fn route(&self, uri: &ContentUri, operation: &'static str) -> Result<Resource> {
        if uri.authority() != self.authority {
            return Err(DbError::unsupported(operation, uri));
        }
        Ok(uri.resource())
    }

    /// Run `f` against the store, opening it on first use.
    fn with_open_store<T>(&self, f: impl FnOnce(&mut LocalStore) -> Result<T>) -> Result<T> {
        let mut guard = self.lock_store()?;
        if let Some(store) = guard.as_mut() {
            return f(store);
        }
        let store = match &self.source {
            StoreSource::File(path) => {
                tracing::info!(path = %path.display(), "opening local store");
                LocalStore::open(path)?
            }
            StoreSource::Memory => LocalStore::open_in_memory()?,
        };
        f(guard.insert(store))
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, Option<LocalStore>>> {
        self.store.lock().map_err(|_| DbError::LockPoisoned)
    }
}

/// Operations available inside [`ContentProvider::apply_batch`].
///
/// Same routing, validation and error rules as the provider's own methods.
pub struct Batch<'a> {
    provider: &'a ContentProvider,
    conn: &'a Connection,
    changed: Vec<ContentUri>,
}

impl Batch<'_> {
    pub fn query(
        &self,
        uri: &ContentUri,
        projection: Option<&[&str]>,
        selection: Option<&str>,
        selection_args: &[Value],
        sort_order: Option<&str>,
    ) -> Result<Cursor> {
        let resource = self.provider.route(uri, "query")?;
        select_rows(
            self.conn,
            uri,
            resource,
            projection,
            selection,
            selection_args,
            sort_order,
        )
    }

    pub fn insert(&mut self, uri: &ContentUri, values: &ContentValues) -> Result<ContentUri> {
        let resource = self.provider.route(uri, "insert")?;
        let row = insert_one(self.conn, uri, resource, values)?;
        self.mark_changed(uri);
        Ok(row)
    }

    pub fn delete(
        &mut self,
        uri: &ContentUri,
        selection: Option<&str>,
        selection_args: &[Value],
    ) -> Result<usize> {
        let resource = self.provider.route(uri, "delete")?;
        if !resource.allows_delete() {
            return Err(DbError::unsupported("delete", uri));
        }
        let count = delete_rows(self.conn, uri, resource, selection, selection_args)?;
        if selection.is_none() || count > 0 {
            self.mark_changed(uri);
        }
        Ok(count)
    }

    fn mark_changed(&mut self, uri: &ContentUri) {
        if !self.changed.contains(uri) {
            self.changed.push(uri.clone());
        }
    }
}

/// Insert one row into a collection and return its item URI.
fn insert_one(
    conn: &Connection,
    uri: &ContentUri,
    resource: Resource,
    values: &ContentValues,
) -> Result<ContentUri> {
    if uri.is_item() {
        return Err(DbError::unsupported("insert", uri));
    }
    match insert_row(conn, resource, values)? {
        Some(id) => {
            let row_uri = uri.with_id(id);
            tracing::debug!(uri = %row_uri, "inserted");
            Ok(row_uri)
        }
        None => {
            tracing::warn!(%uri, "insert wrote no row");
            Err(DbError::InsertFailed(uri.to_string()))
        }
    }
}

/// Write one row; `None` when the store wrote nothing.
fn insert_row(conn: &Connection, resource: Resource, values: &ContentValues) -> Result<Option<i64>> {
    check_columns(resource, values)?;

    let sql = if values.is_empty() {
        format!("INSERT INTO {} DEFAULT VALUES", resource.table())
    } else {
        let columns: Vec<&str> = values.columns().collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            resource.table(),
            columns.join(", "),
            placeholders
        )
    };

    let changed = conn.execute(&sql, params_from_iter(values.values()))?;
    if changed == 0 {
        Ok(None)
    } else {
        Ok(Some(conn.last_insert_rowid()))
    }
}

fn select_rows(
    conn: &Connection,
    uri: &ContentUri,
    resource: Resource,
    projection: Option<&[&str]>,
    selection: Option<&str>,
    selection_args: &[Value],
    sort_order: Option<&str>,
) -> Result<Cursor> {
    let columns = projected_columns(resource, projection)?;
    let (filter, args) = filter_for(uri, selection, selection_args);

    let mut sql = format!("SELECT {} FROM {}", columns.join(", "), resource.table());
    if let Some(filter) = &filter {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
    if let Some(order) = sort_order {
        sql.push_str(" ORDER BY ");
        sql.push_str(order);
    }

    tracing::debug!(%uri, sql = %sql, "query");
    let mut stmt = conn.prepare(&sql)?;
    let width = columns.len();
    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            (0..width)
                .map(|i| row.get::<_, Value>(i))
                .collect::<rusqlite::Result<Vec<_>>>()
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(Cursor::new(columns, rows))
}

fn delete_rows(
    conn: &Connection,
    uri: &ContentUri,
    resource: Resource,
    selection: Option<&str>,
    selection_args: &[Value],
) -> Result<usize> {
    let (filter, args) = filter_for(uri, selection, selection_args);
    let mut sql = format!("DELETE FROM {}", resource.table());
    if let Some(filter) = &filter {
        sql.push_str(" WHERE ");
        sql.push_str(filter);
    }
    Ok(conn.execute(&sql, params_from_iter(args.iter()))?)
}

fn check_columns(resource: Resource, values: &ContentValues) -> Result<()> {
    for column in values.columns() {
        if resource.column(column).is_none() {
            return Err(DbError::UnknownColumn {
                table: resource.table(),
                column: column.to_string(),
            });
        }
    }
    Ok(())
}

fn projected_columns(resource: Resource, projection: Option<&[&str]>) -> Result<Vec<String>> {
    match projection {
        Some(names) => names
            .iter()
            .map(|name| match resource.column(name) {
                Some(column) => Ok(column.name.to_string()),
                None => Err(DbError::UnknownColumn {
                    table: resource.table(),
                    column: name.to_string(),
                }),
            })
            .collect(),
        None => Ok(std::iter::once(ROW_ID)
            .chain(resource.columns().iter().map(|c| c.name))
            .map(String::from)
            .collect()),
    }
}

/// WHERE clause and bound arguments for a URI and caller selection.
fn filter_for(
    uri: &ContentUri,
    selection: Option<&str>,
    selection_args: &[Value],
) -> (Option<String>, Vec<Value>) {
    match uri.id() {
        Some(id) => (Some(format!("{} = ?", ROW_ID)), vec![Value::Integer(id)]),
        None => (selection.map(str::to_string), selection_args.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::contract::columns::*;

    const AUTHORITY: &str = "org.symptomtracker.provider";

    fn status(patient: &str, note: &str, created: i64) -> ContentValues {
        let mut values = ContentValues::new();
        values
            .put_text(PATIENT_ID, patient)
            .put_text(NOTE, note)
            .put(CREATED, created);
        values
    }

    #[test]
    fn insert_then_query_item() {
        let provider = ContentProvider::in_memory(AUTHORITY);
        let collection = provider.collection_uri(Resource::Status);

        let row = provider.insert(&collection, &status("p1", "fine", 10)).unwrap();
        assert_eq!(row.resource(), Resource::Status);
        let id = row.id().unwrap();

        // The item URI wins over the caller's selection.
        let cursor = provider
            .query(&row, Some(&[ROW_ID, NOTE][..]), Some("1 = 0"), &[], None)
            .unwrap();
        assert_eq!(cursor.len(), 1);
        let first = cursor.row(0).unwrap();
        assert_eq!(first.get_i64(ROW_ID).unwrap(), id);
        assert_eq!(first.get_text(NOTE).unwrap(), "fine");
    }

    #[test]
    fn query_with_selection_and_order() {
        let provider = ContentProvider::in_memory(AUTHORITY);
        let collection = provider.collection_uri(Resource::Status);
        for (note, created) in [("b", 20), ("a", 10), ("c", 30)] {
            provider.insert(&collection, &status("p1", note, created)).unwrap();
        }
        provider.insert(&collection, &status("p2", "other", 10)).unwrap();

        let cursor = provider
            .query(
                &collection,
                None,
                Some("patient_id = ?"),
                &[Value::Text("p1".into())],
                Some("created DESC"),
            )
            .unwrap();
        let notes: Vec<String> = cursor.rows().map(|r| r.get_text(NOTE).unwrap()).collect();
        assert_eq!(notes, vec!["c", "b", "a"]);
        assert_eq!(cursor.columns()[0], ROW_ID);
    }

    #[test]
    fn get_type_for_dir_and_item() {
        let provider = ContentProvider::in_memory(AUTHORITY);
        let collection = provider.collection_uri(Resource::Prefs);
        assert_eq!(
            provider.get_type(&collection).unwrap(),
            "vnd.android.cursor.dir/org.symptomtracker.provider/prefs"
        );
        assert_eq!(
            provider.get_type(&collection.with_id(2)).unwrap(),
            "vnd.android.cursor.item/org.symptomtracker.provider/prefs"
        );
    }

    #[test]
    fn foreign_authority_is_unsupported() {
        let provider = ContentProvider::in_memory(AUTHORITY);
        let uri = ContentUri::collection("com.elsewhere", Resource::Pain);
        assert!(matches!(
            provider.query(&uri, None, None, &[], None),
            Err(DbError::UnsupportedOperation { operation: "query", .. })
        ));
    }

    #[test]
    fn insert_on_item_uri_is_unsupported() {
        let provider = ContentProvider::in_memory(AUTHORITY);
        let uri = provider.item_uri(Resource::Status, 1);
        assert!(matches!(
            provider.insert(&uri, &status("p1", "x", 1)),
            Err(DbError::UnsupportedOperation { operation: "insert", .. })
        ));
    }

    #[test]
    fn unknown_columns_are_rejected() {
        let provider = ContentProvider::in_memory(AUTHORITY);
        let collection = provider.collection_uri(Resource::Status);

        let mut values = status("p1", "x", 1);
        values.put_text(SEVERITY, "bad");
        assert!(matches!(
            provider.insert(&collection, &values),
            Err(DbError::UnknownColumn { table: "status_log", .. })
        ));
        assert!(matches!(
            provider.query(&collection, Some(&["note; DROP TABLE status_log"][..]), None, &[], None),
            Err(DbError::UnknownColumn { .. })
        ));
    }

    #[test]
    fn update_item_changes_one_row() {
        let provider = ContentProvider::in_memory(AUTHORITY);
        let collection = provider.collection_uri(Resource::Prefs);
        let mut prefs = ContentValues::new();
        prefs
            .put_text(PATIENT_ID, "p1")
            .put_bool(NOTIFICATIONS, false)
            .put_text(TIMEZONE, "UTC")
            .put(CREATED, 5_i64);
        let row = provider.insert(&collection, &prefs).unwrap();

        let mut change = ContentValues::new();
        change.put_bool(NOTIFICATIONS, true);
        assert_eq!(provider.update(&row, &change, None, &[]).unwrap(), 1);

        let cursor = provider.query(&row, None, None, &[], None).unwrap();
        assert!(cursor.row(0).unwrap().get_bool(NOTIFICATIONS).unwrap());

        assert!(matches!(
            provider.update(&row, &ContentValues::new(), None, &[]),
            Err(DbError::InvalidData(_))
        ));
    }

    #[test]
    fn lazily_opens_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("symptoms.db");
        let provider = ContentProvider::new(AUTHORITY, &path);
        assert!(!path.exists());

        provider
            .insert(&provider.collection_uri(Resource::Status), &status("p1", "x", 1))
            .unwrap();
        assert!(path.exists());
    }

    #[test]
    fn batch_commits_all_writes_and_notifies_after() {
        let provider = ContentProvider::in_memory(AUTHORITY);
        let status_uri = provider.collection_uri(Resource::Status);
        let mut rx = provider.notifier().subscribe();

        let rows = provider
            .apply_batch(|batch| {
                let first = batch.insert(&status_uri, &status("p1", "a", 1))?;
                let second = batch.insert(&status_uri, &status("p1", "b", 2))?;
                // Writes are visible to reads in the same batch.
                assert_eq!(batch.query(&status_uri, None, None, &[], None)?.len(), 2);
                assert!(rx.try_recv().is_err());
                Ok(vec![first, second])
            })
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rx.try_recv().unwrap(), status_uri);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn failed_batch_rolls_back_and_stays_silent() {
        let provider = ContentProvider::in_memory(AUTHORITY);
        let status_uri = provider.collection_uri(Resource::Status);
        provider.insert(&status_uri, &status("p1", "kept", 1)).unwrap();
        let mut rx = provider.notifier().subscribe();

        let result = provider.apply_batch(|batch| {
            batch.delete(&status_uri, None, &[])?;
            batch.insert(&status_uri, &status("p1", "new", 2))?;
            batch.insert(&status_uri, &status("p1", "dup", 2))
        });

        assert!(matches!(result, Err(DbError::InsertFailed(_))));
        let cursor = provider.query(&status_uri, Some(&[NOTE][..]), None, &[], None).unwrap();
        assert_eq!(cursor.len(), 1);
        assert_eq!(cursor.row(0).unwrap().get_text(NOTE).unwrap(), "kept");
        assert!(rx.try_recv().is_err());
    }
}
