//! Column/value containers passed in and out of the content provider.

use std::collections::BTreeMap;

pub use rusqlite::types::Value;

use super::error::DbError;

/// Column name to value map used for inserts and updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentValues {
    values: BTreeMap<String, Value>,
}

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, column: &str, value: impl Into<Value>) -> &mut Self {
        self.values.insert(column.to_string(), value.into());
        self
    }

    pub fn put_text(&mut self, column: &str, value: &str) -> &mut Self {
        self.put(column, Value::Text(value.to_string()))
    }

    /// Store `None` as SQL NULL.
    pub fn put_opt_text(&mut self, column: &str, value: Option<&str>) -> &mut Self {
        match value {
            Some(v) => self.put_text(column, v),
            None => self.put_null(column),
        }
    }

    pub fn put_bool(&mut self, column: &str, value: bool) -> &mut Self {
        self.put(column, Value::Integer(i64::from(value)))
    }

    pub fn put_null(&mut self, column: &str) -> &mut Self {
        self.put(column, Value::Null)
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn get_i64(&self, column: &str) -> Option<i64> {
        match self.values.get(column) {
            Some(Value::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_text(&self, column: &str) -> Option<&str> {
        match self.values.get(column) {
            Some(Value::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Columns in a stable (sorted) order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Values in the same order as [`ContentValues::columns`].
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.values()
    }
}

/// Fully materialised query result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Cursor {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<CursorRow<'_>> {
        self.rows.get(index).map(|values| CursorRow {
            columns: &self.columns,
            values,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = CursorRow<'_>> {
        self.rows.iter().map(move |values| CursorRow {
            columns: &self.columns,
            values,
        })
    }
}

/// One row of a [`Cursor`], read by column name.
#[derive(Debug, Clone, Copy)]
pub struct CursorRow<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> CursorRow<'a> {
    pub fn get(&self, column: &str) -> Result<&'a Value, DbError> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| &self.values[i])
            .ok_or_else(|| DbError::InvalidData(format!("column {} not in cursor", column)))
    }

    pub fn get_i64(&self, column: &str) -> Result<i64, DbError> {
        match self.get(column)? {
            Value::Integer(v) => Ok(*v),
            other => Err(type_mismatch(column, "integer", other)),
        }
    }

    /// NULL reads as zero.
    pub fn get_i64_or_zero(&self, column: &str) -> Result<i64, DbError> {
        match self.get(column)? {
            Value::Null => Ok(0),
            _ => self.get_i64(column),
        }
    }

    pub fn get_bool(&self, column: &str) -> Result<bool, DbError> {
        Ok(self.get_i64(column)? != 0)
    }

    pub fn get_text(&self, column: &str) -> Result<String, DbError> {
        match self.get(column)? {
            Value::Text(v) => Ok(v.clone()),
            other => Err(type_mismatch(column, "text", other)),
        }
    }

    pub fn get_opt_text(&self, column: &str) -> Result<Option<String>, DbError> {
        match self.get(column)? {
            Value::Null => Ok(None),
            Value::Text(v) => Ok(Some(v.clone())),
            other => Err(type_mismatch(column, "text", other)),
        }
    }

    /// Copy the row into a value map.
    pub fn to_values(&self) -> ContentValues {
        let mut values = ContentValues::new();
        for (column, value) in self.columns.iter().zip(self.values) {
            values.put(column, value.clone());
        }
        values
    }
}

fn type_mismatch(column: &str, expected: &str, found: &Value) -> DbError {
    DbError::InvalidData(format!(
        "column {} expected {}, found {:?}",
        column,
        expected,
        found.data_type()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_get() {
        let mut values = ContentValues::new();
        values
            .put_text("name", "Dr. Who")
            .put("created", 10_i64)
            .put_bool("enabled", true)
            .put_opt_text("alarm", None);

        assert_eq!(values.len(), 4);
        assert_eq!(values.get_text("name"), Some("Dr. Who"));
        assert_eq!(values.get_i64("created"), Some(10));
        assert_eq!(values.get_i64("enabled"), Some(1));
        assert_eq!(values.get("alarm"), Some(&Value::Null));
        assert_eq!(values.get_i64("name"), None);
    }

    #[test]
    fn columns_and_values_line_up() {
        let mut values = ContentValues::new();
        values.put("b", 2_i64).put("a", 1_i64);
        let columns: Vec<_> = values.columns().collect();
        let vals: Vec<_> = values.values().cloned().collect();
        assert_eq!(columns, vec!["a", "b"]);
        assert_eq!(vals, vec![Value::Integer(1), Value::Integer(2)]);
    }

    #[test]
    fn cursor_row_accessors() {
        let cursor = Cursor::new(
            vec!["_id".into(), "note".into(), "image_location".into()],
            vec![vec![Value::Integer(3), Value::Text("ok".into()), Value::Null]],
        );
        let row = cursor.row(0).unwrap();
        assert_eq!(row.get_i64("_id").unwrap(), 3);
        assert_eq!(row.get_text("note").unwrap(), "ok");
        assert_eq!(row.get_opt_text("image_location").unwrap(), None);
        assert!(row.get_i64("note").is_err());
        assert!(row.get("missing").is_err());
        assert_eq!(row.to_values().get_text("note"), Some("ok"));
        assert!(cursor.row(1).is_none());
    }
}
