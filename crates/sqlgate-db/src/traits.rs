//! Row mapping.
//!
//! [`FromRow`] converts a driver row into a Rust type. [`Record`] is the
//! untyped implementation used when the shape of a result set is only known
//! at runtime.

use rusqlite::{types::Value, Row};
use serde::{ser::SerializeMap, Serialize, Serializer};

/// A trait for types that can be constructed from a SQLite row.
///
/// # Example
///
/// ```rust
/// use sqlgate_db::FromRow;
/// struct Post {
///     id: i64,
///     title: String
/// }
///
/// impl FromRow for Post {
///     fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
///         Ok(Post {
///             id: row.get("id")?,
///             title: row.get("title")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// A result row with its column names, in select-list order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Record {
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Returns the value of `column`, if the row has it.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of column/value pairs.
    pub fn len(&self) -> usize {
        self.columns.len().min(self.values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.iter()
                .map(|(column, value)| (column.to_string(), value_to_json(value)))
                .collect(),
        )
    }
}

impl FromRow for Record {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let stmt = row.as_ref();
        let count = stmt.column_count();
        let mut columns = Vec::with_capacity(count);
        let mut values = Vec::with_capacity(count);

        for idx in 0..count {
            columns.push(stmt.column_name(idx)?.to_string());
            values.push(row.get::<_, Value>(idx)?);
        }

        Ok(Self { columns, values })
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, &value_to_json(value))?;
        }
        map.end()
    }
}

/// Converts a driver value into JSON. Blobs become arrays of bytes.
pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => (*i).into(),
        Value::Real(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::Text(s) => serde_json::Value::String(s.clone()),
        Value::Blob(b) => serde_json::Value::from(b.clone()),
    }
}

/// Renders a driver value for display.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(f) => f.to_string(),
        Value::Text(s) => s.clone(),
        Value::Blob(b) => format!("<{} bytes>", b.len()),
    }
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::*;

    #[test]
    fn test_record_from_row() {
        let conn = Connection::open_in_memory().unwrap();
        let record = conn
            .query_row("SELECT 1 AS id, 'soup' AS name, NULL AS note", [], Record::from_row)
            .unwrap();

        assert_eq!(record.columns(), &["id", "name", "note"]);
        assert_eq!(record.get("id"), Some(&Value::Integer(1)));
        assert_eq!(record.get("name"), Some(&Value::Text("soup".into())));
        assert_eq!(record.get("note"), Some(&Value::Null));
        assert_eq!(record.get("missing"), None);
    }

    #[test]
    fn test_record_json() {
        let record = Record::new(
            vec!["id".into(), "score".into(), "raw".into()],
            vec![Value::Integer(7), Value::Real(1.5), Value::Blob(vec![1, 2])],
        );

        assert_eq!(
            record.to_json(),
            serde_json::json!({ "id": 7, "score": 1.5, "raw": [1, 2] })
        );
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"id":7,"score":1.5,"raw":[1,2]}"#
        );
    }

    #[test]
    fn test_record_with_missing_values() {
        let record = Record::new(
            vec!["id".into(), "title".into()],
            vec![Value::Integer(1)],
        );
        assert_eq!(record.get("id"), Some(&Value::Integer(1)));
        assert_eq!(record.get("title"), None);
        assert_eq!(record.get("nope"), None);
        assert_eq!(record.len(), 1);
        assert_eq!(record.to_json(), serde_json::json!({ "id": 1 }));
    }

    #[test]
    fn test_value_to_string() {
        assert_eq!(value_to_string(&Value::Null), "NULL");
        assert_eq!(value_to_string(&Value::Text("a".into())), "a");
        assert_eq!(value_to_string(&Value::Blob(vec![0; 3])), "<3 bytes>");
    }
}
