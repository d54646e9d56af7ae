//! Ordered column-value maps and the list formats rendered from them.
//!
//! The same map renders three ways:
//!
//! - insert lists: `(title,body) VALUES (?,?)`
//! - assignments: `title=?,body=?`
//! - equality conditions: `title=? AND body=?`
//!
//! In every form the placeholders follow the map's insertion order, which is
//! also the order of [`ColumnValues::values`].

use rusqlite::types::Value;

/// An ordered mapping from column name to value.
///
/// Setting a column that is already present replaces its value in place, so
/// the column keeps its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnValues {
    entries: Vec<(String, Value)>,
}

impl ColumnValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `column` to `value` and returns the map.
    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Sets `column` to `value`.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// `(c1,c2) VALUES (?,?)`
    pub fn insert_list(&self) -> String {
        let columns = self.columns().collect::<Vec<_>>().join(",");
        let placeholders = vec!["?"; self.len()].join(",");
        format!("({columns}) VALUES ({placeholders})")
    }

    /// `c1=?,c2=?`
    pub fn assignment_list(&self) -> String {
        self.joined_with(",")
    }

    /// `c1=? AND c2=?`
    pub fn condition_list(&self) -> String {
        self.joined_with(" AND ")
    }

    fn joined_with(&self, separator: &str) -> String {
        self.columns()
            .map(|c| format!("{c}=?"))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ColumnValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (column, value) in iter {
            map.insert(column, value);
        }
        map
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for ColumnValues {
    fn from(entries: Vec<(K, V)>) -> Self {
        entries.into_iter().collect()
    }
}

impl IntoIterator for ColumnValues {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// What an insert, upsert or update carries: a column-value map rendered
/// with placeholders, or a literal fragment appended verbatim.
///
/// A literal fragment brings its own placeholders; the matching values have
/// to be bound separately.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Columns(ColumnValues),
    Raw(String),
}

impl From<ColumnValues> for Payload {
    fn from(values: ColumnValues) -> Self {
        Payload::Columns(values)
    }
}

impl From<&ColumnValues> for Payload {
    fn from(values: &ColumnValues) -> Self {
        Payload::Columns(values.clone())
    }
}

impl From<&str> for Payload {
    fn from(fragment: &str) -> Self {
        Payload::Raw(fragment.to_string())
    }
}

impl From<String> for Payload {
    fn from(fragment: String) -> Self {
        Payload::Raw(fragment)
    }
}
