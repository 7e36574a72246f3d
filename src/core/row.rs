//! Result rows
//!
//! A [`DatabaseRow`] keeps columns in the order the statement selected them.
//! Rows from the same fetch share the same column set.

use super::error::{DatabaseError, Result};
use super::value::{DatabaseValue, FromDatabaseValue};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A row of database results (ordered column name -> value pairs)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DatabaseRow {
    columns: Vec<(String, DatabaseValue)>,
}

/// Multiple rows returned from a query
pub type DatabaseResult = Vec<DatabaseRow>;

impl DatabaseRow {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty row with room for `capacity` columns
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            columns: Vec::with_capacity(capacity),
        }
    }

    /// Append a column, replacing the value if the name is already present
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<DatabaseValue>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Look up a column by name
    pub fn get(&self, column: &str) -> Option<&DatabaseValue> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Look up a column and convert it, failing on a missing column or a type mismatch
    pub fn get_as<T: FromDatabaseValue>(&self, column: &str) -> Result<T> {
        let value = self
            .get(column)
            .ok_or_else(|| DatabaseError::ColumnNotFound(column.to_string()))?;
        T::from_value(value)
    }

    /// Value at a zero-based column position
    pub fn get_index(&self, index: usize) -> Option<&DatabaseValue> {
        self.columns.get(index).map(|(_, value)| value)
    }

    pub fn contains_key(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Column names in selection order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DatabaseValue)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// First column value, used for scalar fetches
    pub fn into_first_value(self) -> Option<DatabaseValue> {
        self.columns.into_iter().next().map(|(_, value)| value)
    }
}

impl IntoIterator for DatabaseRow {
    type Item = (String, DatabaseValue);
    type IntoIter = std::vec::IntoIter<(String, DatabaseValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl<K: Into<String>, V: Into<DatabaseValue>> FromIterator<(K, V)> for DatabaseRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = DatabaseRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

impl Serialize for DatabaseRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
