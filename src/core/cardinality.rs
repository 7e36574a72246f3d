//! Row-count classification for single-row fetches

use super::error::{DatabaseError, Result};
use super::row::{DatabaseResult, DatabaseRow};

/// How many rows a fetch produced, from the point of view of a caller expecting one
#[derive(Debug, Clone, PartialEq)]
pub enum Cardinality {
    /// Exactly one row
    One(DatabaseRow),
    /// No rows
    Empty,
    /// More than one row; carries the count
    TooMany(usize),
}

impl Cardinality {
    /// Classify a fetched result set
    pub fn of(mut rows: DatabaseResult) -> Self {
        match rows.len() {
            0 => Cardinality::Empty,
            1 => match rows.pop() {
                Some(row) => Cardinality::One(row),
                None => Cardinality::Empty,
            },
            n => Cardinality::TooMany(n),
        }
    }

    /// Zero rows is `Ok(None)`; more than one is [`DatabaseError::TooManyResults`]
    pub fn into_optional(self) -> Result<Option<DatabaseRow>> {
        match self {
            Cardinality::One(row) => Ok(Some(row)),
            Cardinality::Empty => Ok(None),
            Cardinality::TooMany(count) => Err(DatabaseError::TooManyResults { count }),
        }
    }

    /// Zero rows is [`DatabaseError::NoResult`]; more than one is [`DatabaseError::TooManyResults`]
    pub fn into_one(self) -> Result<DatabaseRow> {
        self.into_optional()?.ok_or(DatabaseError::NoResult)
    }
}
