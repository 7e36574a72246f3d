//! CRUD statement builders
//!
//! Builders enumerate their (column, value) pairs once and emit the column
//! list and the placeholder list together, so columns and bound values can
//! never drift apart. Placeholders are generated (`:p1`, `:p2`, ...) rather than
//! derived from column names, which keeps SET and WHERE values of the same
//! column distinct.
//!
//! Table and column names are written into the SQL text verbatim. They must
//! come from trusted code, never from user input.

use super::error::{DatabaseError, Result};
use super::params::Params;
use super::value::DatabaseValue;

/// Equality conditions joined with AND
#[derive(Debug, Clone, Default)]
struct Criteria {
    conditions: Vec<(String, DatabaseValue)>,
}

impl Criteria {
    fn push(&mut self, column: impl Into<String>, value: impl Into<DatabaseValue>) {
        self.conditions.push((column.into(), value.into()));
    }

    fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    fn write_where(&self, sql: &mut String, binder: &mut Binder) {
        if self.conditions.is_empty() {
            return;
        }
        let clauses: Vec<String> = self
            .conditions
            .iter()
            .map(|(column, value)| format!("{} = {}", column, binder.bind(value.clone())))
            .collect();
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
}

/// Hands out placeholder names and records the value bound to each
#[derive(Debug, Default)]
struct Binder {
    params: Vec<(String, DatabaseValue)>,
}

impl Binder {
    fn bind(&mut self, value: DatabaseValue) -> String {
        let name = format!("p{}", self.params.len() + 1);
        let placeholder = format!(":{}", name);
        self.params.push((name, value));
        placeholder
    }

    fn into_params(self) -> Params {
        Params::Named(self.params)
    }
}

/// SELECT query builder
#[derive(Debug, Clone)]
pub struct SelectBuilder {
    table: String,
    columns: Vec<String>,
    criteria: Criteria,
}

impl SelectBuilder {
    /// Create a new SELECT query builder
    ///
    /// # Example
    ///
    /// ```
    /// use rust_database_helper::core::query_builder::SelectBuilder;
    ///
    /// let (sql, params) = SelectBuilder::new("users")
    ///     .columns(&["id", "name"])
    ///     .where_eq("id", 7)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(sql, "SELECT id, name FROM users WHERE id = :p1");
    /// assert_eq!(params.len(), 1);
    /// ```
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: vec!["*".to_string()],
            criteria: Criteria::default(),
        }
    }

    /// Select specific columns
    #[must_use]
    pub fn columns(mut self, columns: &[&str]) -> Self {
        self.columns = columns.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Add a WHERE column = value condition
    #[must_use]
    pub fn where_eq(mut self, column: &str, value: impl Into<DatabaseValue>) -> Self {
        self.criteria.push(column, value);
        self
    }

    /// Build the SQL text and its parameters
    ///
    /// Without criteria the statement has no WHERE clause and selects every row.
    pub fn build(&self) -> Result<(String, Params)> {
        if self.columns.is_empty() {
            return Err(DatabaseError::invalid_query(format!(
                "SELECT from {} with no columns",
                self.table
            )));
        }
        let mut binder = Binder::default();
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);
        self.criteria.write_where(&mut sql, &mut binder);
        Ok((sql, binder.into_params()))
    }
}

/// INSERT query builder
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    values: Vec<(String, DatabaseValue)>,
}

impl InsertBuilder {
    /// Create a new INSERT query builder
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    /// Add a column-value pair
    #[must_use]
    pub fn value(mut self, column: &str, value: impl Into<DatabaseValue>) -> Self {
        self.values.push((column.to_string(), value.into()));
        self
    }

    /// Build the SQL text and its parameters
    pub fn build(&self) -> Result<(String, Params)> {
        if self.values.is_empty() {
            return Err(DatabaseError::invalid_query(format!(
                "INSERT into {} with no columns",
                self.table
            )));
        }
        let mut binder = Binder::default();
        let (columns, placeholders): (Vec<&str>, Vec<String>) = self
            .values
            .iter()
            .map(|(column, value)| (column.as_str(), binder.bind(value.clone())))
            .unzip();
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            placeholders.join(", ")
        );
        Ok((sql, binder.into_params()))
    }
}

/// UPDATE query builder
#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    table: String,
    assignments: Vec<(String, DatabaseValue)>,
    criteria: Criteria,
}

impl UpdateBuilder {
    /// Create a new UPDATE query builder
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            criteria: Criteria::default(),
        }
    }

    /// Set a column value
    #[must_use]
    pub fn set(mut self, column: &str, value: impl Into<DatabaseValue>) -> Self {
        self.assignments.push((column.to_string(), value.into()));
        self
    }

    /// Add a WHERE column = value condition
    #[must_use]
    pub fn where_eq(mut self, column: &str, value: impl Into<DatabaseValue>) -> Self {
        self.criteria.push(column, value);
        self
    }

    /// Build the SQL text and its parameters
    ///
    /// An update without criteria is rejected rather than applied to every row.
    pub fn build(&self) -> Result<(String, Params)> {
        if self.assignments.is_empty() {
            return Err(DatabaseError::invalid_query(format!(
                "UPDATE of {} with no columns",
                self.table
            )));
        }
        if self.criteria.is_empty() {
            return Err(DatabaseError::invalid_query(format!(
                "UPDATE of {} with no criteria",
                self.table
            )));
        }
        let mut binder = Binder::default();
        let set_clauses: Vec<String> = self
            .assignments
            .iter()
            .map(|(column, value)| format!("{} = {}", column, binder.bind(value.clone())))
            .collect();
        let mut sql = format!("UPDATE {} SET {}", self.table, set_clauses.join(", "));
        self.criteria.write_where(&mut sql, &mut binder);
        Ok((sql, binder.into_params()))
    }
}

/// DELETE query builder
#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    table: String,
    criteria: Criteria,
}

impl DeleteBuilder {
    /// Create a new DELETE query builder
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            criteria: Criteria::default(),
        }
    }

    /// Add a WHERE column = value condition
    #[must_use]
    pub fn where_eq(mut self, column: &str, value: impl Into<DatabaseValue>) -> Self {
        self.criteria.push(column, value);
        self
    }

    /// Build the SQL text and its parameters
    ///
    /// A delete without criteria is rejected rather than applied to every row.
    pub fn build(&self) -> Result<(String, Params)> {
        if self.criteria.is_empty() {
            return Err(DatabaseError::invalid_query(format!(
                "DELETE from {} with no criteria",
                self.table
            )));
        }
        let mut binder = Binder::default();
        let mut sql = format!("DELETE FROM {}", self.table);
        self.criteria.write_where(&mut sql, &mut binder);
        Ok((sql, binder.into_params()))
    }
}
