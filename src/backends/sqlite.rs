//! SQLite database backend implementation
//!
//! This module provides a SQLite implementation of the [`Executor`] trait.
//! Parameters are bound explicitly by index, and the statement is rejected
//! unless every placeholder is bound exactly once. Driver faults raised while
//! preparing, binding or stepping a statement surface as
//! [`DatabaseError::Execution`] with the rusqlite error as its source.

use crate::core::{
    database_types::DatabaseType,
    error::{DatabaseError, Result},
    executor::{Executor, MutationOutcome},
    params::{Bindings, Params},
    row::{DatabaseResult, DatabaseRow},
    value::DatabaseValue,
};
use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, Statement};
use std::path::Path;

/// SQLite database implementation
pub struct SqliteDatabase {
    connection: Connection,
}

impl SqliteDatabase {
    /// Open (creating if needed) the database file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let connection = Connection::open(path)?;

        // Enable foreign keys
        connection.execute("PRAGMA foreign_keys = ON", [])?;

        Ok(Self { connection })
    }

    /// Open a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Prepare `sql` and bind `params`, checking that they cover every placeholder
    fn prepare_bound<'c>(
        connection: &'c Connection,
        sql: &str,
        params: &Params,
    ) -> Result<Statement<'c>> {
        let mut stmt = connection
            .prepare(sql)
            .map_err(DatabaseError::execution_from)?;
        let expected = stmt.parameter_count();
        let mut bound = vec![false; expected];

        match params.bindings()? {
            Bindings::Named(pairs) => {
                for (name, value) in pairs {
                    let placeholder = format!(":{}", name);
                    let index = stmt
                        .parameter_index(&placeholder)
                        .map_err(DatabaseError::execution_from)?
                        .ok_or_else(|| {
                            DatabaseError::execution(format!(
                                "parameter {} has no placeholder in statement",
                                placeholder
                            ))
                        })?;
                    stmt.raw_bind_parameter(index, value)
                        .map_err(DatabaseError::execution_from)?;
                    bound[index - 1] = true;
                }
            }
            Bindings::Ordinal(values) => {
                if values.len() != expected {
                    return Err(DatabaseError::execution(format!(
                        "statement has {} placeholders but {} parameters were given",
                        expected,
                        values.len()
                    )));
                }
                for (i, value) in values.iter().enumerate() {
                    stmt.raw_bind_parameter(i + 1, value)
                        .map_err(DatabaseError::execution_from)?;
                    bound[i] = true;
                }
            }
        }

        if let Some(missing) = bound.iter().position(|b| !b) {
            let name = stmt
                .parameter_name(missing + 1)
                .map(str::to_string)
                .unwrap_or_else(|| format!("?{}", missing + 1));
            return Err(DatabaseError::execution(format!(
                "placeholder {} is not bound",
                name
            )));
        }

        Ok(stmt)
    }

    /// Convert a borrowed SQLite value into a DatabaseValue
    ///
    /// TEXT that is not valid UTF-8 comes back as bytes, unchanged.
    fn value_from_ref(value: ValueRef<'_>) -> DatabaseValue {
        match value {
            ValueRef::Null => DatabaseValue::Null,
            ValueRef::Integer(v) => DatabaseValue::Int(v),
            ValueRef::Real(v) => DatabaseValue::Float(v),
            ValueRef::Text(v) => match std::str::from_utf8(v) {
                Ok(s) => DatabaseValue::Text(s.to_string()),
                Err(_) => DatabaseValue::Bytes(v.to_vec()),
            },
            ValueRef::Blob(v) => DatabaseValue::Bytes(v.to_vec()),
        }
    }

    fn collect_rows(stmt: &mut Statement<'_>) -> rusqlite::Result<DatabaseResult> {
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.raw_query();
        let mut results = Vec::new();
        while let Some(row) = rows.next()? {
            let mut db_row = DatabaseRow::with_capacity(columns.len());
            for (i, name) in columns.iter().enumerate() {
                db_row.insert(name.as_str(), Self::value_from_ref(row.get_ref(i)?));
            }
            results.push(db_row);
        }
        Ok(results)
    }

    fn transaction_command(&self, command: &str, expect_open: bool) -> Result<()> {
        let open = !self.connection.is_autocommit();
        if open != expect_open {
            return Err(DatabaseError::transaction(if open {
                "Already in a transaction"
            } else {
                "Not in a transaction"
            }));
        }
        self.connection.execute(command, [])?;
        Ok(())
    }
}

impl ToSql for DatabaseValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            DatabaseValue::Null => ToSqlOutput::Owned(Value::Null),
            DatabaseValue::Bool(v) => ToSqlOutput::Owned(Value::Integer(i64::from(*v))),
            DatabaseValue::Int(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            DatabaseValue::Float(v) => ToSqlOutput::Owned(Value::Real(*v)),
            DatabaseValue::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            DatabaseValue::Bytes(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b.as_slice())),
        })
    }
}

impl Executor for SqliteDatabase {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Sqlite
    }

    fn query_rows(&mut self, sql: &str, params: &Params) -> Result<DatabaseResult> {
        let mut stmt = Self::prepare_bound(&self.connection, sql, params)?;
        Self::collect_rows(&mut stmt).map_err(DatabaseError::execution_from)
    }

    fn execute_mutation(&mut self, sql: &str, params: &Params) -> Result<MutationOutcome> {
        let mut stmt = Self::prepare_bound(&self.connection, sql, params)?;
        let affected = stmt
            .raw_execute()
            .map_err(DatabaseError::execution_from)?;
        drop(stmt);

        Ok(MutationOutcome {
            rows_affected: affected as u64,
            last_insert_id: u64::try_from(self.connection.last_insert_rowid()).ok(),
        })
    }

    fn begin_transaction(&mut self) -> Result<()> {
        self.transaction_command("BEGIN TRANSACTION", false)
    }

    fn commit(&mut self) -> Result<()> {
        self.transaction_command("COMMIT", true)
    }

    fn rollback(&mut self) -> Result<()> {
        self.transaction_command("ROLLBACK", true)
    }

    fn in_transaction(&self) -> bool {
        !self.connection.is_autocommit()
    }
}

impl Drop for SqliteDatabase {
    fn drop(&mut self) {
        if !self.connection.is_autocommit() {
            if let Err(e) = self.connection.execute("ROLLBACK", []) {
                tracing::warn!(error = %e, "rollback on close failed");
            }
        }
        // Connection will be closed automatically when dropped
    }
}
