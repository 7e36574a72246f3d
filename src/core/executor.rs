//! Query executor seam
//!
//! An [`Executor`] owns one driver session and runs one prepared statement per
//! call. It does not retry, time out or cancel. Statement faults reported by
//! the driver are returned once, as an execution error carrying the driver's
//! error as its source.

use super::database_types::DatabaseType;
use super::error::Result;
use super::params::Params;
use super::row::{DatabaseResult, DatabaseRow};
use super::value::DatabaseValue;

/// What a mutating statement did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationOutcome {
    /// Rows changed by the statement
    pub rows_affected: u64,
    /// The connection's last-insert-id register after the statement
    pub last_insert_id: Option<u64>,
}

/// True if `sql`, ignoring leading whitespace, starts with `insert` (any case)
///
/// This is a prefix check, not a parser. `WITH ... INSERT` and other wrapped
/// inserts do not match and report a row count.
pub fn is_insert_statement(sql: &str) -> bool {
    sql.trim_start()
        .get(..6)
        .is_some_and(|verb| verb.eq_ignore_ascii_case("insert"))
}

/// A single driver session that prepares, binds and runs statements
///
/// Implementations are not reentrant. A session belongs to one caller at a
/// time and transactions on it do not nest.
pub trait Executor: Send {
    /// Get the database type
    fn database_type(&self) -> DatabaseType;

    /// Prepare and run `sql`, returning every row in driver order
    ///
    /// Fails with an execution error if the statement cannot be prepared, if
    /// the parameter set does not match the placeholders, or if the driver
    /// reports a runtime fault. Driver faults are kept as the source.
    fn query_rows(&mut self, sql: &str, params: &Params) -> Result<DatabaseResult>;

    /// Prepare and run a mutating statement
    ///
    /// Fails under the same conditions as [`query_rows`](Executor::query_rows).
    fn execute_mutation(&mut self, sql: &str, params: &Params) -> Result<MutationOutcome>;

    /// Begin a transaction
    fn begin_transaction(&mut self) -> Result<()>;

    /// Commit the current transaction
    fn commit(&mut self) -> Result<()>;

    /// Rollback the current transaction
    fn rollback(&mut self) -> Result<()>;

    /// Check if currently in a transaction
    fn in_transaction(&self) -> bool;

    /// Run a mutating statement and report the generated id for inserts or
    /// the affected-row count for everything else
    ///
    /// An insert for which the driver reports no generated id returns `0`.
    fn execute(&mut self, sql: &str, params: &Params) -> Result<u64> {
        let outcome = self.execute_mutation(sql, params)?;
        if !is_insert_statement(sql) {
            return Ok(outcome.rows_affected);
        }
        match outcome.last_insert_id {
            Some(id) => Ok(id),
            None => {
                tracing::debug!(
                    sql = %sql,
                    rows_affected = outcome.rows_affected,
                    "driver reported no last insert id, returning 0"
                );
                Ok(0)
            }
        }
    }

    /// First column of the first row, or `None` if nothing matched
    fn query_scalar(&mut self, sql: &str, params: &Params) -> Result<Option<DatabaseValue>> {
        let rows = self.query_rows(sql, params)?;
        Ok(rows.into_iter().next().and_then(DatabaseRow::into_first_value))
    }
}
