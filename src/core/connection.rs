//! Connections and the single-row fetch contract
//!
//! [`Connection`] owns one driver session. On top of raw execution it enforces
//! how many rows a caller expects:
//!
//! | call | 0 rows | 1 row | 2+ rows |
//! |------|--------|-------|---------|
//! | [`get_one`](Connection::get_one) | `NoResult` | row | `TooManyResults` |
//! | [`get_optional_one`](Connection::get_optional_one) | `None` | `Some(row)` | `TooManyResults` |
//! | [`get_many`](Connection::get_many) | empty | 1 row | all rows |
//!
//! Driver faults inside these fetches are logged with the SQL text and the
//! parameters, then returned wrapped in [`DatabaseError::Database`].

use super::cardinality::Cardinality;
use super::config::ConnectionConfig;
use super::database_types::DatabaseType;
use super::error::{DatabaseError, Result};
use super::executor::Executor;
use super::params::Params;
use super::query_builder::{DeleteBuilder, InsertBuilder, SelectBuilder, UpdateBuilder};
use super::row::{DatabaseResult, DatabaseRow};
use super::transaction::TransactionGuard;
use super::value::DatabaseValue;

/// An open connection to one database
///
/// Not safe for concurrent use: every method takes `&mut self`, so sharing a
/// connection between threads requires the caller to serialize access.
pub struct Connection {
    executor: Box<dyn Executor>,
}

impl Connection {
    /// Wrap an already-open executor
    pub fn new(executor: Box<dyn Executor>) -> Self {
        Self { executor }
    }

    /// Open a connection described by `config`
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        tracing::debug!(dsn = %config, "opening database connection");

        match config {
            #[cfg(feature = "sqlite")]
            ConnectionConfig::Sqlite { path } => Self::connect_sqlite(path),

            #[cfg(feature = "mysql")]
            ConnectionConfig::MysqlHost {
                host,
                port,
                database,
                user,
                password,
            } => Self::connect_mysql_host(host, *port, database, user, password),

            #[cfg(feature = "mysql")]
            ConnectionConfig::MysqlSocket {
                socket,
                database,
                user,
                password,
            } => Self::connect_mysql_socket(socket, database, user, password),

            #[allow(unreachable_patterns)]
            other => Err(DatabaseError::connection(format!(
                "{} support is not enabled in this build",
                other.database_type()
            ))),
        }
    }

    /// Open an embedded database file; `:memory:` opens a private in-memory database
    #[cfg(feature = "sqlite")]
    pub fn connect_sqlite(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let db = crate::backends::SqliteDatabase::open(path)?;
        Ok(Self::new(Box::new(db)))
    }

    /// Connect to a MySQL server over TCP
    #[cfg(feature = "mysql")]
    pub fn connect_mysql_host(
        host: &str,
        port: u16,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<Self> {
        let db = crate::backends::MysqlDatabase::connect_host(host, port, database, user, password)?;
        Ok(Self::new(Box::new(db)))
    }

    /// Connect to a MySQL server through a unix-domain socket
    #[cfg(feature = "mysql")]
    pub fn connect_mysql_socket(
        socket: impl AsRef<std::path::Path>,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<Self> {
        let db = crate::backends::MysqlDatabase::connect_socket(socket, database, user, password)?;
        Ok(Self::new(Box::new(db)))
    }

    /// Get the database type
    pub fn database_type(&self) -> DatabaseType {
        self.executor.database_type()
    }

    /// The underlying executor, for operations this type does not wrap
    pub fn executor(&mut self) -> &mut dyn Executor {
        self.executor.as_mut()
    }

    /// Check if currently in a transaction
    pub fn in_transaction(&self) -> bool {
        self.executor.in_transaction()
    }

    /// Run `sql` and return every row, without cardinality checks or error wrapping
    ///
    /// Driver faults come back as [`DatabaseError::Execution`].
    pub fn query(&mut self, sql: &str, params: impl Into<Params>) -> Result<DatabaseResult> {
        let params = params.into();
        self.executor
            .query_rows(sql, &params)
            .inspect_err(|e| log_failure(e, sql, &params))
    }

    /// Run a mutating statement
    ///
    /// Returns the generated id when `sql` starts with `INSERT` (leading
    /// whitespace and case ignored) and the affected-row count otherwise.
    /// Wrapped inserts such as `WITH ... INSERT` report a row count. An insert
    /// for which the driver reports no generated id (MySQL on a table without
    /// `AUTO_INCREMENT`) returns `0`.
    ///
    /// Driver faults come back as [`DatabaseError::Execution`], unwrapped.
    pub fn execute(&mut self, sql: &str, params: impl Into<Params>) -> Result<u64> {
        let params = params.into();
        self.executor
            .execute(sql, &params)
            .inspect_err(|e| log_failure(e, sql, &params))
    }

    /// Fetch exactly one row
    ///
    /// # Errors
    ///
    /// [`DatabaseError::NoResult`] if nothing matched,
    /// [`DatabaseError::TooManyResults`] if more than one row matched,
    /// [`DatabaseError::Database`] for any driver fault.
    pub fn get_one(&mut self, sql: &str, params: impl Into<Params>) -> Result<DatabaseRow> {
        let params = params.into();
        match self.fetch_cardinality(sql, &params)? {
            Cardinality::Empty => {
                tracing::error!(
                    sql = %sql,
                    parameters = %params.to_log_string(),
                    "No result for query expecting one"
                );
                Err(DatabaseError::NoResult)
            }
            other => other.into_one(),
        }
    }

    /// Fetch at most one row; more than one is still an error
    pub fn get_optional_one(
        &mut self,
        sql: &str,
        params: impl Into<Params>,
    ) -> Result<Option<DatabaseRow>> {
        let params = params.into();
        self.fetch_cardinality(sql, &params)?.into_optional()
    }

    /// Fetch every matching row; an empty result is not an error
    pub fn get_many(&mut self, sql: &str, params: impl Into<Params>) -> Result<DatabaseResult> {
        let params = params.into();
        self.fetch(sql, &params)
    }

    /// First column of the first row, or `None` if nothing matched
    pub fn get_column(
        &mut self,
        sql: &str,
        params: impl Into<Params>,
    ) -> Result<Option<DatabaseValue>> {
        let params = params.into();
        self.executor.query_scalar(sql, &params).map_err(|e| {
            log_failure(&e, sql, &params);
            DatabaseError::wrap(e)
        })
    }

    /// Run `work` inside a transaction
    ///
    /// Commits if `work` returns `Ok`. Otherwise rolls back and returns the
    /// error from `work` unchanged, so application errors stay distinguishable
    /// from database errors. A failed commit is rolled back too. Transactions
    /// do not nest: calling this inside `work` fails with
    /// [`DatabaseError::TransactionError`].
    ///
    /// # Example
    ///
    /// ```
    /// use rust_database_helper::prelude::*;
    ///
    /// # fn main() -> Result<()> {
    /// let mut db = Connection::connect_sqlite(":memory:")?;
    /// db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", ())?;
    ///
    /// let id = db.transaction(|tx| {
    ///     tx.execute("INSERT INTO users (name) VALUES (:name)", [("name", "Alice")])
    /// })?;
    /// assert_eq!(id, 1);
    /// # Ok(())
    /// # }
    /// ```
    pub fn transaction<T, E, F>(&mut self, work: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Connection) -> std::result::Result<T, E>,
        E: From<DatabaseError>,
    {
        let mut tx = TransactionGuard::begin(self)?;

        match work(tx.connection()) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::warn!(error = %rollback_err, "rollback after failed unit of work failed");
                }
                Err(e)
            }
        }
    }

    /// Insert one row built from `(column, value)` pairs; returns the generated id
    ///
    /// Table and column names are interpolated into the SQL text and must be trusted.
    pub fn insert<K, V, I>(&mut self, table: &str, data: I) -> Result<u64>
    where
        K: AsRef<str>,
        V: Into<DatabaseValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let builder = data
            .into_iter()
            .fold(InsertBuilder::new(table), |b, (column, value)| {
                b.value(column.as_ref(), value)
            });
        let (sql, params) = builder.build()?;
        self.execute(&sql, params)
    }

    /// Update rows matching every `criteria` equality; returns the affected-row count
    ///
    /// Empty `data` or empty `criteria` is rejected with [`DatabaseError::InvalidQuery`].
    pub fn update<K, V, I, CK, CV, C>(&mut self, table: &str, data: I, criteria: C) -> Result<u64>
    where
        K: AsRef<str>,
        V: Into<DatabaseValue>,
        I: IntoIterator<Item = (K, V)>,
        CK: AsRef<str>,
        CV: Into<DatabaseValue>,
        C: IntoIterator<Item = (CK, CV)>,
    {
        let builder = data
            .into_iter()
            .fold(UpdateBuilder::new(table), |b, (column, value)| {
                b.set(column.as_ref(), value)
            });
        let builder = criteria.into_iter().fold(builder, |b, (column, value)| {
            b.where_eq(column.as_ref(), value)
        });
        let (sql, params) = builder.build()?;
        self.execute(&sql, params)
    }

    /// Delete rows matching every `criteria` equality; returns the affected-row count
    ///
    /// Empty `criteria` is rejected with [`DatabaseError::InvalidQuery`].
    pub fn delete<K, V, I>(&mut self, table: &str, criteria: I) -> Result<u64>
    where
        K: AsRef<str>,
        V: Into<DatabaseValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let builder = criteria
            .into_iter()
            .fold(DeleteBuilder::new(table), |b, (column, value)| {
                b.where_eq(column.as_ref(), value)
            });
        let (sql, params) = builder.build()?;
        self.execute(&sql, params)
    }

    /// Select all columns of rows matching every `criteria` equality
    ///
    /// Empty `criteria` selects every row of the table.
    pub fn select<K, V, I>(&mut self, table: &str, criteria: I) -> Result<DatabaseResult>
    where
        K: AsRef<str>,
        V: Into<DatabaseValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let builder = criteria
            .into_iter()
            .fold(SelectBuilder::new(table), |b, (column, value)| {
                b.where_eq(column.as_ref(), value)
            });
        let (sql, params) = builder.build()?;
        self.get_many(&sql, params)
    }

    fn fetch(&mut self, sql: &str, params: &Params) -> Result<DatabaseResult> {
        self.executor.query_rows(sql, params).map_err(|e| {
            log_failure(&e, sql, params);
            DatabaseError::wrap(e)
        })
    }

    fn fetch_cardinality(&mut self, sql: &str, params: &Params) -> Result<Cardinality> {
        let cardinality = Cardinality::of(self.fetch(sql, params)?);
        if let Cardinality::TooMany(count) = cardinality {
            tracing::error!(
                sql = %sql,
                parameters = %params.to_log_string(),
                count,
                "Too many results for query expecting one"
            );
        }
        Ok(cardinality)
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("database_type", &self.database_type())
            .field("in_transaction", &self.in_transaction())
            .finish()
    }
}

fn log_failure(error: &DatabaseError, sql: &str, params: &Params) {
    tracing::error!(
        sql = %sql,
        parameters = %params.to_log_string(),
        "Database error: {}",
        error
    );
}
