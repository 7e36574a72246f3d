//! Error types for the database helper
//!
//! This module defines all error types that can occur during database operations.
//! Two kinds are structural rather than driver faults: [`DatabaseError::NoResult`]
//! and [`DatabaseError::TooManyResults`] report a cardinality violation of a
//! single-row fetch.

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Error types for database operations
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    /// A single-row fetch matched zero rows
    #[error("database.result.empty")]
    NoResult,

    /// A single-row fetch matched more than one row
    #[error("database.result.too_many: expected one row, got {count}")]
    TooManyResults { count: usize },

    /// Driver fault translated by the result contract layer
    #[error("database.general.error: {source}")]
    Database {
        #[source]
        source: Box<DatabaseError>,
    },

    /// A statement could not be prepared, bound or run
    ///
    /// `source` holds the driver fault, if the failure came from the driver
    /// rather than from this crate's own parameter checks.
    #[error("Execution error: {message}")]
    Execution {
        message: String,
        #[source]
        source: Option<Box<DatabaseError>>,
    },

    /// Type conversion error
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Column not found
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Invalid connection string
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// Connection error (generic)
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Transaction error
    #[error("Transaction error: {0}")]
    TransactionError(String),

    /// Malformed helper query (empty column set or criteria)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// SQLite error
    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    SqliteError(#[from] rusqlite::Error),

    /// MySQL error
    #[cfg(feature = "mysql")]
    #[error("MySQL error: {0}")]
    MysqlError(#[from] mysql_async::Error),
}

impl DatabaseError {
    /// Wrap a lower-level fault in the generic database error
    pub fn wrap(source: DatabaseError) -> Self {
        DatabaseError::Database {
            source: Box::new(source),
        }
    }

    /// Create a new execution error
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        DatabaseError::Execution {
            message: msg.into(),
            source: None,
        }
    }

    /// Wrap a driver fault raised while preparing, binding or running a statement
    pub fn execution_from<E: Into<DatabaseError>>(fault: E) -> Self {
        let fault = fault.into();
        DatabaseError::Execution {
            message: fault.to_string(),
            source: Some(Box::new(fault)),
        }
    }

    /// Create a new type mismatch error
    pub fn type_mismatch(expected: &str, actual: &str) -> Self {
        DatabaseError::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a new connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        DatabaseError::ConnectionError(msg.into())
    }

    /// Create a new transaction error
    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        DatabaseError::TransactionError(msg.into())
    }

    /// Create a new invalid query error
    pub fn invalid_query<S: Into<String>>(msg: S) -> Self {
        DatabaseError::InvalidQuery(msg.into())
    }

    /// True if this is a zero-row cardinality violation
    pub fn is_no_result(&self) -> bool {
        matches!(self, DatabaseError::NoResult)
    }

    /// True if this is a more-than-one-row cardinality violation
    pub fn is_too_many_results(&self) -> bool {
        matches!(self, DatabaseError::TooManyResults { .. })
    }

    /// The innermost error, unwrapping [`DatabaseError::Database`] layers and
    /// the driver fault behind an [`DatabaseError::Execution`]
    pub fn root_cause(&self) -> &DatabaseError {
        match self {
            DatabaseError::Database { source } => source.root_cause(),
            DatabaseError::Execution {
                source: Some(source),
                ..
            } => source.root_cause(),
            other => other,
        }
    }
}
