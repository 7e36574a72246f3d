//! # Rust Database Helper
//!
//! A thin data-access helper around SQLite and MySQL. It opens a connection,
//! runs parameterized SQL, maps result rows to generic records, and offers
//! convenience helpers for single-row fetch, insert, update, delete and
//! criteria-based select.
//!
//! There is no query planner, connection pool, migration engine or cache.
//! Every operation is one prepared statement on one connection.
//!
//! ## Features
//!
//! - **Cardinality checks**: `get_one` / `get_optional_one` / `get_many` state how
//!   many rows the caller expects and fail loudly when the database disagrees
//! - **Transactions**: closure-scoped, commit on `Ok`, rollback on `Err` or panic
//! - **Strict values**: typed accessors fail with `TypeMismatch` instead of coercing
//! - **Structured logging**: driver faults are reported through `tracing` with
//!   the SQL text and the bound parameters
//!
//! ## Supported Databases
//!
//! | Database | Cargo feature | Transport |
//! |----------|---------------|-----------|
//! | SQLite | `sqlite` (default) | embedded file or `:memory:` |
//! | MySQL / MariaDB | `mysql` | TCP host/port or unix socket |
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_database_helper::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut db = Connection::connect_sqlite(":memory:")?;
//!
//!     db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT)", ())?;
//!
//!     // INSERT statements return the generated id
//!     let id = db.execute("INSERT INTO users (name) VALUES (:name)", [("name", "Alice")])?;
//!     assert_eq!(id, 1);
//!
//!     // Exactly one row, or an error
//!     let user = db.get_one("SELECT * FROM users WHERE id = :id", [("id", id)])?;
//!     assert_eq!(user.get_as::<String>("name")?, "Alice");
//!
//!     // Zero rows is not an error here
//!     let nobody = db.get_optional_one("SELECT * FROM users WHERE id = :id", [("id", 999)])?;
//!     assert!(nobody.is_none());
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Working with Transactions
//!
//! ```rust
//! use rust_database_helper::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut db = Connection::connect_sqlite(":memory:")?;
//!     db.execute("CREATE TABLE accounts (id INTEGER PRIMARY KEY, balance REAL)", ())?;
//!
//!     let result: Result<()> = db.transaction(|tx| {
//!         tx.insert("accounts", [("balance", 100.0)])?;
//!         Err(DatabaseError::transaction("changed my mind"))
//!     });
//!     assert!(result.is_err());
//!
//!     // The insert was rolled back
//!     assert!(db.select("accounts", [("id", 1)])?.is_empty());
//!     Ok(())
//! }
//! ```
//!
//! ## Project Structure
//!
//! ```text
//! rust_database_helper/
//! ├── src/
//! │   ├── core/              # Core types and traits
//! │   │   ├── cardinality.rs # One / Empty / TooMany classification
//! │   │   ├── config.rs      # Connection configuration and DSN parsing
//! │   │   ├── connection.rs  # Connection and the fetch contract
//! │   │   ├── executor.rs    # Executor trait
//! │   │   ├── error.rs       # Error types
//! │   │   ├── params.rs      # Parameter sets and type hints
//! │   │   ├── query_builder.rs # CRUD builders
//! │   │   ├── row.rs         # Result rows
//! │   │   ├── transaction.rs # Transaction guard
//! │   │   ├── value.rs       # Value types
//! │   │   └── mod.rs
//! │   ├── backends/          # Database backend implementations
//! │   │   ├── mysql.rs       # MySQL implementation
//! │   │   ├── sqlite.rs      # SQLite implementation
//! │   │   └── mod.rs
//! │   └── lib.rs
//! ├── benches/               # Criterion benchmarks
//! ├── tests/                 # Integration and property tests
//! └── Cargo.toml
//! ```
//!
//! ## Security
//!
//! Values are always bound as statement parameters. Table and column names
//! given to `insert`, `update`, `delete` and `select` are written into the SQL
//! text as-is and must never come from user input.

/// Core database helper types and traits
pub mod core;

/// Database backend implementations
pub mod backends;

/// Prelude for convenient imports
///
/// ```rust
/// use rust_database_helper::prelude::*;
///
/// fn main() -> Result<()> {
///     let mut db = Connection::connect_sqlite(":memory:")?;
///     db.execute("CREATE TABLE t (id INTEGER PRIMARY KEY)", ())?;
///     Ok(())
/// }
/// ```
pub mod prelude {
    pub use crate::core::{
        ConnectionBuilder, ConnectionConfig, Connection, DatabaseError, DatabaseResult,
        DatabaseRow, DatabaseType, DatabaseValue, Executor, ParamType, Params, Result,
        TransactionGuard,
    };

    #[cfg(feature = "mysql")]
    pub use crate::backends::MysqlDatabase;
    #[cfg(feature = "sqlite")]
    pub use crate::backends::SqliteDatabase;
}

// Re-export at root level for convenience
pub use core::{
    ConnectionBuilder, ConnectionConfig, Connection, DatabaseError, DatabaseResult, DatabaseRow,
    DatabaseType, DatabaseValue, Executor, ParamType, Params, Result, TransactionGuard,
};

#[cfg(feature = "mysql")]
pub use backends::MysqlDatabase;
#[cfg(feature = "sqlite")]
pub use backends::SqliteDatabase;
