//! Database backend implementations
//!
//! This module contains concrete implementations of the [`Executor`](crate::core::Executor)
//! trait for the supported database engines.

#[cfg(feature = "mysql")]
pub mod mysql;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub use mysql::MysqlDatabase;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
