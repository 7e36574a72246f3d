//! Core database helper types and traits
//!
//! This module provides the fundamental building blocks: error types, values
//! and rows, parameter sets, the executor trait, the connection with its
//! single-row fetch contract, transactions and the CRUD builders.

pub mod cardinality;
pub mod config;
pub mod connection;
pub mod database_types;
pub mod error;
pub mod executor;
pub mod params;
pub mod query_builder;
pub mod row;
pub mod transaction;
pub mod value;

// Re-export commonly used types
pub use cardinality::Cardinality;
pub use config::{ConnectionBuilder, ConnectionConfig};
pub use connection::Connection;
pub use database_types::DatabaseType;
pub use error::{DatabaseError, Result};
pub use executor::{Executor, MutationOutcome};
pub use params::{ParamType, Params};
pub use query_builder::{DeleteBuilder, InsertBuilder, SelectBuilder, UpdateBuilder};
pub use row::{DatabaseResult, DatabaseRow};
pub use transaction::TransactionGuard;
pub use value::{DatabaseValue, FromDatabaseValue};
