//! Database type definitions
//!
//! This module defines the database engines the helper can talk to.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    /// Embedded single-file SQLite database
    Sqlite,
    /// Networked MySQL/MariaDB server
    Mysql,
}

impl DatabaseType {
    /// Convert database type to string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            DatabaseType::Sqlite => "sqlite",
            DatabaseType::Mysql => "mysql",
        }
    }

    /// Whether the engine keeps its data in a local file rather than behind a server
    pub fn is_embedded(&self) -> bool {
        matches!(self, DatabaseType::Sqlite)
    }

    /// Whether support for this engine was compiled in
    pub fn is_enabled(&self) -> bool {
        match self {
            DatabaseType::Sqlite => cfg!(feature = "sqlite"),
            DatabaseType::Mysql => cfg!(feature = "mysql"),
        }
    }
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for DatabaseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" | "mariadb" => Ok(DatabaseType::Mysql),
            "sqlite" | "sqlite3" => Ok(DatabaseType::Sqlite),
            _ => Err(format!("Invalid database type: '{}'", s)),
        }
    }
}
