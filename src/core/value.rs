//! Database value types
//!
//! This module defines the scalar values that can be bound to statements and
//! read back from result rows. Accessors are strict: asking an integer for its
//! text, or text for an integer, is a [`DatabaseError::TypeMismatch`] rather
//! than a silent conversion.

use super::error::{DatabaseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Database value that can hold different types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DatabaseValue {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// Text value
    Text(String),
    /// Binary data
    Bytes(Vec<u8>),
}

impl DatabaseValue {
    /// Get the value as a boolean
    ///
    /// Integer `0` and `1` are accepted because drivers without a native
    /// boolean type store booleans that way.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            DatabaseValue::Bool(v) => Ok(*v),
            DatabaseValue::Int(0) => Ok(false),
            DatabaseValue::Int(1) => Ok(true),
            other => Err(DatabaseError::type_mismatch("bool", other.type_name())),
        }
    }

    /// Get the value as an i64
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            DatabaseValue::Int(v) => Ok(*v),
            other => Err(DatabaseError::type_mismatch("integer", other.type_name())),
        }
    }

    /// Get the value as an f64
    pub fn as_f64(&self) -> Result<f64> {
        match self {
            DatabaseValue::Float(v) => Ok(*v),
            other => Err(DatabaseError::type_mismatch("float", other.type_name())),
        }
    }

    /// Get the value as a string slice (zero-copy)
    pub fn as_str(&self) -> Result<&str> {
        match self {
            DatabaseValue::Text(s) => Ok(s.as_str()),
            other => Err(DatabaseError::type_mismatch("text", other.type_name())),
        }
    }

    /// Get the value as bytes (zero-copy)
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            DatabaseValue::Bytes(b) => Ok(b),
            other => Err(DatabaseError::type_mismatch("bytes", other.type_name())),
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, DatabaseValue::Null)
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            DatabaseValue::Null => "null",
            DatabaseValue::Bool(_) => "bool",
            DatabaseValue::Int(_) => "integer",
            DatabaseValue::Float(_) => "float",
            DatabaseValue::Text(_) => "text",
            DatabaseValue::Bytes(_) => "bytes",
        }
    }
}

impl fmt::Display for DatabaseValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseValue::Null => f.write_str("null"),
            DatabaseValue::Bool(v) => write!(f, "{}", v),
            DatabaseValue::Int(v) => write!(f, "{}", v),
            DatabaseValue::Float(v) => write!(f, "{}", v),
            DatabaseValue::Text(s) => f.write_str(s),
            DatabaseValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

impl From<bool> for DatabaseValue {
    fn from(v: bool) -> Self {
        DatabaseValue::Bool(v)
    }
}

impl From<i32> for DatabaseValue {
    fn from(v: i32) -> Self {
        DatabaseValue::Int(i64::from(v))
    }
}

impl From<i64> for DatabaseValue {
    fn from(v: i64) -> Self {
        DatabaseValue::Int(v)
    }
}

impl From<u32> for DatabaseValue {
    fn from(v: u32) -> Self {
        DatabaseValue::Int(i64::from(v))
    }
}

/// Ids returned by `execute` are `u64`; values past `i64::MAX` are kept as decimal text
impl From<u64> for DatabaseValue {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(v) => DatabaseValue::Int(v),
            Err(_) => DatabaseValue::Text(v.to_string()),
        }
    }
}

impl From<f32> for DatabaseValue {
    fn from(v: f32) -> Self {
        DatabaseValue::Float(f64::from(v))
    }
}

impl From<f64> for DatabaseValue {
    fn from(v: f64) -> Self {
        DatabaseValue::Float(v)
    }
}

impl From<String> for DatabaseValue {
    fn from(v: String) -> Self {
        DatabaseValue::Text(v)
    }
}

impl From<&str> for DatabaseValue {
    fn from(v: &str) -> Self {
        DatabaseValue::Text(v.to_string())
    }
}

impl From<Vec<u8>> for DatabaseValue {
    fn from(v: Vec<u8>) -> Self {
        DatabaseValue::Bytes(v)
    }
}

impl From<&[u8]> for DatabaseValue {
    fn from(v: &[u8]) -> Self {
        DatabaseValue::Bytes(v.to_vec())
    }
}

impl<T: Into<DatabaseValue>> From<Option<T>> for DatabaseValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => DatabaseValue::Null,
        }
    }
}

/// Conversion from a borrowed [`DatabaseValue`] into an owned Rust type
///
/// Used by [`DatabaseRow::get_as`](super::row::DatabaseRow::get_as). `Option<T>`
/// maps `Null` to `None`; every other implementation rejects `Null`.
pub trait FromDatabaseValue: Sized {
    fn from_value(value: &DatabaseValue) -> Result<Self>;
}

impl FromDatabaseValue for DatabaseValue {
    fn from_value(value: &DatabaseValue) -> Result<Self> {
        Ok(value.clone())
    }
}

impl FromDatabaseValue for bool {
    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value.as_bool()
    }
}

impl FromDatabaseValue for i64 {
    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value.as_i64()
    }
}

impl FromDatabaseValue for i32 {
    fn from_value(value: &DatabaseValue) -> Result<Self> {
        let v = value.as_i64()?;
        i32::try_from(v).map_err(|_| DatabaseError::type_mismatch("i32", "out-of-range integer"))
    }
}

impl FromDatabaseValue for f64 {
    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value.as_f64()
    }
}

impl FromDatabaseValue for String {
    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromDatabaseValue for Vec<u8> {
    fn from_value(value: &DatabaseValue) -> Result<Self> {
        value.as_bytes().map(<[u8]>::to_vec)
    }
}

impl<T: FromDatabaseValue> FromDatabaseValue for Option<T> {
    fn from_value(value: &DatabaseValue) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::from_value(value).map(Some)
        }
    }
}
