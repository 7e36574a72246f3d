//! Statement parameters
//!
//! A [`Params`] value is consumed by exactly one statement execution. Named
//! parameters use `:name` placeholders; ordinal parameters bind by 1-based
//! position. The two styles cannot be mixed within one call.

use super::error::{DatabaseError, Result};
use super::value::DatabaseValue;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use std::borrow::Cow;

/// Declared storage type for an ordinal parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Bind as text
    Str,
    /// Bind as integer
    Int,
    /// Bind as binary blob
    Binary,
}

impl ParamType {
    /// Convert `value` to the declared storage type. `Null` binds as `Null` for every type.
    pub fn coerce(&self, value: &DatabaseValue) -> Result<DatabaseValue> {
        use DatabaseValue as V;

        let coerced = match (self, value) {
            (_, V::Null) => V::Null,

            (ParamType::Str, V::Text(s)) => V::Text(s.clone()),
            (ParamType::Str, V::Int(v)) => V::Text(v.to_string()),
            (ParamType::Str, V::Float(v)) => V::Text(v.to_string()),
            (ParamType::Str, V::Bool(v)) => V::Text(if *v { "1" } else { "0" }.to_string()),
            (ParamType::Str, V::Bytes(b)) => match std::str::from_utf8(b) {
                Ok(s) => V::Text(s.to_string()),
                Err(_) => return Err(Self::mismatch(self, value)),
            },

            (ParamType::Int, V::Int(v)) => V::Int(*v),
            (ParamType::Int, V::Bool(v)) => V::Int(i64::from(*v)),
            (ParamType::Int, V::Text(s)) => match s.trim().parse::<i64>() {
                Ok(v) => V::Int(v),
                Err(_) => return Err(Self::mismatch(self, value)),
            },
            (ParamType::Int, V::Float(v))
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 =>
            {
                V::Int(*v as i64)
            }

            (ParamType::Binary, V::Bytes(b)) => V::Bytes(b.clone()),
            (ParamType::Binary, V::Text(s)) => V::Bytes(s.as_bytes().to_vec()),

            _ => return Err(Self::mismatch(self, value)),
        };

        Ok(coerced)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Str => "string",
            ParamType::Int => "integer",
            ParamType::Binary => "binary",
        }
    }

    fn mismatch(&self, value: &DatabaseValue) -> DatabaseError {
        DatabaseError::type_mismatch(self.as_str(), value.type_name())
    }
}

/// Parameter set for a single statement execution
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Params {
    /// No parameters
    #[default]
    None,
    /// `:name` placeholders; names are stored without the leading colon
    Named(Vec<(String, DatabaseValue)>),
    /// 1-based ordinal placeholders with inferred types
    Positional(Vec<DatabaseValue>),
    /// 1-based ordinal placeholders with declared storage types
    Typed(Vec<(DatabaseValue, ParamType)>),
}

/// Parameters in the shape a backend binds them
#[derive(Debug)]
pub enum Bindings<'a> {
    Named(&'a [(String, DatabaseValue)]),
    Ordinal(Cow<'a, [DatabaseValue]>),
}

impl Params {
    pub fn none() -> Self {
        Params::None
    }

    /// Named parameters. A leading `:` on a key is optional; a repeated key keeps the last value.
    pub fn named<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<DatabaseValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut named: Vec<(String, DatabaseValue)> = Vec::new();
        for (key, value) in pairs {
            let key: String = key.into();
            let key = key.strip_prefix(':').map(str::to_string).unwrap_or(key);
            let value = value.into();
            match named.iter_mut().find(|(existing, _)| *existing == key) {
                Some((_, slot)) => *slot = value,
                None => named.push((key, value)),
            }
        }
        Params::Named(named)
    }

    /// Ordinal parameters bound in iteration order
    pub fn positional<V, I>(values: I) -> Self
    where
        V: Into<DatabaseValue>,
        I: IntoIterator<Item = V>,
    {
        Params::Positional(values.into_iter().map(Into::into).collect())
    }

    /// Ordinal parameters paired one-to-one with declared storage types
    pub fn typed<V, I, H>(values: I, hints: H) -> Result<Self>
    where
        V: Into<DatabaseValue>,
        I: IntoIterator<Item = V>,
        H: IntoIterator<Item = ParamType>,
    {
        let values: Vec<DatabaseValue> = values.into_iter().map(Into::into).collect();
        let hints: Vec<ParamType> = hints.into_iter().collect();
        if values.len() != hints.len() {
            return Err(DatabaseError::execution(format!(
                "{} parameters but {} type hints",
                values.len(),
                hints.len()
            )));
        }
        Ok(Params::Typed(values.into_iter().zip(hints).collect()))
    }

    pub fn len(&self) -> usize {
        match self {
            Params::None => 0,
            Params::Named(v) => v.len(),
            Params::Positional(v) => v.len(),
            Params::Typed(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve into the form a backend binds, applying type hints
    pub fn bindings(&self) -> Result<Bindings<'_>> {
        Ok(match self {
            Params::None => Bindings::Ordinal(Cow::Borrowed(&[])),
            Params::Named(pairs) => Bindings::Named(pairs),
            Params::Positional(values) => Bindings::Ordinal(Cow::Borrowed(values)),
            Params::Typed(pairs) => Bindings::Ordinal(Cow::Owned(
                pairs
                    .iter()
                    .map(|(value, hint)| hint.coerce(value))
                    .collect::<Result<Vec<_>>>()?,
            )),
        })
    }

    /// JSON rendering for log events
    pub fn to_log_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("<unserializable: {}>", e))
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Params::None => serializer.serialize_seq(Some(0))?.end(),
            Params::Named(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (name, value) in pairs {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Params::Positional(values) => values.serialize(serializer),
            Params::Typed(pairs) => {
                let mut seq = serializer.serialize_seq(Some(pairs.len()))?;
                for (value, _) in pairs {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
        }
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Params::None
    }
}

impl From<Vec<DatabaseValue>> for Params {
    fn from(values: Vec<DatabaseValue>) -> Self {
        Params::Positional(values)
    }
}

impl<K: Into<String>, V: Into<DatabaseValue>> From<Vec<(K, V)>> for Params {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Params::named(pairs)
    }
}

impl<K: Into<String>, V: Into<DatabaseValue>, const N: usize> From<[(K, V); N]> for Params {
    fn from(pairs: [(K, V); N]) -> Self {
        Params::named(pairs)
    }
}
