//! MySQL database backend implementation
//!
//! The driver is asynchronous; each [`MysqlDatabase`] owns a current-thread
//! tokio runtime and blocks on it for every call, so the public API stays
//! synchronous and one call runs at a time.
//!
//! Named parameters must match the statement's `:name` placeholders exactly
//! before anything is sent to the server. Driver faults raised by a statement
//! surface as [`DatabaseError::Execution`] with the driver error as source.

use crate::core::{
    database_types::DatabaseType,
    error::{DatabaseError, Result},
    executor::{Executor, MutationOutcome},
    params::{Bindings, Params},
    row::{DatabaseResult, DatabaseRow},
    value::DatabaseValue,
};
use mysql_async::consts::ColumnType;
use mysql_async::prelude::Queryable;
use mysql_async::{Conn, OptsBuilder, Row, Value};
use std::path::Path;
use tokio::runtime::Runtime;

/// Character set id MySQL reports for binary (non-text) columns
const BINARY_CHARSET: u16 = 63;

/// Statement run on every new session so 4-byte UTF-8 round-trips
const INIT_CHARSET: &str = "SET NAMES utf8mb4";

/// MySQL database implementation
pub struct MysqlDatabase {
    runtime: Runtime,
    connection: Option<Conn>,
    in_transaction: bool,
}

impl MysqlDatabase {
    /// Connect over TCP
    pub fn connect_host(
        host: &str,
        port: u16,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<Self> {
        let opts = OptsBuilder::default()
            .ip_or_hostname(host)
            .tcp_port(port)
            .db_name(Some(database))
            .user(Some(user))
            .pass(Some(password))
            .init(vec![INIT_CHARSET]);
        Self::connect(opts)
    }

    /// Connect through a unix-domain socket
    pub fn connect_socket(
        socket: impl AsRef<Path>,
        database: &str,
        user: &str,
        password: &str,
    ) -> Result<Self> {
        let socket = socket.as_ref().to_string_lossy().into_owned();
        let opts = OptsBuilder::default()
            .socket(Some(socket))
            .db_name(Some(database))
            .user(Some(user))
            .pass(Some(password))
            .init(vec![INIT_CHARSET]);
        Self::connect(opts)
    }

    fn connect(opts: OptsBuilder) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let connection = runtime.block_on(Conn::new(opts))?;

        Ok(Self {
            runtime,
            connection: Some(connection),
            in_transaction: false,
        })
    }

    /// Convert DatabaseValue to a driver value
    fn value_to_param(value: &DatabaseValue) -> Value {
        match value {
            DatabaseValue::Null => Value::NULL,
            DatabaseValue::Bool(v) => Value::Int(i64::from(*v)),
            DatabaseValue::Int(v) => Value::Int(*v),
            DatabaseValue::Float(v) => Value::Double(*v),
            DatabaseValue::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
            DatabaseValue::Bytes(b) => Value::Bytes(b.clone()),
        }
    }

    fn to_driver_params(sql: &str, params: &Params) -> Result<mysql_async::Params> {
        Ok(match params.bindings()? {
            Bindings::Named(pairs) => {
                check_named_params(sql, pairs)?;
                if pairs.is_empty() {
                    return Ok(mysql_async::Params::Empty);
                }
                Self::named_to_driver(pairs)
            }
            Bindings::Ordinal(values) if values.is_empty() => mysql_async::Params::Empty,
            Bindings::Ordinal(values) => mysql_async::Params::Positional(
                values.iter().map(Self::value_to_param).collect(),
            ),
        })
    }

    fn named_to_driver(pairs: &[(String, DatabaseValue)]) -> mysql_async::Params {
        mysql_async::Params::from(
            pairs
                .iter()
                .map(|(name, value)| (name.clone(), Self::value_to_param(value)))
                .collect::<Vec<_>>(),
        )
    }

    /// Convert a driver value; `binary` marks columns whose bytes are not text
    fn value_from_driver(value: Value, binary: bool) -> DatabaseValue {
        match value {
            Value::NULL => DatabaseValue::Null,
            Value::Int(v) => DatabaseValue::Int(v),
            Value::UInt(v) => match i64::try_from(v) {
                Ok(v) => DatabaseValue::Int(v),
                Err(_) => DatabaseValue::Text(v.to_string()),
            },
            Value::Float(v) => DatabaseValue::Float(f64::from(v)),
            Value::Double(v) => DatabaseValue::Float(v),
            Value::Bytes(b) if binary => DatabaseValue::Bytes(b),
            Value::Bytes(b) => match String::from_utf8(b) {
                Ok(s) => DatabaseValue::Text(s),
                Err(e) => DatabaseValue::Bytes(e.into_bytes()),
            },
            Value::Date(year, month, day, hour, minute, second, micros) => {
                DatabaseValue::Text(format_datetime(year, month, day, hour, minute, second, micros))
            }
            Value::Time(negative, days, hours, minutes, seconds, micros) => DatabaseValue::Text(
                format_time(negative, days, hours, minutes, seconds, micros),
            ),
        }
    }

    fn is_binary_column(column: &mysql_async::Column) -> bool {
        column.character_set() == BINARY_CHARSET
            && matches!(
                column.column_type(),
                ColumnType::MYSQL_TYPE_TINY_BLOB
                    | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
                    | ColumnType::MYSQL_TYPE_LONG_BLOB
                    | ColumnType::MYSQL_TYPE_BLOB
                    | ColumnType::MYSQL_TYPE_VAR_STRING
                    | ColumnType::MYSQL_TYPE_VARCHAR
                    | ColumnType::MYSQL_TYPE_STRING
                    | ColumnType::MYSQL_TYPE_GEOMETRY
            )
    }

    fn row_to_database_row(row: Row) -> DatabaseRow {
        let columns = row.columns();
        let values = row.unwrap();

        let mut db_row = DatabaseRow::with_capacity(columns.len());
        for (column, value) in columns.iter().zip(values) {
            db_row.insert(
                column.name_str().into_owned(),
                Self::value_from_driver(value, Self::is_binary_column(column)),
            );
        }
        db_row
    }

    fn transaction_command(&mut self, command: &str, expect_open: bool) -> Result<()> {
        if self.in_transaction != expect_open {
            return Err(DatabaseError::transaction(if self.in_transaction {
                "Already in a transaction"
            } else {
                "Not in a transaction"
            }));
        }
        let conn = self
            .connection
            .as_mut()
            .ok_or_else(|| DatabaseError::connection("Not connected to database"))?;
        self.runtime.block_on(conn.query_drop(command))?;
        self.in_transaction = !expect_open;
        Ok(())
    }
}

/// Names of the `:name` placeholders in `sql`, in order of first use
///
/// Quoted strings, quoted identifiers and comments are skipped, and `::` or
/// `:=` never start a placeholder.
fn named_placeholders(sql: &str) -> Vec<&str> {
    let bytes = sql.as_bytes();
    let is_name_byte = |b: u8| b.is_ascii_alphanumeric() || b == b'_';
    let mut names: Vec<&str> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' && quote != b'`' {
                        i += 1;
                    }
                    i += 1;
                }
                i += 1;
            }
            b'#' => i = skip_line(bytes, i),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = sql[i + 2..].find("*/").map_or(bytes.len(), |end| i + 2 + end + 2);
            }
            b':' if (i == 0 || bytes[i - 1] != b':')
                && bytes
                    .get(i + 1)
                    .is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') =>
            {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && is_name_byte(bytes[end]) {
                    end += 1;
                }
                let name = &sql[start..end];
                if !names.contains(&name) {
                    names.push(name);
                }
                i = end;
            }
            _ => i += 1,
        }
    }
    names
}

fn skip_line(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |end| from + end + 1)
}

/// Every named parameter needs a placeholder and every placeholder a parameter
fn check_named_params(sql: &str, pairs: &[(String, DatabaseValue)]) -> Result<()> {
    let placeholders = named_placeholders(sql);

    if let Some((name, _)) = pairs
        .iter()
        .find(|(name, _)| !placeholders.contains(&name.as_str()))
    {
        return Err(DatabaseError::execution(format!(
            "parameter :{} has no placeholder in statement",
            name
        )));
    }
    if let Some(missing) = placeholders
        .iter()
        .find(|placeholder| !pairs.iter().any(|(name, _)| name == *placeholder))
    {
        return Err(DatabaseError::execution(format!(
            "placeholder :{} is not bound",
            missing
        )));
    }
    Ok(())
}

fn format_datetime(
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    micros: u32,
) -> String {
    let mut out = format!(
        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
        year, month, day, hour, minute, second
    );
    if micros > 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}

fn format_time(negative: bool, days: u32, hours: u8, minutes: u8, seconds: u8, micros: u32) -> String {
    let total_hours = u64::from(days) * 24 + u64::from(hours);
    let mut out = format!(
        "{}{:02}:{:02}:{:02}",
        if negative { "-" } else { "" },
        total_hours,
        minutes,
        seconds
    );
    if micros > 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}

impl Executor for MysqlDatabase {
    fn database_type(&self) -> DatabaseType {
        DatabaseType::Mysql
    }

    fn query_rows(&mut self, sql: &str, params: &Params) -> Result<DatabaseResult> {
        let params = Self::to_driver_params(sql, params)?;
        let conn = self
            .connection
            .as_mut()
            .ok_or_else(|| DatabaseError::connection("Not connected to database"))?;

        let rows: Vec<Row> = self
            .runtime
            .block_on(conn.exec(sql, params))
            .map_err(DatabaseError::execution_from)?;
        Ok(rows.into_iter().map(Self::row_to_database_row).collect())
    }

    fn execute_mutation(&mut self, sql: &str, params: &Params) -> Result<MutationOutcome> {
        let params = Self::to_driver_params(sql, params)?;
        let conn = self
            .connection
            .as_mut()
            .ok_or_else(|| DatabaseError::connection("Not connected to database"))?;

        self.runtime
            .block_on(conn.exec_drop(sql, params))
            .map_err(DatabaseError::execution_from)?;
        Ok(MutationOutcome {
            rows_affected: conn.affected_rows(),
            last_insert_id: conn.last_insert_id(),
        })
    }

    fn begin_transaction(&mut self) -> Result<()> {
        self.transaction_command("START TRANSACTION", false)
    }

    fn commit(&mut self) -> Result<()> {
        self.transaction_command("COMMIT", true)
    }

    fn rollback(&mut self) -> Result<()> {
        self.transaction_command("ROLLBACK", true)
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
    }
}

impl Drop for MysqlDatabase {
    fn drop(&mut self) {
        let Some(mut conn) = self.connection.take() else {
            return;
        };
        if self.in_transaction {
            if let Err(e) = self.runtime.block_on(conn.query_drop("ROLLBACK")) {
                tracing::warn!(error = %e, "rollback on close failed");
            }
        }
        if let Err(e) = self.runtime.block_on(conn.disconnect()) {
            tracing::warn!(error = %e, "disconnect failed");
        }
    }
}
