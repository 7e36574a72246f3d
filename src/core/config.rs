//! Connection configuration
//!
//! A [`ConnectionConfig`] names one database and the transport used to reach it.
//! It can be deserialized from application configuration, parsed from a
//! PDO-style DSN, or assembled with [`ConnectionBuilder`].

use super::database_types::DatabaseType;
use super::error::{DatabaseError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Default MySQL TCP port
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

fn default_mysql_port() -> u16 {
    DEFAULT_MYSQL_PORT
}

/// Where a connection goes and how it authenticates
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "driver", rename_all = "snake_case")]
pub enum ConnectionConfig {
    /// Embedded single-file database; `:memory:` opens a private in-memory database
    Sqlite { path: PathBuf },
    /// MySQL over TCP
    MysqlHost {
        host: String,
        #[serde(default = "default_mysql_port")]
        port: u16,
        database: String,
        user: String,
        #[serde(default)]
        password: String,
    },
    /// MySQL over a unix-domain socket
    MysqlSocket {
        socket: PathBuf,
        database: String,
        user: String,
        #[serde(default)]
        password: String,
    },
}

impl ConnectionConfig {
    /// Embedded database at `path`
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        ConnectionConfig::Sqlite { path: path.into() }
    }

    /// Private in-memory embedded database
    pub fn sqlite_memory() -> Self {
        Self::sqlite(":memory:")
    }

    pub fn database_type(&self) -> DatabaseType {
        match self {
            ConnectionConfig::Sqlite { .. } => DatabaseType::Sqlite,
            ConnectionConfig::MysqlHost { .. } | ConnectionConfig::MysqlSocket { .. } => {
                DatabaseType::Mysql
            }
        }
    }

    /// Parse a PDO-style DSN
    ///
    /// Accepted forms:
    /// - `sqlite:<path>`
    /// - `mysql:host=<host>[;port=<port>];dbname=<db>[;charset=<cs>]`
    /// - `mysql:unix_socket=<path>;dbname=<db>[;charset=<cs>]`
    ///
    /// Credentials are ignored for SQLite. The MySQL `charset` key is accepted
    /// but utf8mb4 is always negotiated.
    pub fn from_dsn(dsn: &str, user: &str, password: &str) -> Result<Self> {
        let (scheme, rest) = dsn
            .split_once(':')
            .ok_or_else(|| DatabaseError::InvalidConnectionString(dsn.to_string()))?;

        let db_type: DatabaseType = scheme
            .parse()
            .map_err(DatabaseError::InvalidConnectionString)?;

        match db_type {
            DatabaseType::Sqlite => {
                if rest.is_empty() {
                    return Err(DatabaseError::InvalidConnectionString(format!(
                        "{}: missing path",
                        dsn
                    )));
                }
                Ok(Self::sqlite(rest))
            }
            DatabaseType::Mysql => Self::parse_mysql(dsn, rest, user, password),
        }
    }

    fn parse_mysql(dsn: &str, rest: &str, user: &str, password: &str) -> Result<Self> {
        let mut host = None;
        let mut port = None;
        let mut socket = None;
        let mut database = None;

        for pair in rest.split(';').filter(|p| !p.trim().is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| {
                DatabaseError::InvalidConnectionString(format!("{}: malformed '{}'", dsn, pair))
            })?;
            let value = value.trim();
            match key.trim() {
                "host" => host = Some(value.to_string()),
                "port" => {
                    port = Some(value.parse::<u16>().map_err(|_| {
                        DatabaseError::InvalidConnectionString(format!(
                            "{}: invalid port '{}'",
                            dsn, value
                        ))
                    })?)
                }
                "unix_socket" => socket = Some(PathBuf::from(value)),
                "dbname" => database = Some(value.to_string()),
                "charset" => {}
                other => {
                    return Err(DatabaseError::InvalidConnectionString(format!(
                        "{}: unknown key '{}'",
                        dsn, other
                    )))
                }
            }
        }

        let database = database.ok_or_else(|| {
            DatabaseError::InvalidConnectionString(format!("{}: missing dbname", dsn))
        })?;

        match (host, socket) {
            (Some(host), None) => Ok(ConnectionConfig::MysqlHost {
                host,
                port: port.unwrap_or(DEFAULT_MYSQL_PORT),
                database,
                user: user.to_string(),
                password: password.to_string(),
            }),
            (None, Some(socket)) => Ok(ConnectionConfig::MysqlSocket {
                socket,
                database,
                user: user.to_string(),
                password: password.to_string(),
            }),
            (Some(_), Some(_)) => Err(DatabaseError::InvalidConnectionString(format!(
                "{}: host and unix_socket are exclusive",
                dsn
            ))),
            (None, None) => Err(DatabaseError::InvalidConnectionString(format!(
                "{}: missing host or unix_socket",
                dsn
            ))),
        }
    }
}

/// Renders the DSN without credentials
impl fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionConfig::Sqlite { path } => write!(f, "sqlite:{}", path.display()),
            ConnectionConfig::MysqlHost {
                host,
                port,
                database,
                ..
            } => write!(
                f,
                "mysql:host={};port={};dbname={};charset=utf8mb4",
                host, port, database
            ),
            ConnectionConfig::MysqlSocket {
                socket, database, ..
            } => write!(
                f,
                "mysql:unix_socket={};dbname={};charset=utf8mb4",
                socket.display(),
                database
            ),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionConfig::Sqlite { path } => {
                f.debug_struct("Sqlite").field("path", path).finish()
            }
            ConnectionConfig::MysqlHost {
                host,
                port,
                database,
                user,
                ..
            } => f
                .debug_struct("MysqlHost")
                .field("host", host)
                .field("port", port)
                .field("database", database)
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
            ConnectionConfig::MysqlSocket {
                socket,
                database,
                user,
                ..
            } => f
                .debug_struct("MysqlSocket")
                .field("socket", socket)
                .field("database", database)
                .field("user", user)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Database connection builder
pub struct ConnectionBuilder {
    db_type: DatabaseType,
    host: Option<String>,
    port: Option<u16>,
    socket: Option<PathBuf>,
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
}

impl ConnectionBuilder {
    /// Create a new connection builder for the specified database type
    pub fn new(db_type: DatabaseType) -> Self {
        Self {
            db_type,
            host: None,
            port: None,
            socket: None,
            database: None,
            username: None,
            password: None,
        }
    }

    /// Set the database host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the database port
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Connect through a unix-domain socket instead of TCP
    pub fn socket<P: Into<PathBuf>>(mut self, socket: P) -> Self {
        self.socket = Some(socket.into());
        self
    }

    /// Set the database name (the file path for SQLite)
    pub fn database<S: Into<String>>(mut self, database: S) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the username
    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password
    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Build the connection configuration
    ///
    /// SQLite defaults to an in-memory database. MySQL defaults to
    /// `localhost:3306` as `root` with an empty password, and requires a
    /// database name.
    pub fn build(self) -> Result<ConnectionConfig> {
        match self.db_type {
            DatabaseType::Sqlite => Ok(ConnectionConfig::sqlite(
                self.database.unwrap_or_else(|| ":memory:".to_string()),
            )),
            DatabaseType::Mysql => {
                let database = self.database.ok_or_else(|| {
                    DatabaseError::InvalidConnectionString("mysql: missing database".to_string())
                })?;
                let user = self.username.unwrap_or_else(|| "root".to_string());
                let password = self.password.unwrap_or_default();
                match self.socket {
                    Some(socket) => Ok(ConnectionConfig::MysqlSocket {
                        socket,
                        database,
                        user,
                        password,
                    }),
                    None => Ok(ConnectionConfig::MysqlHost {
                        host: self.host.unwrap_or_else(|| "localhost".to_string()),
                        port: self.port.unwrap_or(DEFAULT_MYSQL_PORT),
                        database,
                        user,
                        password,
                    }),
                }
            }
        }
    }

    /// Build the DSN string (credentials are not part of it)
    pub fn build_connection_string(self) -> Result<String> {
        self.build().map(|config| config.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_builder_sqlite() {
        let config = ConnectionBuilder::new(DatabaseType::Sqlite)
            .database("test.db")
            .build()
            .unwrap();
        assert_eq!(config, ConnectionConfig::sqlite("test.db"));

        let dsn = ConnectionBuilder::new(DatabaseType::Sqlite)
            .build_connection_string()
            .unwrap();
        assert_eq!(dsn, "sqlite::memory:");
    }

    #[test]
    fn test_connection_builder_mysql() {
        let dsn = ConnectionBuilder::new(DatabaseType::Mysql)
            .host("db.internal")
            .port(3307)
            .database("mydb")
            .username("user")
            .password("pass")
            .build_connection_string()
            .unwrap();
        assert_eq!(dsn, "mysql:host=db.internal;port=3307;dbname=mydb;charset=utf8mb4");
        assert!(!dsn.contains("pass"));
    }

    #[test]
    fn test_connection_builder_mysql_socket() {
        let config = ConnectionBuilder::new(DatabaseType::Mysql)
            .socket("/run/mysqld/mysqld.sock")
            .database("mydb")
            .build()
            .unwrap();
        assert!(matches!(config, ConnectionConfig::MysqlSocket { .. }));
        assert!(ConnectionBuilder::new(DatabaseType::Mysql).build().is_err());
    }

    #[test]
    fn test_from_dsn() {
        assert_eq!(
            ConnectionConfig::from_dsn("sqlite:/tmp/app.db", "", "").unwrap(),
            ConnectionConfig::sqlite("/tmp/app.db")
        );

        let config =
            ConnectionConfig::from_dsn("mysql:host=localhost;dbname=app;charset=utf8mb4", "u", "p")
                .unwrap();
        assert_eq!(
            config,
            ConnectionConfig::MysqlHost {
                host: "localhost".into(),
                port: 3306,
                database: "app".into(),
                user: "u".into(),
                password: "p".into(),
            }
        );

        let config =
            ConnectionConfig::from_dsn("mysql:unix_socket=/var/run/mysql.sock;dbname=app", "u", "")
                .unwrap();
        assert_eq!(config.database_type(), DatabaseType::Mysql);
        assert!(matches!(config, ConnectionConfig::MysqlSocket { .. }));
    }

    #[test]
    fn test_from_dsn_rejects_malformed() {
        for dsn in [
            "nothing",
            "postgres:host=x;dbname=y",
            "sqlite:",
            "mysql:host=x",
            "mysql:dbname=y",
            "mysql:host=x;port=abc;dbname=y",
            "mysql:host=x;unix_socket=/s;dbname=y",
            "mysql:host=x;dbname=y;sslmode=on",
        ] {
            assert!(
                matches!(
                    ConnectionConfig::from_dsn(dsn, "u", "p"),
                    Err(DatabaseError::InvalidConnectionString(_))
                ),
                "accepted {}",
                dsn
            );
        }
    }

    #[test]
    fn test_config_deserialize_and_redact() {
        let config: ConnectionConfig = serde_json::from_str(
            r#"{"driver":"mysql_host","host":"h","database":"d","user":"u","password":"secret"}"#,
        )
        .unwrap();
        assert!(matches!(
            config,
            ConnectionConfig::MysqlHost { port: 3306, .. }
        ));
        assert!(!format!("{:?}", config).contains("secret"));
        assert!(!config.to_string().contains("secret"));
    }
}
