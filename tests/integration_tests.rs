//! Integration tests for the database helper
//!
//! These tests run the public API against real SQLite databases:
//! - Row cardinality contract
//! - Transaction atomicity and commit failure
//! - CRUD helpers
//! - Configuration and file-backed persistence

#[cfg(feature = "sqlite")]
mod sqlite_tests {
    use rust_database_helper::prelude::*;

    fn init_logging() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn users_db() -> Connection {
        init_logging();
        let mut db = Connection::connect_sqlite(":memory:").expect("Failed to connect");
        db.execute(
            "CREATE TABLE users (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, email TEXT)",
            (),
        )
        .expect("Failed to create table");
        db
    }

    fn count_users(db: &mut Connection) -> i64 {
        db.get_column("SELECT COUNT(*) FROM users", ())
            .expect("Count failed")
            .expect("Count returned no row")
            .as_i64()
            .expect("Count is not an integer")
    }

    #[test]
    fn test_get_one_returns_the_matching_row() {
        let mut db = users_db();
        let id = db
            .execute(
                "INSERT INTO users (name, email) VALUES (:name, :email)",
                [("name", "Alice"), ("email", "alice@example.com")],
            )
            .expect("Failed to insert");

        let row = db
            .get_one("SELECT * FROM users WHERE id = :id", [("id", id)])
            .expect("Failed to fetch");
        assert_eq!(row.get_as::<String>("name").unwrap(), "Alice");
        assert_eq!(row.get_as::<String>("email").unwrap(), "alice@example.com");
    }

    #[test]
    fn test_optional_one_on_empty_table() {
        let mut db = users_db();

        let row = db
            .get_optional_one("SELECT * FROM users WHERE id = :id", [("id", 999)])
            .expect("Empty result must not be an error");
        assert!(row.is_none());

        let err = db
            .get_one("SELECT * FROM users WHERE id = :id", [("id", 999)])
            .unwrap_err();
        assert!(err.is_no_result());
        assert_eq!(err.to_string(), "database.result.empty");
    }

    #[test]
    fn test_single_row_fetchers_agree_on_one_row() {
        let mut db = users_db();
        db.insert("users", [("name", "Alice")]).expect("Failed to insert");

        let sql = "SELECT id, name FROM users WHERE name = :name";
        let one = db.get_one(sql, [("name", "Alice")]).unwrap();
        let optional = db.get_optional_one(sql, [("name", "Alice")]).unwrap();
        let many = db.get_many(sql, [("name", "Alice")]).unwrap();

        assert_eq!(optional.as_ref(), Some(&one));
        assert_eq!(many, vec![one]);
    }

    #[test]
    fn test_single_row_fetchers_reject_two_rows() {
        let mut db = users_db();
        db.insert("users", [("name", "Alice")]).unwrap();
        db.insert("users", [("name", "Alice")]).unwrap();

        let sql = "SELECT * FROM users WHERE name = :name";
        assert!(db.get_one(sql, [("name", "Alice")]).unwrap_err().is_too_many_results());
        assert!(db
            .get_optional_one(sql, [("name", "Alice")])
            .unwrap_err()
            .is_too_many_results());
        assert_eq!(db.get_many(sql, [("name", "Alice")]).unwrap().len(), 2);
    }

    #[test]
    fn test_get_many_preserves_order_and_columns() {
        let mut db = users_db();
        for name in ["Carol", "Alice", "Bob"] {
            db.insert("users", [("name", name)]).unwrap();
        }

        let rows = db
            .get_many("SELECT name, id FROM users ORDER BY name", ())
            .unwrap();
        let names: Vec<String> = rows
            .iter()
            .map(|r| r.get_as::<String>("name").unwrap())
            .collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);

        let columns: Vec<&str> = rows[0].column_names().collect();
        assert_eq!(columns, vec!["name", "id"]);
    }

    #[test]
    fn test_driver_fault_translation() {
        let mut db = users_db();

        let err = db.get_one("SELECT * FROM missing_table", ()).unwrap_err();
        assert!(matches!(err, DatabaseError::Database { .. }));
        assert!(err.to_string().starts_with("database.general.error"));
        assert!(matches!(err.root_cause(), DatabaseError::SqliteError(_)));

        let err = db.query("SELECT * FROM missing_table", ()).unwrap_err();
        assert!(matches!(err, DatabaseError::Execution { source: Some(_), .. }));
        assert!(matches!(err.root_cause(), DatabaseError::SqliteError(_)));

        let err = db.query("SELEC * FROM users", ()).unwrap_err();
        assert!(matches!(err, DatabaseError::Execution { .. }));
        assert!(err.to_string().contains("syntax error"));

        let err = db.execute("INSERT INTO missing_table VALUES (1)", ()).unwrap_err();
        assert!(matches!(err, DatabaseError::Execution { .. }));
        assert!(err.to_string().contains("no such table"));
    }

    #[test]
    fn test_execute_returns_sequential_insert_ids() {
        let mut db = users_db();

        let first = db
            .execute("INSERT INTO users (name) VALUES (:name)", [("name", "Alice")])
            .unwrap();
        let second = db
            .execute("  insert INTO users (name) VALUES (:name)", [("name", "Bob")])
            .unwrap();
        assert_eq!((first, second), (1, 2));

        let affected = db
            .execute("UPDATE users SET email = :email", [("email", "x@example.com")])
            .unwrap();
        assert_eq!(affected, 2);
    }

    #[test]
    fn test_transaction_commit_is_visible() {
        let mut db = users_db();

        let id: Result<u64> = db.transaction(|tx| tx.insert("users", [("name", "Alice")]));
        let id = id.expect("Transaction failed");

        assert!(!db.in_transaction());
        let row = db.get_one("SELECT name FROM users WHERE id = :id", [("id", id)]).unwrap();
        assert_eq!(row.get_as::<String>("name").unwrap(), "Alice");
    }

    #[derive(Debug)]
    enum TransferError {
        InsufficientFunds,
        Database(DatabaseError),
    }

    impl From<DatabaseError> for TransferError {
        fn from(e: DatabaseError) -> Self {
            TransferError::Database(e)
        }
    }

    #[test]
    fn test_transaction_rolls_back_on_application_error() {
        let mut db = users_db();

        let result: std::result::Result<(), TransferError> = db.transaction(|tx| {
            tx.insert("users", [("name", "Mallory")])?;
            Err(TransferError::InsufficientFunds)
        });

        assert!(matches!(result, Err(TransferError::InsufficientFunds)));
        assert!(!db.in_transaction());
        assert_eq!(count_users(&mut db), 0);
    }

    #[test]
    fn test_transaction_rolls_back_on_database_error() {
        let mut db = users_db();

        let result: std::result::Result<(), TransferError> = db.transaction(|tx| {
            tx.insert("users", [("name", "Alice")])?;
            tx.execute("INSERT INTO users (name) VALUES (NULL)", ())?;
            Ok(())
        });

        assert!(matches!(result, Err(TransferError::Database(_))));
        assert_eq!(count_users(&mut db), 0);
    }

    #[test]
    fn test_failed_commit_rolls_back() {
        let mut db = users_db();
        db.execute(
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER \
             REFERENCES users(id) DEFERRABLE INITIALLY DEFERRED)",
            (),
        )
        .unwrap();

        // The dangling reference is only checked at COMMIT
        let result: Result<()> = db.transaction(|tx| {
            tx.insert("orders", [("user_id", 42)])?;
            Ok(())
        });

        assert!(matches!(result, Err(DatabaseError::SqliteError(_))));
        assert!(!db.in_transaction());
        assert!(db.select("orders", [("user_id", 42)]).unwrap().is_empty());
    }

    #[test]
    fn test_crud_helpers() {
        let mut db = users_db();

        let id = db
            .insert("users", [("name", "Alice"), ("email", "old@example.com")])
            .unwrap();

        let updated = db
            .update("users", [("email", "new@example.com")], [("id", id)])
            .unwrap();
        assert_eq!(updated, 1);

        let rows = db.select("users", [("id", id)]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_as::<String>("email").unwrap(), "new@example.com");

        // A column used in both SET and WHERE keeps the two values apart
        let renamed = db
            .update("users", [("name", "Alicia")], [("name", "Alice")])
            .unwrap();
        assert_eq!(renamed, 1);

        let deleted = db.delete("users", [("id", id)]).unwrap();
        assert_eq!(deleted, 1);

        let err = db
            .get_one("SELECT * FROM users WHERE id = :id", [("id", id)])
            .unwrap_err();
        assert!(err.is_no_result());
    }

    #[test]
    fn test_select_without_criteria_returns_all_rows() {
        let mut db = users_db();
        db.insert("users", [("name", "Alice")]).unwrap();
        db.insert("users", [("name", "Bob")]).unwrap();

        let none: [(&str, i64); 0] = [];
        assert_eq!(db.select("users", none).unwrap().len(), 2);
    }

    #[test]
    fn test_values_round_trip() {
        init_logging();
        let mut db = Connection::connect_sqlite(":memory:").unwrap();
        db.execute(
            "CREATE TABLE samples (id INTEGER PRIMARY KEY, i INTEGER, f REAL, t TEXT, b BLOB, n TEXT)",
            (),
        )
        .unwrap();

        let id = db
            .insert(
                "samples",
                [
                    ("i", DatabaseValue::from(i64::MIN)),
                    ("f", DatabaseValue::from(-0.5)),
                    ("t", DatabaseValue::from("héllo 😀")),
                    ("b", DatabaseValue::from(vec![0u8, 255, 7])),
                    ("n", DatabaseValue::Null),
                ],
            )
            .unwrap();

        let row = db.select("samples", [("id", id)]).unwrap().remove(0);
        assert_eq!(row.get_as::<i64>("i").unwrap(), i64::MIN);
        assert_eq!(row.get_as::<f64>("f").unwrap(), -0.5);
        assert_eq!(row.get_as::<String>("t").unwrap(), "héllo 😀");
        assert_eq!(row.get_as::<Vec<u8>>("b").unwrap(), vec![0u8, 255, 7]);
        assert_eq!(row.get_as::<Option<String>>("n").unwrap(), None);
        assert!(matches!(
            row.get_as::<String>("i"),
            Err(DatabaseError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_positional_and_typed_parameters() {
        let mut db = users_db();
        db.execute(
            "INSERT INTO users (name, email) VALUES (?, ?)",
            Params::positional(["Alice", "a@example.com"]),
        )
        .unwrap();

        let params = Params::typed(vec![DatabaseValue::from(7)], [ParamType::Str]).unwrap();
        db.execute("INSERT INTO users (name) VALUES (?)", params).unwrap();

        let names: Vec<String> = db
            .get_many("SELECT name FROM users ORDER BY id", ())
            .unwrap()
            .into_iter()
            .map(|r| r.get_as::<String>("name").unwrap())
            .collect();
        assert_eq!(names, vec!["Alice", "7"]);

        assert!(Params::typed(vec![DatabaseValue::from(1)], Vec::<ParamType>::new()).is_err());
    }

    #[test]
    fn test_get_column() {
        let mut db = users_db();
        assert_eq!(
            db.get_column("SELECT name FROM users WHERE id = :id", [(":id", 1)])
                .unwrap(),
            None
        );

        db.insert("users", [("name", "Alice")]).unwrap();
        assert_eq!(
            db.get_column("SELECT name FROM users WHERE id = :id", [(":id", 1)])
                .unwrap(),
            Some(DatabaseValue::Text("Alice".into()))
        );
    }

    #[test]
    fn test_file_database_persists_committed_data() {
        init_logging();
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("app.db");

        {
            let mut db = Connection::connect_sqlite(&path).unwrap();
            db.execute("CREATE TABLE kv (k TEXT PRIMARY KEY, v TEXT)", ())
                .unwrap();
            let _: Result<u64> = db.transaction(|tx| tx.insert("kv", [("k", "a"), ("v", "1")]));

            // Uncommitted work is discarded when the connection closes
            db.executor().begin_transaction().unwrap();
            db.insert("kv", [("k", "b"), ("v", "2")]).unwrap();
            assert!(db.in_transaction());
        }

        let config = ConnectionConfig::from_dsn(&format!("sqlite:{}", path.display()), "", "")
            .expect("Failed to parse DSN");
        let mut db = Connection::open(&config).unwrap();
        let rows = db.get_many("SELECT k FROM kv ORDER BY k", ()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get_as::<String>("k").unwrap(), "a");
    }

    #[test]
    fn test_builder_config_opens_sqlite() {
        let config = ConnectionBuilder::new(DatabaseType::Sqlite)
            .database(":memory:")
            .build()
            .expect("Failed to build config");
        let db = Connection::open(&config).unwrap();
        assert_eq!(db.database_type(), DatabaseType::Sqlite);
    }

    #[test]
    fn test_foreign_keys_enforced() {
        let mut db = users_db();
        db.execute(
            "CREATE TABLE orders (id INTEGER PRIMARY KEY, user_id INTEGER REFERENCES users(id))",
            (),
        )
        .unwrap();

        let err = db.insert("orders", [("user_id", 42)]).unwrap_err();
        assert!(matches!(err, DatabaseError::Execution { .. }));
        assert!(matches!(err.root_cause(), DatabaseError::SqliteError(_)));
    }
}
