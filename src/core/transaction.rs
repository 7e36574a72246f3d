//! Transaction guard for automatic rollback on drop
//!
//! This module provides RAII-style transaction management. A guard begins a
//! transaction when created and finishes it exactly once: by [`commit`],
//! by [`rollback`], or by rolling back when dropped unfinished (including
//! while a panic unwinds out of the unit of work).
//!
//! [`commit`]: TransactionGuard::commit
//! [`rollback`]: TransactionGuard::rollback

use super::connection::Connection;
use super::error::Result;

/// Transaction guard that automatically rolls back on drop if not committed
///
/// # Example
///
/// ```
/// use rust_database_helper::prelude::*;
///
/// # fn main() -> Result<()> {
/// let mut db = Connection::connect_sqlite(":memory:")?;
/// db.execute("CREATE TABLE accounts (id INTEGER PRIMARY KEY, balance REAL)", ())?;
///
/// let mut tx = TransactionGuard::begin(&mut db)?;
/// tx.connection()
///     .execute("INSERT INTO accounts (balance) VALUES (:balance)", [("balance", 100.0)])?;
/// tx.commit()?;
/// # Ok(())
/// # }
/// ```
pub struct TransactionGuard<'c> {
    conn: &'c mut Connection,
    finished: bool,
}

impl<'c> TransactionGuard<'c> {
    /// Begin a new transaction
    ///
    /// # Errors
    ///
    /// Returns an error if a transaction is already active on the connection
    /// or the driver refuses to begin one.
    pub fn begin(conn: &'c mut Connection) -> Result<Self> {
        conn.executor().begin_transaction()?;
        tracing::debug!(backend = %conn.database_type(), "transaction started");

        Ok(Self {
            conn,
            finished: false,
        })
    }

    /// The connection the transaction runs on
    pub fn connection(&mut self) -> &mut Connection {
        self.conn
    }

    /// Commit the transaction
    ///
    /// If the commit itself fails the transaction is rolled back before the
    /// commit error is returned.
    pub fn commit(mut self) -> Result<()> {
        self.finished = true;
        match self.conn.executor().commit() {
            Ok(()) => {
                tracing::debug!("transaction committed");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "transaction commit failed, rolling back");
                if let Err(rollback_err) = self.conn.executor().rollback() {
                    tracing::warn!(error = %rollback_err, "rollback after failed commit failed");
                }
                Err(e)
            }
        }
    }

    /// Explicitly rollback the transaction
    pub fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.conn.executor().rollback()?;
        tracing::debug!("transaction rolled back");
        Ok(())
    }
}

impl Drop for TransactionGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        match self.conn.executor().rollback() {
            Ok(()) => tracing::warn!("transaction dropped without commit, rolled back"),
            Err(e) => tracing::warn!(error = %e, "auto-rollback of dropped transaction failed"),
        }
    }
}
