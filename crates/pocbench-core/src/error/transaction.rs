//! Transaction error types for storage, locking and commit faults.
//!
//! Every fault raised after a transaction was opened lands here. The detail
//! strings are for logs only; clients get a generic message.

use thiserror::Error;

/// SQLSTATE raised when `lock_timeout` expires while waiting on a row lock.
const SQLSTATE_LOCK_NOT_AVAILABLE: &str = "55P03";
/// SQLSTATE raised by deadlock detection.
const SQLSTATE_DEADLOCK_DETECTED: &str = "40P01";
/// SQLSTATE class for integrity constraint violations.
const SQLSTATE_CLASS_INTEGRITY: &str = "23";

/// Infrastructure faults surfaced as `TransactionError` to the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    /// Waiting for a row lock exceeded the configured lock-wait timeout
    #[error("lock wait timeout exceeded")]
    LockTimeout,
    /// The storage engine aborted the transaction to break a deadlock
    #[error("deadlock detected")]
    Deadlock,
    /// The storage engine could not be reached or the pool is exhausted
    #[error("storage connection failed: {0}")]
    Connection(String),
    /// An integrity constraint rejected a write
    #[error("constraint violation: {0}")]
    Constraint(String),
    /// The commit itself failed
    #[error("commit failed: {0}")]
    Commit(String),
    /// Any other storage fault
    #[error("storage error: {0}")]
    Storage(String),
}

impl TransactionError {
    /// Classify a SQLSTATE code and driver message.
    ///
    /// Statement cancellation (`57014`) and serialization failures (`40001`)
    /// are not lock waits or deadlocks and stay `Storage`.
    pub fn from_sqlstate(code: &str, message: &str) -> Self {
        match code {
            SQLSTATE_LOCK_NOT_AVAILABLE => Self::LockTimeout,
            SQLSTATE_DEADLOCK_DETECTED => Self::Deadlock,
            c if c.starts_with(SQLSTATE_CLASS_INTEGRITY) => Self::Constraint(message.to_string()),
            _ => Self::Storage(format!("[{code}] {message}")),
        }
    }

    /// Reclassify a fault raised by `COMMIT`.
    ///
    /// Lock and deadlock faults keep their kind; everything else becomes
    /// `Commit`.
    pub fn at_commit(self) -> Self {
        match self {
            Self::LockTimeout | Self::Deadlock | Self::Connection(_) => self,
            Self::Constraint(msg) | Self::Commit(msg) | Self::Storage(msg) => Self::Commit(msg),
        }
    }
}

impl From<sqlx::Error> for TransactionError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => db_err.code().map_or_else(
                || Self::Storage(db_err.message().to_string()),
                |code| Self::from_sqlstate(&code, db_err.message()),
            ),
            sqlx::Error::PoolTimedOut => Self::Connection("connection pool timed out".to_string()),
            sqlx::Error::PoolClosed => Self::Connection("connection pool closed".to_string()),
            sqlx::Error::Io(e) => Self::Connection(e.to_string()),
            sqlx::Error::Tls(e) => Self::Connection(e.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}
