//! Storage-level errors and their mapping onto the core error taxonomy.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

use backoffice_core::errors::{CommitError, Error, StoreConstraintError};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection pool error: {0}")]
    PoolError(String),

    #[error("Query failed: {0}")]
    QueryFailed(#[from] DieselError),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

impl From<r2d2::Error> for StorageError {
    fn from(err: r2d2::Error) -> Self {
        StorageError::PoolError(err.to_string())
    }
}

/// Constraint violations surface as `StoreConstraint` so callers can tell
/// a rejected batch apart from infrastructure failure.
impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::QueryFailed(DieselError::DatabaseError(kind, info)) => match kind {
                DatabaseErrorKind::UniqueViolation => {
                    StoreConstraintError::Unique(info.message().to_string()).into()
                }
                DatabaseErrorKind::ForeignKeyViolation => {
                    StoreConstraintError::ForeignKey(info.message().to_string()).into()
                }
                DatabaseErrorKind::CheckViolation => {
                    StoreConstraintError::Check(info.message().to_string()).into()
                }
                _ => CommitError::Query(info.message().to_string()).into(),
            },
            StorageError::QueryFailed(e) => CommitError::Query(e.to_string()).into(),
            StorageError::ConnectionFailed(msg) => CommitError::Connection(msg).into(),
            StorageError::PoolError(msg) => CommitError::Pool(msg).into(),
            StorageError::MigrationFailed(msg) => CommitError::Migration(msg).into(),
        }
    }
}
