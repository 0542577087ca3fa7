//! Core error types for the backoffice ingestion pipeline.
//!
//! This module defines store-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage
//! layer.

use thiserror::Error;

use crate::ingest::{DuplicateKeyError, NormalizationError, SchemaError, ValidationError};

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the ingestion pipeline.
///
/// Every stage fails fast and aborts the whole run: there is no local
/// recovery, no row skipping, and no best-effort partial ingestion.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read input file: {0}")]
    Io(String),

    #[error("schema validation failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("normalization failed: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("batch validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("duplicate key within batch: {0}")]
    DuplicateKey(#[from] DuplicateKeyError),

    #[error("store constraint violation: {0}")]
    StoreConstraint(#[from] StoreConstraintError),

    #[error("commit failed: {0}")]
    Commit(#[from] CommitError),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}

/// Store-side constraint rejection surfaced at commit time.
///
/// Cross-batch duplicate detection is delegated to the store's constraint
/// layer; a re-run of an already-committed intraday file lands here.
#[derive(Error, Debug)]
pub enum StoreConstraintError {
    #[error("unique constraint violated: {0}")]
    Unique(String),

    #[error("foreign key constraint violated: {0}")]
    ForeignKey(String),

    #[error("check constraint violated: {0}")]
    Check(String),
}

/// Store-side failure outside constraint violations.
///
/// The pipeline makes no retry attempt; retries are an operator-level
/// decision outside this core.
#[derive(Error, Debug)]
pub enum CommitError {
    /// Failed to establish a store connection.
    #[error("failed to connect to store: {0}")]
    Connection(String),

    /// Failed to create or draw from the connection pool.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// The transaction was aborted and rolled back.
    #[error("transaction aborted: {0}")]
    Transaction(String),

    /// A store query failed to execute.
    #[error("store query failed: {0}")]
    Query(String),

    /// Store migration failed.
    #[error("store migration failed: {0}")]
    Migration(String),
}
