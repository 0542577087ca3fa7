//! SQLite persistence for the backoffice ingestion pipeline.
//!
//! This crate is the only place Diesel appears. `backoffice-core` defines
//! the `IngestStoreTrait` seam; this crate implements it:
//!
//! ```text
//!   backoffice-core                backoffice-storage-sqlite
//!   +--------------------+         +--------------------------+
//!   | IngestService      | ------> | SqliteIngestStore        |
//!   |  (pipeline stages) |  trait  |  (Diesel, transactions)  |
//!   +--------------------+         +--------------------------+
//! ```
//!
//! Writes are all-or-nothing: each store call runs inside a single
//! immediate transaction, and a constraint violation rolls back the
//! whole batch.

pub mod db;
pub mod errors;
pub mod ingest;
pub mod schema;

pub use db::{create_pool, get_connection, run_migrations, DbConnection, DbPool};
pub use errors::StorageError;
pub use ingest::SqliteIngestStore;
