//! Backoffice Core - domain models, the ingestion pipeline, and traits.
//!
//! This crate contains the validation and write-commit pipeline shared by
//! net position snapshots and intraday trade executions. It is
//! store-agnostic: the authoritative store lives behind `IngestStoreTrait`,
//! which is implemented by the `backoffice-storage-sqlite` crate.

pub mod errors;
pub mod ingest;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
