//! Ingestion module - the validation and write-commit pipeline shared by
//! net position snapshots (idempotent upsert) and intraday trade
//! executions (append-only ledger).
//!
//! Control flow: raw file -> CSV reader -> schema validator -> row
//! normalizer -> business rule validator -> commit planner -> atomic
//! writer -> store. Any stage failure aborts the run with zero writes.

mod contract;
mod csv_reader;
mod ingest_constants;
mod ingest_errors;
mod ingest_model;
mod ingest_service;
mod ingest_traits;
mod normalizer;
mod planner;
mod rules;
mod schema_validator;


pub use contract::{ColumnContract, ColumnSpec, ColumnType, IngestContracts};
pub use csv_reader::{parse_csv, read_csv_file, RawBatch};
pub use ingest_constants::*;
pub use ingest_errors::{
    DuplicateKeyError, NormalizationError, RuleViolation, SchemaError, ValidationError,
};
pub use ingest_model::{
    net_position_key_columns, BatchKind, CanonicalBatch, CanonicalRow, CanonicalValue, CommitPlan,
    CommitReceipt, IntradayTradeRow, NetPositionRow, PositionKey, TypedBatch, TypedRow,
    ValidatedBatch,
};
pub use ingest_service::{execute_plan, IngestService};
pub use ingest_traits::{IngestServiceTrait, IngestStoreTrait};
pub use normalizer::normalize_batch;
pub use planner::plan_commit;
pub use rules::validate_batch;
pub use schema_validator::validate_schema;
