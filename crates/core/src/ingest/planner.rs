//! Turns a validated batch into an explicit commit plan.
//!
//! The plan states the write mode up front so the store layer never
//! infers it from row shape: net snapshots upsert on the position key,
//! intraday trades append-only.

use super::ingest_model::{net_position_key_columns, CommitPlan, ValidatedBatch};

pub fn plan_commit(batch: ValidatedBatch) -> CommitPlan {
    match batch {
        ValidatedBatch::Net(rows) => CommitPlan::Upsert {
            key_columns: net_position_key_columns(),
            rows,
        },
        ValidatedBatch::Intraday(rows) => CommitPlan::Append { rows },
    }
}
