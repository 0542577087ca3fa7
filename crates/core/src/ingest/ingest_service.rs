//! End-to-end ingestion: read, validate, normalize, plan, commit.
//!
//! The service is fail-fast. The first stage to reject the batch stops
//! the run, and nothing reaches the store until every stage has passed.

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use super::contract::IngestContracts;
use super::csv_reader::read_csv_file;
use super::ingest_model::{BatchKind, CommitPlan, CommitReceipt};
use super::ingest_traits::{IngestServiceTrait, IngestStoreTrait};
use super::normalizer::normalize_batch;
use super::planner::plan_commit;
use super::rules::validate_batch;
use super::schema_validator::validate_schema;
use crate::errors::Result;

pub struct IngestService {
    store: Arc<dyn IngestStoreTrait>,
    contracts: IngestContracts,
}

impl IngestService {
    pub fn new(store: Arc<dyn IngestStoreTrait>) -> Self {
        Self {
            store,
            contracts: IngestContracts::default(),
        }
    }

    /// Builds a service with non-default column contracts, e.g. loaded
    /// from a contracts file.
    pub fn with_contracts(store: Arc<dyn IngestStoreTrait>, contracts: IngestContracts) -> Self {
        Self { store, contracts }
    }

    fn run(&self, kind: BatchKind, path: &Path) -> Result<CommitReceipt> {
        let contract = self.contracts.for_kind(kind);

        info!("Loading {} batch from {}", kind, path.display());
        let raw = read_csv_file(path)?;
        debug!("Read {} data row(s)", raw.rows.len());

        let typed = validate_schema(&raw, contract)?;
        let canonical = normalize_batch(&typed, contract)?;
        let validated = validate_batch(canonical, contract)?;
        debug!("Validated {} row(s)", validated.row_count());

        let plan = plan_commit(validated);
        let receipt = execute_plan(self.store.as_ref(), &plan)?;
        info!("Committed {} {} row(s)", receipt.rows_written, receipt.kind);
        Ok(receipt)
    }
}

impl IngestServiceTrait for IngestService {
    fn load_net_snapshot(&self, path: &Path) -> Result<CommitReceipt> {
        self.run(BatchKind::Net, path)
    }

    fn load_intraday_trades(&self, path: &Path) -> Result<CommitReceipt> {
        self.run(BatchKind::Intraday, path)
    }
}

/// Hands the plan to the store in a single all-or-nothing write.
pub fn execute_plan(store: &dyn IngestStoreTrait, plan: &CommitPlan) -> Result<CommitReceipt> {
    let rows_written = match plan {
        CommitPlan::Upsert { key_columns, rows } => store.upsert_net_positions(key_columns, rows)?,
        CommitPlan::Append { rows } => store.append_intraday_trades(rows)?,
    };
    Ok(CommitReceipt {
        kind: plan.kind(),
        rows_written,
    })
}
