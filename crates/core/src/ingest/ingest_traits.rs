use std::path::Path;

use super::ingest_model::{CommitReceipt, IntradayTradeRow, NetPositionRow};
use crate::errors::Result;

/// Trait for the persistent store behind the ingestion pipeline.
///
/// Each method must apply the whole slice inside one transaction: on
/// any failure the store is left exactly as it was before the call.
pub trait IngestStoreTrait: Send + Sync {
    /// Inserts or replaces net position rows, matching on the position
    /// key columns. Returns the number of rows written.
    fn upsert_net_positions(
        &self,
        key_columns: &[&str],
        positions: &[NetPositionRow],
    ) -> Result<usize>;

    /// Appends intraday trade rows. The store enforces uniqueness of
    /// (execution id, trade date) across batches and must reject the
    /// whole slice on a collision.
    fn append_intraday_trades(&self, trades: &[IntradayTradeRow]) -> Result<usize>;
}

/// Trait for the ingestion service.
pub trait IngestServiceTrait: Send + Sync {
    /// Runs a net position snapshot file through the full pipeline and
    /// commits it.
    fn load_net_snapshot(&self, path: &Path) -> Result<CommitReceipt>;

    /// Runs an intraday trade file through the full pipeline and
    /// commits it.
    fn load_intraday_trades(&self, path: &Path) -> Result<CommitReceipt>;
}
