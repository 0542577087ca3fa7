//! Domain models for the ingestion pipeline.
//!
//! A batch moves through four representations: `RawBatch` (strings from the
//! CSV reader) -> `TypedBatch` (keyed by canonical field name) ->
//! `CanonicalBatch` (parsed scalar values) -> `ValidatedBatch` (typed domain
//! rows), and finally becomes a `CommitPlan`. All of them are ephemeral;
//! nothing survives the run except what the store commits.

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ingest_constants::NET_POSITION_KEY_COLUMNS;

/// The two data kinds sharing the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKind {
    /// End-of-day / day-zero net position snapshots (idempotent upsert).
    Net,
    /// Intraday trade executions (append-only ledger).
    Intraday,
}

impl BatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchKind::Net => "net",
            BatchKind::Intraday => "intraday",
        }
    }
}

impl fmt::Display for BatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One data row after schema validation, keyed by canonical field name.
/// Values are still raw trimmed strings; nulls are not interpreted yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedRow {
    /// 1-based data row in the source file (header excluded).
    pub row: usize,
    pub values: HashMap<String, String>,
}

impl TypedRow {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }
}

/// The full batch after schema validation.
#[derive(Debug, Clone)]
pub struct TypedBatch {
    pub kind: BatchKind,
    pub rows: Vec<TypedRow>,
}

/// A parsed scalar value produced by the row normalizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CanonicalValue {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Date(NaiveDate),
}

impl CanonicalValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CanonicalValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CanonicalValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            CanonicalValue::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CanonicalValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// One canonical row. `None` is an explicit null that survived
/// normalization under the kind's nullability contract.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    /// 1-based data row in the source file.
    pub row: usize,
    pub values: HashMap<String, Option<CanonicalValue>>,
}

impl CanonicalRow {
    /// Returns the non-null value for a field, if any.
    pub fn get(&self, field: &str) -> Option<&CanonicalValue> {
        self.values.get(field).and_then(Option::as_ref)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(CanonicalValue::as_text)
    }

    pub fn integer(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(CanonicalValue::as_integer)
    }

    pub fn decimal(&self, field: &str) -> Option<Decimal> {
        self.get(field).and_then(CanonicalValue::as_decimal)
    }

    pub fn date(&self, field: &str) -> Option<NaiveDate> {
        self.get(field).and_then(CanonicalValue::as_date)
    }
}

/// The full batch after normalization; same cardinality as the input.
#[derive(Debug, Clone)]
pub struct CanonicalBatch {
    pub kind: BatchKind,
    pub rows: Vec<CanonicalRow>,
}

/// One canonical net position snapshot row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetPositionRow {
    pub broker_id: String,
    pub sheet: String,
    pub strategy: String,
    pub exchange: String,
    pub instrument_type: String,
    pub symbol: String,
    pub expiry: Option<NaiveDate>,
    pub strike: Option<Decimal>,
    pub opt_type: Option<String>,
    pub net_qty: i64,
    pub avg_price: Decimal,
    pub carry_date: NaiveDate,
    /// 1-based data row in the source file, for error reporting.
    #[serde(default)]
    pub source_row: usize,
}

impl NetPositionRow {
    pub fn key(&self) -> PositionKey {
        PositionKey {
            broker_id: self.broker_id.clone(),
            sheet: self.sheet.clone(),
            strategy: self.strategy.clone(),
            exchange: self.exchange.clone(),
            instrument_type: self.instrument_type.clone(),
            symbol: self.symbol.clone(),
            expiry: self.expiry,
            strike: self.strike,
            opt_type: self.opt_type.clone(),
            carry_date: self.carry_date,
        }
    }
}

/// One canonical intraday execution row. Buy/sell quantities and rates are
/// raw broker fields and intentionally nullable; an explicit null is
/// preserved all the way to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntradayTradeRow {
    pub execution_id: String,
    pub broker_id: String,
    pub sheet: String,
    pub strategy: String,
    pub exchange: String,
    pub instrument_type: String,
    pub symbol: String,
    pub expiry: Option<NaiveDate>,
    pub strike: Option<Decimal>,
    pub opt_type: Option<String>,
    pub buy_qty: Option<i64>,
    pub buy_rate: Option<Decimal>,
    pub sell_qty: Option<i64>,
    pub sell_rate: Option<Decimal>,
    pub net_qty: i64,
    pub trade_date: NaiveDate,
    /// 1-based data row in the source file, for error reporting.
    #[serde(default)]
    pub source_row: usize,
}

/// The composite business key identifying one net position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PositionKey {
    pub broker_id: String,
    pub sheet: String,
    pub strategy: String,
    pub exchange: String,
    pub instrument_type: String,
    pub symbol: String,
    pub expiry: Option<NaiveDate>,
    pub strike: Option<Decimal>,
    pub opt_type: Option<String>,
    pub carry_date: NaiveDate,
}

impl PositionKey {
    /// Deterministic store id for this key. Absent optional components
    /// fold into empty segments so that two rows with the same key always
    /// map to the same id, regardless of how the store treats NULLs.
    /// Segments are escaped before joining so a delimiter inside an
    /// identifier cannot make two distinct keys share an id.
    pub fn storage_id(&self) -> String {
        let expiry = self
            .expiry
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let strike = self
            .strike
            .map(|s| s.normalize().to_string())
            .unwrap_or_default();
        let carry_date = self.carry_date.format("%Y-%m-%d").to_string();
        let segments = [
            self.broker_id.as_str(),
            self.sheet.as_str(),
            self.strategy.as_str(),
            self.exchange.as_str(),
            self.instrument_type.as_str(),
            self.symbol.as_str(),
            expiry.as_str(),
            strike.as_str(),
            self.opt_type.as_deref().unwrap_or(""),
            carry_date.as_str(),
        ];
        segments
            .iter()
            .map(|s| escape_id_segment(s))
            .collect::<Vec<_>>()
            .join("|")
    }
}

fn escape_id_segment(segment: &str) -> String {
    segment.replace('\\', "\\\\").replace('|', "\\|")
}

impl fmt::Display for PositionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {}, {}, {}, {}, {}, {}, {})",
            self.broker_id,
            self.sheet,
            self.strategy,
            self.exchange,
            self.instrument_type,
            self.symbol,
            self.expiry
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.strike
                .map(|s| s.normalize().to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.opt_type.as_deref().unwrap_or("-"),
            self.carry_date.format("%Y-%m-%d"),
        )
    }
}

/// A fully-validated batch, ready for commit planning.
#[derive(Debug, Clone)]
pub enum ValidatedBatch {
    Net(Vec<NetPositionRow>),
    Intraday(Vec<IntradayTradeRow>),
}

impl ValidatedBatch {
    pub fn kind(&self) -> BatchKind {
        match self {
            ValidatedBatch::Net(_) => BatchKind::Net,
            ValidatedBatch::Intraday(_) => BatchKind::Intraday,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ValidatedBatch::Net(rows) => rows.len(),
            ValidatedBatch::Intraday(rows) => rows.len(),
        }
    }
}

/// The write plan produced by the commit planner. The planner is the single
/// place that decides the variant; the writer only executes it.
#[derive(Debug, Clone)]
pub enum CommitPlan {
    /// Insert-or-replace keyed by the composite business key.
    Upsert {
        key_columns: &'static [&'static str],
        rows: Vec<NetPositionRow>,
    },
    /// Pure inserts; key collisions are a store-level error, never a
    /// silent merge.
    Append { rows: Vec<IntradayTradeRow> },
}

impl CommitPlan {
    pub fn kind(&self) -> BatchKind {
        match self {
            CommitPlan::Upsert { .. } => BatchKind::Net,
            CommitPlan::Append { .. } => BatchKind::Intraday,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            CommitPlan::Upsert { rows, .. } => rows.len(),
            CommitPlan::Append { rows } => rows.len(),
        }
    }
}

/// Outcome of a committed plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReceipt {
    pub kind: BatchKind,
    pub rows_written: usize,
}

/// The key columns the upsert plan targets.
pub fn net_position_key_columns() -> &'static [&'static str] {
    NET_POSITION_KEY_COLUMNS
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_key(strike: Option<Decimal>) -> PositionKey {
        PositionKey {
            broker_id: "BRK1".to_string(),
            sheet: "FNO".to_string(),
            strategy: "ALPHA".to_string(),
            exchange: "NSE".to_string(),
            instrument_type: "OPTSTK".to_string(),
            symbol: "RELIANCE".to_string(),
            expiry: NaiveDate::from_ymd_opt(2024, 1, 25),
            strike,
            opt_type: Some("CE".to_string()),
            carry_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        }
    }

    #[test]
    fn storage_id_is_deterministic() {
        let a = sample_key(Some(dec!(2500))).storage_id();
        let b = sample_key(Some(dec!(2500))).storage_id();
        assert_eq!(a, b);
    }

    #[test]
    fn storage_id_normalizes_strike_scale() {
        // 2500.0 and 2500 are the same strike and must map to the same id
        let a = sample_key(Some(dec!(2500.0))).storage_id();
        let b = sample_key(Some(dec!(2500))).storage_id();
        assert_eq!(a, b);
    }

    #[test]
    fn storage_id_keeps_delimiter_bearing_segments_apart() {
        // a '|' inside one identifier must not shift content into the
        // neighboring segment
        let mut a = sample_key(None);
        a.broker_id = "A|B".to_string();
        a.sheet = "C".to_string();
        let mut b = sample_key(None);
        b.broker_id = "A".to_string();
        b.sheet = "B|C".to_string();
        assert_ne!(a.storage_id(), b.storage_id());

        // nor may the escape character itself be forgeable
        let mut c = sample_key(None);
        c.broker_id = "A\\".to_string();
        c.sheet = "B".to_string();
        let mut d = sample_key(None);
        d.broker_id = "A\\|B".to_string();
        d.sheet = String::new();
        assert_ne!(c.storage_id(), d.storage_id());
    }

    #[test]
    fn storage_id_distinguishes_absent_strike() {
        let with = sample_key(Some(dec!(2500))).storage_id();
        let without = sample_key(None).storage_id();
        assert_ne!(with, without);
    }

    #[test]
    fn batch_kind_round_trips_through_serde() {
        let json = serde_json::to_string(&BatchKind::Intraday).unwrap();
        assert_eq!(json, "\"intraday\"");
        let kind: BatchKind = serde_json::from_str(&json).unwrap();
        assert_eq!(kind, BatchKind::Intraday);
    }
}
