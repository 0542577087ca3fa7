//! Column contracts: the per-kind required-column configuration.
//!
//! The exact column sets are configuration, not core logic. The defaults
//! mirror the broker file layouts; callers may deserialize overrides from
//! JSON and hand them to the service.

use serde::{Deserialize, Serialize};

use super::ingest_model::BatchKind;

/// Declared type of a contract column, driving normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Text,
    Integer,
    Decimal,
    Date,
}

/// One required column of a kind's contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSpec {
    /// Exact header spelling expected in the CSV.
    pub name: String,
    /// Canonical field name the pipeline works with.
    pub field: String,
    pub dtype: ColumnType,
    /// Whether an explicit null marker is permitted in this column.
    #[serde(default)]
    pub nullable: bool,
}

impl ColumnSpec {
    fn new(name: &str, field: &str, dtype: ColumnType, nullable: bool) -> Self {
        Self {
            name: name.to_string(),
            field: field.to_string(),
            dtype,
            nullable,
        }
    }
}

/// The full column contract for one data kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnContract {
    pub kind: BatchKind,
    pub columns: Vec<ColumnSpec>,
}

impl ColumnContract {
    /// Default contract for net position snapshot files.
    pub fn net_default() -> Self {
        use ColumnType::*;
        Self {
            kind: BatchKind::Net,
            columns: vec![
                ColumnSpec::new("Broker_Id", "broker_id", Text, false),
                ColumnSpec::new("Sheet", "sheet", Text, false),
                ColumnSpec::new("Strategy", "strategy", Text, false),
                ColumnSpec::new("Exchange", "exchange", Text, false),
                ColumnSpec::new("Instrument", "instrument_type", Text, false),
                ColumnSpec::new("Symbol", "symbol", Text, false),
                ColumnSpec::new("Expiry", "expiry", Date, true),
                ColumnSpec::new("Strike", "strike", Decimal, true),
                ColumnSpec::new("Opt_Type", "opt_type", Text, true),
                ColumnSpec::new("Net_Qty", "net_qty", Integer, false),
                ColumnSpec::new("Avg_Price", "avg_price", Decimal, false),
                ColumnSpec::new("Carry_Date", "carry_date", Date, false),
            ],
        }
    }

    /// Default contract for intraday execution files.
    pub fn intraday_default() -> Self {
        use ColumnType::*;
        Self {
            kind: BatchKind::Intraday,
            columns: vec![
                ColumnSpec::new("Execution_Id", "execution_id", Text, false),
                ColumnSpec::new("Broker_Id", "broker_id", Text, false),
                ColumnSpec::new("Sheet", "sheet", Text, false),
                ColumnSpec::new("Strategy", "strategy", Text, false),
                ColumnSpec::new("Exchange", "exchange", Text, false),
                ColumnSpec::new("Instrument", "instrument_type", Text, false),
                ColumnSpec::new("Symbol", "symbol", Text, false),
                ColumnSpec::new("Expiry", "expiry", Date, true),
                ColumnSpec::new("Strike", "strike", Decimal, true),
                ColumnSpec::new("Opt_Type", "opt_type", Text, true),
                ColumnSpec::new("Buy_Qty", "buy_qty", Integer, true),
                ColumnSpec::new("Buy_Rate", "buy_rate", Decimal, true),
                ColumnSpec::new("Sell_Qty", "sell_qty", Integer, true),
                ColumnSpec::new("Sell_Rate", "sell_rate", Decimal, true),
                ColumnSpec::new("Net_Qty", "net_qty", Integer, false),
                ColumnSpec::new("Trade_Date", "trade_date", Date, false),
            ],
        }
    }

    /// Looks up a column spec by its canonical field name.
    pub fn spec_for_field(&self, field: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.field == field)
    }

    /// Looks up a column spec by its CSV header name.
    pub fn spec_for_name(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// CSV header name for a canonical field, falling back to the field
    /// name itself. Used when reporting violations against the source file.
    pub fn name_for_field<'a>(&'a self, field: &'a str) -> &'a str {
        self.spec_for_field(field)
            .map(|c| c.name.as_str())
            .unwrap_or(field)
    }
}

/// The pair of contracts the service runs with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestContracts {
    pub net: ColumnContract,
    pub intraday: ColumnContract,
}

impl IngestContracts {
    pub fn for_kind(&self, kind: BatchKind) -> &ColumnContract {
        match kind {
            BatchKind::Net => &self.net,
            BatchKind::Intraday => &self.intraday,
        }
    }
}

impl Default for IngestContracts {
    fn default() -> Self {
        Self {
            net: ColumnContract::net_default(),
            intraday: ColumnContract::intraday_default(),
        }
    }
}
