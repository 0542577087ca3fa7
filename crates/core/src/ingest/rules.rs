//! Business rule validation over the canonical batch as a whole.
//!
//! Two outcomes only: a fully-validated batch, or a single failure. All
//! non-duplicate violations aggregate into one `ValidationError` so the
//! operator sees the full defect list per run; a batch-internal key
//! collision is a hard `DuplicateKeyError` on its own.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::contract::ColumnContract;
use super::ingest_constants::MAX_PRICE_DECIMALS;
use super::ingest_errors::{DuplicateKeyError, RuleViolation, ValidationError};
use super::ingest_model::{
    CanonicalBatch, CanonicalRow, IntradayTradeRow, NetPositionRow, PositionKey, ValidatedBatch,
};
use crate::errors::Result;
use crate::ingest::BatchKind;

/// Validates the canonical batch and produces typed domain rows.
pub fn validate_batch(batch: CanonicalBatch, contract: &ColumnContract) -> Result<ValidatedBatch> {
    match batch.kind {
        BatchKind::Net => validate_net(&batch.rows, contract),
        BatchKind::Intraday => validate_intraday(&batch.rows, contract),
    }
}

fn validate_net(rows: &[CanonicalRow], contract: &ColumnContract) -> Result<ValidatedBatch> {
    let mut violations = Vec::new();
    let mut built = Vec::with_capacity(rows.len());

    for row in rows {
        if let Some(position) = build_net_row(row, contract, &mut violations) {
            check_net_row(&position, contract, &mut violations);
            built.push(position);
        }
    }

    check_single_valued_date(
        built.iter().map(|r| (r.source_row, r.carry_date)),
        contract.name_for_field("carry_date"),
        &mut violations,
    );

    if !violations.is_empty() {
        return Err(ValidationError::new(violations).into());
    }

    let mut seen: HashMap<PositionKey, usize> = HashMap::new();
    for position in &built {
        if let Some(&first_row) = seen.get(&position.key()) {
            return Err(DuplicateKeyError::PositionKey {
                key: position.key().to_string(),
                first_row,
                second_row: position.source_row,
            }
            .into());
        }
        seen.insert(position.key(), position.source_row);
    }

    Ok(ValidatedBatch::Net(built))
}

fn validate_intraday(rows: &[CanonicalRow], contract: &ColumnContract) -> Result<ValidatedBatch> {
    let mut violations = Vec::new();
    let mut built = Vec::with_capacity(rows.len());

    for row in rows {
        if let Some(trade) = build_intraday_row(row, contract, &mut violations) {
            check_intraday_row(&trade, contract, &mut violations);
            built.push(trade);
        }
    }

    check_single_valued_date(
        built.iter().map(|r| (r.source_row, r.trade_date)),
        contract.name_for_field("trade_date"),
        &mut violations,
    );

    if !violations.is_empty() {
        return Err(ValidationError::new(violations).into());
    }

    let mut seen: HashMap<&str, usize> = HashMap::new();
    for trade in &built {
        if let Some(&first_row) = seen.get(trade.execution_id.as_str()) {
            return Err(DuplicateKeyError::ExecutionId {
                execution_id: trade.execution_id.clone(),
                first_row,
                second_row: trade.source_row,
            }
            .into());
        }
        seen.insert(&trade.execution_id, trade.source_row);
    }

    Ok(ValidatedBatch::Intraday(built))
}

// --- row builders -------------------------------------------------------

fn missing(row: usize, column: &str, out: &mut Vec<RuleViolation>) {
    out.push(RuleViolation {
        row,
        column: Some(column.to_string()),
        message: "required value is missing".to_string(),
    });
}

fn require_text(
    row: &CanonicalRow,
    field: &str,
    contract: &ColumnContract,
    out: &mut Vec<RuleViolation>,
) -> Option<String> {
    match row.text(field) {
        Some(value) => Some(value.to_string()),
        None => {
            missing(row.row, contract.name_for_field(field), out);
            None
        }
    }
}

fn require_integer(
    row: &CanonicalRow,
    field: &str,
    contract: &ColumnContract,
    out: &mut Vec<RuleViolation>,
) -> Option<i64> {
    match row.integer(field) {
        Some(value) => Some(value),
        None => {
            missing(row.row, contract.name_for_field(field), out);
            None
        }
    }
}

fn require_decimal(
    row: &CanonicalRow,
    field: &str,
    contract: &ColumnContract,
    out: &mut Vec<RuleViolation>,
) -> Option<Decimal> {
    match row.decimal(field) {
        Some(value) => Some(value),
        None => {
            missing(row.row, contract.name_for_field(field), out);
            None
        }
    }
}

fn require_date(
    row: &CanonicalRow,
    field: &str,
    contract: &ColumnContract,
    out: &mut Vec<RuleViolation>,
) -> Option<chrono::NaiveDate> {
    match row.date(field) {
        Some(value) => Some(value),
        None => {
            missing(row.row, contract.name_for_field(field), out);
            None
        }
    }
}

fn build_net_row(
    row: &CanonicalRow,
    contract: &ColumnContract,
    out: &mut Vec<RuleViolation>,
) -> Option<NetPositionRow> {
    let broker_id = require_text(row, "broker_id", contract, out);
    let sheet = require_text(row, "sheet", contract, out);
    let strategy = require_text(row, "strategy", contract, out);
    let exchange = require_text(row, "exchange", contract, out);
    let instrument_type = require_text(row, "instrument_type", contract, out);
    let symbol = require_text(row, "symbol", contract, out);
    let net_qty = require_integer(row, "net_qty", contract, out);
    let avg_price = require_decimal(row, "avg_price", contract, out);
    let carry_date = require_date(row, "carry_date", contract, out);

    Some(NetPositionRow {
        broker_id: broker_id?,
        sheet: sheet?,
        strategy: strategy?,
        exchange: exchange?,
        instrument_type: instrument_type?,
        symbol: symbol?,
        expiry: row.date("expiry"),
        strike: row.decimal("strike"),
        opt_type: row.text("opt_type").map(str::to_string),
        net_qty: net_qty?,
        avg_price: avg_price?,
        carry_date: carry_date?,
        source_row: row.row,
    })
}

fn build_intraday_row(
    row: &CanonicalRow,
    contract: &ColumnContract,
    out: &mut Vec<RuleViolation>,
) -> Option<IntradayTradeRow> {
    let execution_id = require_text(row, "execution_id", contract, out);
    let broker_id = require_text(row, "broker_id", contract, out);
    let sheet = require_text(row, "sheet", contract, out);
    let strategy = require_text(row, "strategy", contract, out);
    let exchange = require_text(row, "exchange", contract, out);
    let instrument_type = require_text(row, "instrument_type", contract, out);
    let symbol = require_text(row, "symbol", contract, out);
    let net_qty = require_integer(row, "net_qty", contract, out);
    let trade_date = require_date(row, "trade_date", contract, out);

    Some(IntradayTradeRow {
        execution_id: execution_id?,
        broker_id: broker_id?,
        sheet: sheet?,
        strategy: strategy?,
        exchange: exchange?,
        instrument_type: instrument_type?,
        symbol: symbol?,
        expiry: row.date("expiry"),
        strike: row.decimal("strike"),
        opt_type: row.text("opt_type").map(str::to_string),
        buy_qty: row.integer("buy_qty"),
        buy_rate: row.decimal("buy_rate"),
        sell_qty: row.integer("sell_qty"),
        sell_rate: row.decimal("sell_rate"),
        net_qty: net_qty?,
        trade_date: trade_date?,
        source_row: row.row,
    })
}

// --- per-row invariants -------------------------------------------------

fn exceeds_scale(value: Decimal) -> bool {
    value.round_dp(MAX_PRICE_DECIMALS) != value
}

fn check_instrument_shape(
    row: usize,
    instrument_type: &str,
    expiry: Option<chrono::NaiveDate>,
    strike: Option<Decimal>,
    opt_type: Option<&str>,
    out: &mut Vec<RuleViolation>,
) {
    if instrument_type == "EQ" {
        if expiry.is_some() || strike.is_some() || opt_type.is_some() {
            out.push(RuleViolation {
                row,
                column: None,
                message: "EQ must not carry expiry, strike, or opt_type".to_string(),
            });
        }
    } else if instrument_type.starts_with("FUT") {
        if expiry.is_none() {
            out.push(RuleViolation {
                row,
                column: Some("Expiry".to_string()),
                message: "futures require an expiry".to_string(),
            });
        }
    } else if instrument_type.starts_with("OPT")
        && (expiry.is_none() || strike.is_none() || opt_type.is_none())
    {
        out.push(RuleViolation {
            row,
            column: None,
            message: "options require expiry, strike, and opt_type".to_string(),
        });
    }
}

fn check_net_row(
    position: &NetPositionRow,
    contract: &ColumnContract,
    out: &mut Vec<RuleViolation>,
) {
    check_instrument_shape(
        position.source_row,
        &position.instrument_type,
        position.expiry,
        position.strike,
        position.opt_type.as_deref(),
        out,
    );

    if position.avg_price.is_sign_negative() {
        out.push(RuleViolation {
            row: position.source_row,
            column: Some(contract.name_for_field("avg_price").to_string()),
            message: "must be non-negative".to_string(),
        });
    } else if exceeds_scale(position.avg_price) {
        out.push(RuleViolation {
            row: position.source_row,
            column: Some(contract.name_for_field("avg_price").to_string()),
            message: format!("more than {} decimal places", MAX_PRICE_DECIMALS),
        });
    }

    if let Some(strike) = position.strike {
        if strike.is_sign_negative() || exceeds_scale(strike) {
            out.push(RuleViolation {
                row: position.source_row,
                column: Some(contract.name_for_field("strike").to_string()),
                message: format!(
                    "must be non-negative with at most {} decimal places",
                    MAX_PRICE_DECIMALS
                ),
            });
        }
    }
}

fn check_intraday_row(
    trade: &IntradayTradeRow,
    contract: &ColumnContract,
    out: &mut Vec<RuleViolation>,
) {
    check_instrument_shape(
        trade.source_row,
        &trade.instrument_type,
        trade.expiry,
        trade.strike,
        trade.opt_type.as_deref(),
        out,
    );

    let buy = trade.buy_qty.unwrap_or(0);
    let sell = trade.sell_qty.unwrap_or(0);

    if buy == 0 && sell == 0 {
        out.push(RuleViolation {
            row: trade.source_row,
            column: None,
            message: format!(
                "{} and {} are both zero",
                contract.name_for_field("buy_qty"),
                contract.name_for_field("sell_qty")
            ),
        });
    }

    if trade.net_qty != buy - sell {
        out.push(RuleViolation {
            row: trade.source_row,
            column: Some(contract.name_for_field("net_qty").to_string()),
            message: format!(
                "must equal {} - {}",
                contract.name_for_field("buy_qty"),
                contract.name_for_field("sell_qty")
            ),
        });
    }

    for (field, rate) in [("buy_rate", trade.buy_rate), ("sell_rate", trade.sell_rate)] {
        if let Some(rate) = rate {
            if rate.is_sign_negative() {
                out.push(RuleViolation {
                    row: trade.source_row,
                    column: Some(contract.name_for_field(field).to_string()),
                    message: "must be non-negative".to_string(),
                });
            }
        }
    }
}

fn check_single_valued_date<I>(dates: I, column: &str, out: &mut Vec<RuleViolation>)
where
    I: IntoIterator<Item = (usize, chrono::NaiveDate)>,
{
    let mut first: Option<chrono::NaiveDate> = None;
    for (row, date) in dates {
        match first {
            None => first = Some(date),
            Some(expected) if date != expected => {
                out.push(RuleViolation {
                    row,
                    column: Some(column.to_string()),
                    message: format!(
                        "must be single-valued for the file (expected {})",
                        expected.format("%d-%b-%Y")
                    ),
                });
            }
            Some(_) => {}
        }
    }
}
