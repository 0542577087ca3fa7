//! Row normalization: typed rows into canonical rows.
//!
//! Pure transform, same cardinality as the input. Identifier columns are
//! upper-cased and trimmed, broker symbol aliases are resolved, and scalars
//! are parsed into locale-agnostic values. Null policy: for intraday rows a
//! nullable column keeps an explicit `None`; for net rows a null in a
//! column not declared optional is an error.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use super::contract::{ColumnContract, ColumnSpec, ColumnType};
use super::ingest_constants::{
    is_null_marker, ALLOWED_EXCHANGES, ALLOWED_INSTRUMENTS, BROKER_DATE_FORMAT, BSE_FUT_ALIASES,
    BSE_OPT_ALIASES, BSE_SYMBOL_ALIASES, EQ_ALIASES, EQ_SHEET, UPPERCASE_FIELDS,
};
use super::ingest_errors::NormalizationError;
use super::ingest_model::{BatchKind, CanonicalBatch, CanonicalRow, CanonicalValue, TypedBatch, TypedRow};
use crate::errors::Result;

/// Maps every typed row to a canonical row, or fails on the first
/// unparseable or unrecognized value.
pub fn normalize_batch(batch: &TypedBatch, contract: &ColumnContract) -> Result<CanonicalBatch> {
    let mut rows = Vec::with_capacity(batch.rows.len());
    for typed in &batch.rows {
        rows.push(normalize_row(typed, contract, batch.kind)?);
    }
    Ok(CanonicalBatch {
        kind: batch.kind,
        rows,
    })
}

fn normalize_row(
    typed: &TypedRow,
    contract: &ColumnContract,
    kind: BatchKind,
) -> Result<CanonicalRow> {
    let mut values: HashMap<String, Option<CanonicalValue>> = HashMap::new();

    for spec in &contract.columns {
        let raw = typed.get(&spec.field).unwrap_or("");
        if is_null_marker(raw) {
            if kind == BatchKind::Net && !spec.nullable {
                return Err(NormalizationError::UnexpectedNull {
                    row: typed.row,
                    column: spec.name.clone(),
                }
                .into());
            }
            values.insert(spec.field.clone(), None);
            continue;
        }
        values.insert(spec.field.clone(), Some(parse_value(raw, spec, typed.row)?));
    }

    let mut row = CanonicalRow {
        row: typed.row,
        values,
    };
    canonicalize_aliases(&mut row, kind)?;
    Ok(row)
}

fn parse_value(raw: &str, spec: &ColumnSpec, row: usize) -> Result<CanonicalValue> {
    match spec.dtype {
        ColumnType::Text => {
            let text = if UPPERCASE_FIELDS.contains(&spec.field.as_str()) {
                raw.to_uppercase()
            } else {
                raw.to_string()
            };
            Ok(CanonicalValue::Text(text))
        }
        ColumnType::Integer => {
            // Brokers export integers as "100" or "100.0"; both are fine,
            // "100.5" is not.
            let parsed = Decimal::from_str(raw)
                .ok()
                .filter(Decimal::is_integer)
                .and_then(|d| d.to_i64());
            match parsed {
                Some(i) => Ok(CanonicalValue::Integer(i)),
                None => Err(NormalizationError::InvalidNumber {
                    row,
                    column: spec.name.clone(),
                    value: raw.to_string(),
                }
                .into()),
            }
        }
        ColumnType::Decimal => Decimal::from_str(raw)
            .map(CanonicalValue::Decimal)
            .map_err(|_| {
                NormalizationError::InvalidNumber {
                    row,
                    column: spec.name.clone(),
                    value: raw.to_string(),
                }
                .into()
            }),
        ColumnType::Date => NaiveDate::parse_from_str(&raw.to_uppercase(), BROKER_DATE_FORMAT)
            .map(CanonicalValue::Date)
            .map_err(|_| {
                NormalizationError::InvalidDate {
                    row,
                    column: spec.name.clone(),
                    value: raw.to_string(),
                }
                .into()
            }),
    }
}

fn set_text(row: &mut CanonicalRow, field: &str, value: &str) {
    row.values
        .insert(field.to_string(), Some(CanonicalValue::Text(value.to_string())));
}

fn set_null(row: &mut CanonicalRow, field: &str) {
    row.values.insert(field.to_string(), None);
}

/// Symbol/instrument alias resolution and sanity checks.
///
/// BSE index symbols (BSX/BSE/BSXOPT -> SENSEX, BKX/BKXOPT -> BANKEX) pull
/// their instrument spelling along to OPTIDX/FUTIDX; equity aliases fold to
/// EQ with derivative fields cleared.
fn canonicalize_aliases(row: &mut CanonicalRow, kind: BatchKind) -> Result<()> {
    if let Some(exchange) = row.text("exchange").map(str::to_string) {
        if !ALLOWED_EXCHANGES.contains(&exchange.as_str()) {
            return Err(NormalizationError::UnknownExchange {
                row: row.row,
                value: exchange,
            }
            .into());
        }

        if exchange == "BSE" {
            resolve_bse_index_aliases(row, kind)?;
        }
    }

    if let Some(instrument) = row.text("instrument_type").map(str::to_string) {
        if EQ_ALIASES.contains(&instrument.as_str()) {
            set_text(row, "instrument_type", "EQ");
            set_null(row, "expiry");
            set_null(row, "strike");
            set_null(row, "opt_type");
            if kind == BatchKind::Net {
                set_text(row, "sheet", EQ_SHEET);
            }
        }
    }

    if let Some(instrument) = row.text("instrument_type").map(str::to_string) {
        if !ALLOWED_INSTRUMENTS.contains(&instrument.as_str()) {
            return Err(NormalizationError::UnknownInstrument {
                row: row.row,
                value: instrument,
            }
            .into());
        }
    }

    Ok(())
}

fn resolve_bse_index_aliases(row: &mut CanonicalRow, kind: BatchKind) -> Result<()> {
    let symbol = match row.text("symbol").map(str::to_string) {
        Some(s) => s,
        None => return Ok(()),
    };
    let canonical = BSE_SYMBOL_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.contains(&symbol.as_str()))
        .map(|(canonical, _)| *canonical);
    let canonical = match canonical {
        Some(c) => c,
        None => return Ok(()),
    };

    set_text(row, "symbol", canonical);

    if let Some(instrument) = row.text("instrument_type").map(str::to_string) {
        if BSE_OPT_ALIASES.contains(&instrument.as_str()) {
            set_text(row, "instrument_type", "OPTIDX");
        } else if BSE_FUT_ALIASES.contains(&instrument.as_str()) {
            set_text(row, "instrument_type", "FUTIDX");
        } else if kind == BatchKind::Net {
            return Err(NormalizationError::InvalidBseIndexInstrument {
                row: row.row,
                value: instrument,
            }
            .into());
        }
    }

    Ok(())
}
