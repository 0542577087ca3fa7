//! Schema validation: the raw batch against the kind's column contract.
//!
//! Required columns must be present and exactly spelled; unknown columns
//! are rejected rather than silently passed through; column ordering is
//! irrelevant. The validator yields the full typed batch or nothing.

use std::collections::{HashMap, HashSet};

use super::contract::ColumnContract;
use super::csv_reader::RawBatch;
use super::ingest_errors::SchemaError;
use super::ingest_model::{TypedBatch, TypedRow};
use crate::errors::Result;

/// Validates the raw batch's structure and keys every row by canonical
/// field name.
pub fn validate_schema(raw: &RawBatch, contract: &ColumnContract) -> Result<TypedBatch> {
    let mut seen: HashSet<&str> = HashSet::new();
    for header in &raw.headers {
        if !seen.insert(header.as_str()) {
            return Err(SchemaError::DuplicateColumn(header.clone()).into());
        }
    }

    let required: HashSet<&str> = contract.columns.iter().map(|c| c.name.as_str()).collect();
    let present: HashSet<&str> = raw.headers.iter().map(String::as_str).collect();

    let mut missing: Vec<String> = required
        .difference(&present)
        .map(|s| s.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(SchemaError::MissingColumns(missing).into());
    }

    let mut unknown: Vec<String> = present
        .difference(&required)
        .map(|s| s.to_string())
        .collect();
    if !unknown.is_empty() {
        unknown.sort();
        return Err(SchemaError::UnknownColumns(unknown).into());
    }

    if raw.rows.is_empty() {
        return Err(SchemaError::EmptyBatch.into());
    }

    // Header order is the file's own; map each position to its field name.
    let fields: Vec<&str> = raw
        .headers
        .iter()
        .filter_map(|h| contract.spec_for_name(h).map(|c| c.field.as_str()))
        .collect();

    let rows = raw
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let values: HashMap<String, String> = fields
                .iter()
                .zip(row.iter())
                .map(|(field, value)| (field.to_string(), value.clone()))
                .collect();
            TypedRow {
                row: idx + 1,
                values,
            }
        })
        .collect();

    Ok(TypedBatch {
        kind: contract.kind,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::ingest::csv_reader::parse_csv;
    use crate::ingest::BatchKind;

    fn net_raw(content: &[u8]) -> RawBatch {
        parse_csv(content).unwrap()
    }

    const NET_HEADER: &str =
        "Broker_Id,Sheet,Strategy,Exchange,Instrument,Symbol,Expiry,Strike,Opt_Type,Net_Qty,Avg_Price,Carry_Date";

    #[test]
    fn accepts_exact_contract_in_any_order() {
        let content = format!(
            "{}\nBRK1,FNO,ALPHA,NSE,EQ,RELIANCE,,,,100,2500.500,02-JAN-2024",
            NET_HEADER
        );
        let batch =
            validate_schema(&net_raw(content.as_bytes()), &ColumnContract::net_default()).unwrap();
        assert_eq!(batch.kind, BatchKind::Net);
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].row, 1);
        assert_eq!(batch.rows[0].get("symbol"), Some("RELIANCE"));
        assert_eq!(batch.rows[0].get("net_qty"), Some("100"));

        // same columns, shuffled
        let shuffled =
            "Carry_Date,Broker_Id,Sheet,Strategy,Exchange,Instrument,Symbol,Expiry,Strike,Opt_Type,Net_Qty,Avg_Price\n02-JAN-2024,BRK1,FNO,ALPHA,NSE,EQ,RELIANCE,,,,100,2500.500";
        let batch = validate_schema(
            &net_raw(shuffled.as_bytes()),
            &ColumnContract::net_default(),
        )
        .unwrap();
        assert_eq!(batch.rows[0].get("carry_date"), Some("02-JAN-2024"));
    }

    #[test]
    fn reports_every_missing_column() {
        let content = "Broker_Id,Sheet,Strategy,Exchange,Instrument,Symbol,Expiry,Strike,Opt_Type\nBRK1,FNO,ALPHA,NSE,EQ,RELIANCE,,,";
        let err = validate_schema(&net_raw(content.as_bytes()), &ColumnContract::net_default())
            .unwrap_err();
        match err {
            Error::Schema(SchemaError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["Avg_Price", "Carry_Date", "Net_Qty"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_columns() {
        let content = format!(
            "{},Mystery\nBRK1,FNO,ALPHA,NSE,EQ,RELIANCE,,,,100,2500.500,02-JAN-2024,x",
            NET_HEADER
        );
        let err = validate_schema(&net_raw(content.as_bytes()), &ColumnContract::net_default())
            .unwrap_err();
        match err {
            Error::Schema(SchemaError::UnknownColumns(cols)) => {
                assert_eq!(cols, vec!["Mystery"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_misspelled_column_as_missing_and_unknown() {
        let content = NET_HEADER.replace("Net_Qty", "NetQty");
        let content = format!("{}\nBRK1,FNO,ALPHA,NSE,EQ,RELIANCE,,,,100,2500.500,02-JAN-2024", content);
        let err = validate_schema(&net_raw(content.as_bytes()), &ColumnContract::net_default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::MissingColumns(_))
        ));
    }

    #[test]
    fn rejects_duplicate_header() {
        let content = format!("{},Symbol\nBRK1,FNO,ALPHA,NSE,EQ,RELIANCE,,,,100,2500.500,02-JAN-2024,RELIANCE", NET_HEADER);
        let err = validate_schema(&net_raw(content.as_bytes()), &ColumnContract::net_default())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema(SchemaError::DuplicateColumn(ref c)) if c == "Symbol"
        ));
    }

    #[test]
    fn rejects_header_without_data() {
        let err = validate_schema(&net_raw(NET_HEADER.as_bytes()), &ColumnContract::net_default())
            .unwrap_err();
        assert!(matches!(err, Error::Schema(SchemaError::EmptyBatch)));
    }
}
