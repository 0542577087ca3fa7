use std::sync::Arc;

use diesel::prelude::*;
use log::debug;

use backoffice_core::errors::{Error, Result};
use backoffice_core::ingest::{IngestStoreTrait, IntradayTradeRow, NetPositionRow};

use crate::db::{get_connection, DbPool};
use crate::errors::StorageError;
use crate::ingest::model::{IntradayTradeDB, NetPositionDB};
use crate::schema::{intraday_trades, net_positions};

/// Diesel-backed store for the ingestion pipeline.
pub struct SqliteIngestStore {
    pool: Arc<DbPool>,
}

impl SqliteIngestStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }
}

impl IngestStoreTrait for SqliteIngestStore {
    fn upsert_net_positions(
        &self,
        _key_columns: &[&str],
        positions: &[NetPositionRow],
    ) -> Result<usize> {
        // the surrogate id already encodes exactly the key columns, so
        // replace_into on the primary key is the upsert
        let records: Vec<NetPositionDB> = positions.iter().map(NetPositionDB::from).collect();

        let mut conn = get_connection(&self.pool)?;
        let written = conn
            .immediate_transaction(|conn| {
                let mut written = 0;
                for record in &records {
                    written += diesel::replace_into(net_positions::table)
                        .values(record)
                        .execute(conn)?;
                }
                Ok(written)
            })
            .map_err(|e: diesel::result::Error| Error::from(StorageError::from(e)))?;

        debug!("Upserted {} net position row(s)", written);
        Ok(written)
    }

    fn append_intraday_trades(&self, trades: &[IntradayTradeRow]) -> Result<usize> {
        let records: Vec<IntradayTradeDB> = trades.iter().map(IntradayTradeDB::from).collect();

        let mut conn = get_connection(&self.pool)?;
        let written = conn
            .immediate_transaction(|conn| {
                diesel::insert_into(intraday_trades::table)
                    .values(&records)
                    .execute(conn)
            })
            .map_err(|e: diesel::result::Error| Error::from(StorageError::from(e)))?;

        debug!("Appended {} intraday trade row(s)", written);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    use backoffice_core::errors::Error;
    use backoffice_core::ingest::net_position_key_columns;

    use super::*;
    use crate::db;

    fn setup() -> (TempDir, SqliteIngestStore, Arc<DbPool>) {
        let dir = TempDir::new().unwrap();
        let db_path = dir.path().join("backoffice.db");
        let pool = db::init(db_path.to_str().unwrap()).unwrap();
        (dir, SqliteIngestStore::new(pool.clone()), pool)
    }

    fn position(symbol: &str, net_qty: i64) -> NetPositionRow {
        NetPositionRow {
            broker_id: "BRK1".to_string(),
            sheet: "FNO".to_string(),
            strategy: "ALPHA".to_string(),
            exchange: "NSE".to_string(),
            instrument_type: "FUTSTK".to_string(),
            symbol: symbol.to_string(),
            expiry: NaiveDate::from_ymd_opt(2024, 1, 25),
            strike: None,
            opt_type: None,
            net_qty,
            avg_price: dec!(2500.500),
            carry_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            source_row: 1,
        }
    }

    fn trade(execution_id: &str, trade_date: NaiveDate) -> IntradayTradeRow {
        IntradayTradeRow {
            execution_id: execution_id.to_string(),
            broker_id: "BRK1".to_string(),
            sheet: "FNO".to_string(),
            strategy: "ALPHA".to_string(),
            exchange: "NSE".to_string(),
            instrument_type: "EQ".to_string(),
            symbol: "RELIANCE".to_string(),
            expiry: None,
            strike: None,
            opt_type: None,
            buy_qty: Some(100),
            buy_rate: Some(dec!(2500.000)),
            sell_qty: None,
            sell_rate: None,
            net_qty: 100,
            trade_date,
            source_row: 1,
        }
    }

    fn count(pool: &DbPool, table: &str) -> i64 {
        let mut conn = get_connection(pool).unwrap();
        match table {
            "net_positions" => net_positions::table.count().get_result(&mut conn).unwrap(),
            _ => intraday_trades::table.count().get_result(&mut conn).unwrap(),
        }
    }

    #[test]
    fn upsert_inserts_then_replaces_on_the_same_key() {
        let (_dir, store, pool) = setup();
        let keys = net_position_key_columns();

        store.upsert_net_positions(keys, &[position("RELIANCE", 100)]).unwrap();
        store.upsert_net_positions(keys, &[position("RELIANCE", 150)]).unwrap();
        assert_eq!(count(&pool, "net_positions"), 1);

        let mut conn = get_connection(&pool).unwrap();
        let stored: NetPositionDB = net_positions::table
            .select(NetPositionDB::as_select())
            .first(&mut conn)
            .unwrap();
        assert_eq!(stored.net_qty, 150);
        assert_eq!(stored.avg_price, "2500.500");
    }

    #[test]
    fn distinct_keys_coexist() {
        let (_dir, store, pool) = setup();
        let keys = net_position_key_columns();

        store
            .upsert_net_positions(keys, &[position("RELIANCE", 100), position("TCS", -50)])
            .unwrap();
        assert_eq!(count(&pool, "net_positions"), 2);
    }

    #[test]
    fn append_preserves_absent_legs_as_null() {
        let (_dir, store, pool) = setup();
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        store.append_intraday_trades(&[trade("EX1", day)]).unwrap();

        let mut conn = get_connection(&pool).unwrap();
        let stored: IntradayTradeDB = intraday_trades::table
            .select(IntradayTradeDB::as_select())
            .first(&mut conn)
            .unwrap();
        assert_eq!(stored.sell_qty, None);
        assert_eq!(stored.sell_rate, None);
        assert_eq!(stored.buy_qty, Some(100));
    }

    #[test]
    fn replayed_execution_id_rolls_back_the_whole_batch() {
        let (_dir, store, pool) = setup();
        let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();

        store.append_intraday_trades(&[trade("EX1", day)]).unwrap();

        let err = store
            .append_intraday_trades(&[trade("EX2", day), trade("EX1", day)])
            .unwrap_err();
        assert!(matches!(err, Error::StoreConstraint(_)));
        // EX2 must not survive the failed batch
        assert_eq!(count(&pool, "intraday_trades"), 1);
    }

    #[test]
    fn same_execution_id_on_another_day_is_allowed() {
        let (_dir, store, pool) = setup();
        let day_one = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let day_two = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();

        store.append_intraday_trades(&[trade("EX1", day_one)]).unwrap();
        store.append_intraday_trades(&[trade("EX1", day_two)]).unwrap();
        assert_eq!(count(&pool, "intraday_trades"), 2);
    }
}
