use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use backoffice_core::ingest::{IntradayTradeRow, NetPositionRow};

/// Dates stored as ISO-8601 text, matching the position key encoding.
const DB_DATE_FORMAT: &str = "%Y-%m-%d";

/// Database model for net position snapshots. The id is the surrogate
/// derived from the position key columns, so `replace_into` upserts on
/// the business key even when nullable columns are involved.
#[derive(Queryable, Selectable, Identifiable, Insertable, AsChangeset, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::net_positions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct NetPositionDB {
    pub id: String,
    pub broker_id: String,
    pub sheet: String,
    pub strategy: String,
    pub exchange: String,
    pub instrument_type: String,
    pub symbol: String,
    pub expiry: Option<String>,
    pub strike: Option<String>,
    pub opt_type: Option<String>,
    pub net_qty: i64,
    pub avg_price: String,
    pub carry_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&NetPositionRow> for NetPositionDB {
    fn from(row: &NetPositionRow) -> Self {
        let now = Utc::now().to_rfc3339();
        NetPositionDB {
            id: row.key().storage_id(),
            broker_id: row.broker_id.clone(),
            sheet: row.sheet.clone(),
            strategy: row.strategy.clone(),
            exchange: row.exchange.clone(),
            instrument_type: row.instrument_type.clone(),
            symbol: row.symbol.clone(),
            expiry: row.expiry.map(|d| d.format(DB_DATE_FORMAT).to_string()),
            strike: row.strike.map(|s| s.normalize().to_string()),
            opt_type: row.opt_type.clone(),
            net_qty: row.net_qty,
            avg_price: row.avg_price.to_string(),
            carry_date: row.carry_date.format(DB_DATE_FORMAT).to_string(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Database model for intraday trade executions. Append-only; the
/// unique index on (execution_id, trade_date) rejects replays.
#[derive(Queryable, Selectable, Identifiable, Insertable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::intraday_trades)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct IntradayTradeDB {
    pub id: String,
    pub execution_id: String,
    pub broker_id: String,
    pub sheet: String,
    pub strategy: String,
    pub exchange: String,
    pub instrument_type: String,
    pub symbol: String,
    pub expiry: Option<String>,
    pub strike: Option<String>,
    pub opt_type: Option<String>,
    pub buy_qty: Option<i64>,
    pub buy_rate: Option<String>,
    pub sell_qty: Option<i64>,
    pub sell_rate: Option<String>,
    pub net_qty: i64,
    pub trade_date: String,
    pub created_at: String,
}

impl From<&IntradayTradeRow> for IntradayTradeDB {
    fn from(row: &IntradayTradeRow) -> Self {
        IntradayTradeDB {
            id: Uuid::new_v4().to_string(),
            execution_id: row.execution_id.clone(),
            broker_id: row.broker_id.clone(),
            sheet: row.sheet.clone(),
            strategy: row.strategy.clone(),
            exchange: row.exchange.clone(),
            instrument_type: row.instrument_type.clone(),
            symbol: row.symbol.clone(),
            expiry: row.expiry.map(|d| d.format(DB_DATE_FORMAT).to_string()),
            strike: row.strike.map(|s| s.normalize().to_string()),
            opt_type: row.opt_type.clone(),
            buy_qty: row.buy_qty,
            buy_rate: row.buy_rate.map(|r| r.to_string()),
            sell_qty: row.sell_qty,
            sell_rate: row.sell_rate.map(|r| r.to_string()),
            net_qty: row.net_qty,
            trade_date: row.trade_date.format(DB_DATE_FORMAT).to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}
