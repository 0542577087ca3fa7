//! Domain constants shared by both loaders.

/// Exchanges the backoffice accepts positions and trades from.
pub const ALLOWED_EXCHANGES: &[&str] = &["NSE", "BSE"];

/// Instrument spellings folded into the canonical `EQ` instrument type.
pub const EQ_ALIASES: &[&str] = &["EQ", "EQUITY", "CASH"];

/// Canonical instrument types after alias resolution.
pub const ALLOWED_INSTRUMENTS: &[&str] = &[
    "EQ", "FUT", "FUTIDX", "FUTSTK", "OPT", "OPTIDX", "OPTSTK",
];

/// BSE index symbol aliases resolved to their canonical symbols.
pub const BSE_SYMBOL_ALIASES: &[(&str, &[&str])] = &[
    ("SENSEX", &["BSX", "BSE", "BSXOPT", "SENSEX"]),
    ("BANKEX", &["BKX", "BKXOPT", "BANKEX"]),
];

/// Instrument spellings rewritten to `OPTIDX` when a BSE index symbol is
/// canonicalized.
pub const BSE_OPT_ALIASES: &[&str] = &["IO", "OPT", "OPTIDX"];

/// Instrument spellings rewritten to `FUTIDX` when a BSE index symbol is
/// canonicalized.
pub const BSE_FUT_ALIASES: &[&str] = &["FUT", "FUTIDX"];

/// Broker date format, e.g. `02-JAN-2024`.
pub const BROKER_DATE_FORMAT: &str = "%d-%b-%Y";

/// Cell contents treated as an explicit null marker (case-insensitive).
pub const NULL_MARKERS: &[&str] = &["", "nan", "none", "null"];

/// Identifier fields upper-cased during normalization.
pub const UPPERCASE_FIELDS: &[&str] = &[
    "broker_id",
    "sheet",
    "strategy",
    "exchange",
    "instrument_type",
    "symbol",
    "opt_type",
];

/// Conflict target of the net position upsert, in store column order.
pub const NET_POSITION_KEY_COLUMNS: &[&str] = &[
    "broker_id",
    "sheet",
    "strategy",
    "exchange",
    "instrument_type",
    "symbol",
    "expiry",
    "strike",
    "opt_type",
    "carry_date",
];

/// Maximum decimal places accepted for prices, rates, and strikes.
pub const MAX_PRICE_DECIMALS: u32 = 3;

/// Sheet assigned to equity positions during normalization.
pub const EQ_SHEET: &str = "PORTFOLIO";

/// Returns true when the cell content is an explicit null marker.
pub fn is_null_marker(value: &str) -> bool {
    NULL_MARKERS.contains(&value.trim().to_lowercase().as_str())
}
