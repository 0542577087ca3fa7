pub mod model;
pub mod repository;

pub use model::{IntradayTradeDB, NetPositionDB};
pub use repository::SqliteIngestStore;
