use backoffice_core::errors::{CommitError, Result};

/// Runtime configuration, read from the environment (a `.env` file is
/// honored if present).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| CommitError::Connection("DATABASE_URL is not set".to_string()))?;
        Ok(Config { database_url })
    }
}
