use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{error, info};

use backoffice_core::errors::{CommitError, Error};
use backoffice_core::ingest::{CommitReceipt, IngestContracts, IngestService, IngestServiceTrait};
use backoffice_storage_sqlite::{db, SqliteIngestStore};

mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "backoffice", version, about = "Broker backoffice file loader")]
struct Cli {
    /// Column contracts file (JSON) overriding the built-in contracts.
    #[arg(long, global = true, value_name = "FILE")]
    contracts_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a broker file and commit it to the store.
    Load {
        #[command(subcommand)]
        target: LoadTarget,
    },
}

#[derive(Subcommand)]
enum LoadTarget {
    /// Net position snapshot, upserted on the position key.
    Net { file: PathBuf },
    /// Intraday trade executions, append-only.
    Intraday { file: PathBuf },
}

enum RunError {
    /// Bad invocation or unreadable contracts file.
    Setup(anyhow::Error),
    /// The pipeline or the store rejected the run.
    Pipeline(Error),
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(receipt) => {
            info!("Done: {} {} row(s) committed", receipt.rows_written, receipt.kind);
            ExitCode::SUCCESS
        }
        Err(RunError::Setup(e)) => {
            error!("{e:#}");
            ExitCode::from(1)
        }
        Err(RunError::Pipeline(e)) => {
            error!("{e}");
            ExitCode::from(exit_code_for(&e))
        }
    }
}

fn run(cli: &Cli) -> Result<CommitReceipt, RunError> {
    let contracts = load_contracts(cli.contracts_file.as_deref()).map_err(RunError::Setup)?;
    let config = Config::from_env().map_err(RunError::Pipeline)?;

    let pool = db::init(&config.database_url).map_err(RunError::Pipeline)?;
    let store = Arc::new(SqliteIngestStore::new(pool));
    let service = IngestService::with_contracts(store, contracts);

    let Command::Load { target } = &cli.command;
    match target {
        LoadTarget::Net { file } => service.load_net_snapshot(file),
        LoadTarget::Intraday { file } => service.load_intraday_trades(file),
    }
    .map_err(RunError::Pipeline)
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load_contracts(path: Option<&std::path::Path>) -> anyhow::Result<IngestContracts> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(IngestContracts::default()),
    }
}

/// Exit codes distinguish a rejected file (fixable by the operator) from
/// store-side failure.
fn exit_code_for(err: &Error) -> u8 {
    match err {
        Error::Io(_)
        | Error::Schema(_)
        | Error::Normalization(_)
        | Error::Validation(_)
        | Error::DuplicateKey(_) => 2,
        Error::StoreConstraint(_) => 3,
        Error::Commit(CommitError::Connection(_)) | Error::Commit(CommitError::Pool(_)) => 4,
        Error::Commit(_) => 5,
    }
}
