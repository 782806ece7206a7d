use clap::Parser;
use miette::{IntoDiagnostic, Result};
use pointledger::application::ledger::PointLedger;
use pointledger::domain::ports::{BalanceStoreRef, HistoryStoreRef};
use pointledger::infrastructure::in_memory::{InMemoryBalanceStore, InMemoryHistoryStore};
use pointledger::interfaces::csv::command_reader::{Command, CommandReader};
use pointledger::interfaces::csv::point_writer::PointWriter;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file (`type, user, amount`)
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "POINTLEDGER_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Also print the point history of every user referenced by the input
    #[arg(long)]
    history: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "POINTLEDGER_LOG", default_value = "warn")]
    log_level: String,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr)
        .init();
}

fn in_memory_stores() -> (BalanceStoreRef, HistoryStoreRef) {
    let balance_store: BalanceStoreRef = Arc::new(InMemoryBalanceStore::new());
    let history_store: HistoryStoreRef = Arc::new(InMemoryHistoryStore::new());
    (balance_store, history_store)
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<&Path>) -> Result<(BalanceStoreRef, HistoryStoreRef)> {
    use pointledger::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            info!(path = %path.display(), "using RocksDB storage");
            let balance_store: BalanceStoreRef = Arc::new(store.clone());
            let history_store: HistoryStoreRef = Arc::new(store);
            Ok((balance_store, history_store))
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<&Path>) -> Result<(BalanceStoreRef, HistoryStoreRef)> {
    if db_path.is_some() {
        warn!(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
        );
    }
    Ok(in_memory_stores())
}

/// Applies every valid command in order and returns the users they referenced.
///
/// Malformed rows are reported and skipped; storage failures abort the run.
async fn process_commands<R: Read>(
    ledger: &PointLedger,
    reader: CommandReader<R>,
) -> pointledger::error::Result<BTreeSet<i64>> {
    let mut users = BTreeSet::new();

    for command in reader.commands() {
        let command = match command {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "Error reading command");
                continue;
            }
        };
        users.insert(command.user_id());

        match command {
            Command::Charge { user_id, amount } => {
                ledger.charge(user_id, amount).await?;
            }
            Command::Use { user_id, amount } => {
                ledger.use_points(user_id, amount).await?;
            }
            Command::Balance { user_id } => {
                let point = ledger.get_balance(user_id).await?;
                info!(user_id, balance = point.amount, "balance");
            }
            Command::History { user_id } => {
                let entries = ledger.list_history(user_id).await?;
                info!(user_id, entries = entries.len(), "history");
            }
        }
    }

    Ok(users)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let (balance_store, history_store) = open_stores(cli.db_path.as_deref())?;
    let ledger = PointLedger::new(balance_store, history_store);

    let file = File::open(&cli.input).into_diagnostic()?;
    let users = process_commands(&ledger, CommandReader::new(file))
        .await
        .into_diagnostic()?;

    let mut balances = Vec::with_capacity(users.len());
    let mut entries = Vec::new();
    for &user_id in &users {
        balances.push(ledger.get_balance(user_id).await.into_diagnostic()?);
        if cli.history {
            entries.extend(ledger.list_history(user_id).await.into_diagnostic()?);
        }
    }

    let stdout = io::stdout();
    let mut writer = PointWriter::new(stdout.lock());
    writer.write_balances(&balances).into_diagnostic()?;
    if cli.history {
        writer.write_history(&entries).into_diagnostic()?;
    }

    Ok(())
}
