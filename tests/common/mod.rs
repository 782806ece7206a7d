use pointledger::application::ledger::PointLedger;
use pointledger::infrastructure::in_memory::{InMemoryBalanceStore, InMemoryHistoryStore};
use std::io::{Error, Write};
use std::sync::Arc;
use tempfile::NamedTempFile;

#[allow(dead_code)]
pub fn in_memory_ledger() -> PointLedger {
    PointLedger::new(
        Arc::new(InMemoryBalanceStore::new()),
        Arc::new(InMemoryHistoryStore::new()),
    )
}

/// Writes a commands CSV with the standard header followed by `rows`.
#[allow(dead_code)]
pub fn commands_file(rows: &[&str]) -> Result<NamedTempFile, Error> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "type, user, amount")?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    file.flush()?;
    Ok(file)
}
