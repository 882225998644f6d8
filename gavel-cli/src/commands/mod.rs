pub mod config;
pub mod console;
pub mod roster;
pub mod run;

use std::sync::Arc;

use anyhow::{Context, Result};
use gavel_core::SqliteLedger;
use tracing::debug;

use crate::config::GavelConfig;

/// Open the SQLite ledger named in the configuration
fn open_ledger(config: &GavelConfig) -> Result<Arc<SqliteLedger>> {
    let path = &config.ledger.path;
    debug!(path = %path.display(), "Opening ledger");
    let ledger = SqliteLedger::open(path)
        .with_context(|| format!("Failed to open ledger at {}", path.display()))?;
    Ok(Arc::new(ledger))
}
