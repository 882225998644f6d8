//! Team, player and budget storage

mod error;
mod memory;
mod migrations;
mod sqlite;
mod traits;

pub use error::LedgerError;
pub use memory::MemoryLedger;
pub use sqlite::SqliteLedger;
pub use traits::{Ledger, SKIP_SENTINEL};
