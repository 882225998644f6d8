//! Ledger error types

use thiserror::Error;

use crate::types::Amount;

/// Errors for roster and budget storage
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Team not found: {0}")]
    UnknownTeam(String),

    #[error("Team {team} cannot pay {amount} with a budget of {budget}")]
    InsufficientBudget {
        team: String,
        budget: Amount,
        amount: Amount,
    },

    #[error("Player not enrolled: {0}")]
    UnknownPlayer(String),

    #[error("Player already enrolled: {0}")]
    DuplicatePlayer(String),

    #[error("Team already exists: {0}")]
    DuplicateTeam(String),

    #[error("Corrupt ledger record: {0}")]
    Corrupt(String),
}
