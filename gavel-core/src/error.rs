//! Error types for gavel-core

use thiserror::Error;

use crate::gateway::BidParseError;
use crate::ledger::LedgerError;
use crate::types::{RoleId, UserId};

/// Top-level error type for gavel-core
#[derive(Error, Debug)]
pub enum GavelError {
    #[error("Auction error: {0}")]
    Auction(#[from] AuctionError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Notifier error: {0}")]
    Notifier(#[from] NotifierError),

    #[error("Bid parse error: {0}")]
    BidParse(#[from] BidParseError),
}

/// Errors surfaced to the operator who starts an auction
#[derive(Error, Debug)]
pub enum AuctionError {
    #[error("Auction already running!")]
    AlreadyActive,

    #[error("This action requires administrator privileges")]
    PermissionDenied,

    #[error("There are no players enrolled for the auction")]
    NoPlayers,

    #[error("There are no teams registered")]
    NoTeams,

    #[error("Auction engine is not running")]
    EngineClosed,

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Errors from delivering chat output
#[derive(Error, Debug)]
pub enum NotifierError {
    #[error("Failed to deliver: {0}")]
    Delivery(String),

    #[error("Role not found: {0}")]
    MissingRole(RoleId),

    #[error("Member not found: {0}")]
    MissingMember(UserId),
}
