//! gavel-core: Core library for gavel, live timed player auctions in chat
//!
//! Team captains bid on players one at a time in a single channel. Each
//! accepted bid resets a countdown; when it runs out the player is sold to the
//! highest bidder or skipped if nobody bid.
//!
//! - **Engine** - [`AuctionEngine`] owns the auction session and its countdown
//! - **Gateway** - [`BidGateway`] filters chat messages down to candidate bids
//! - **Ledger** - [`Ledger`] trait over team budgets and player assignments,
//!   with [`SqliteLedger`] and [`MemoryLedger`]
//! - **Notifier** - [`Notifier`] trait for channel output and role grants
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use gavel_core::{AuctionConfig, AuctionEngine, ChannelId, LogNotifier, MemoryLedger};
//!
//! async fn example() -> Result<(), gavel_core::AuctionError> {
//!     let engine = AuctionEngine::spawn(
//!         Arc::new(MemoryLedger::new()),
//!         Arc::new(LogNotifier),
//!         AuctionConfig::default(),
//!     );
//!     engine.start(ChannelId(1)).await?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! chat ──► BidGateway ──► AuctionEngine ──► Ledger
//!                             │
//!                             ▼
//!                          Notifier ──► chat
//! ```

pub mod engine;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod notifier;
pub mod types;

// Re-export key types for convenience
pub use engine::{
    AuctionConfig, AuctionEngine, BidOutcome, BidRejection, BidRequest, SessionSnapshot,
    StartReport,
};
pub use error::{AuctionError, GavelError, NotifierError};
pub use gateway::{
    BidGateway, BidParseError, DiscardReason, GatewayOutcome, InboundMessage, StartCommand,
    parse_amount, start_auction, start_reply,
};
pub use ledger::{Ledger, LedgerError, MemoryLedger, SKIP_SENTINEL, SqliteLedger};
pub use notifier::{Announcement, LogNotifier, Notifier, RecordingNotifier, bid_prompt};
pub use types::{
    Amount, ChannelId, MessageId, Player, PlayerStatus, RoleId, Team, UserId, format_amount,
};
