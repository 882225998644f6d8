//! The auction engine
//!
//! [`AuctionEngine`] is a cheap, cloneable handle to a single task that owns
//! all auction state. Operator commands, bids and countdown expiries are
//! queued to that task and handled strictly one at a time, so a bid and an
//! expiry can never interleave.
//!
//! ```text
//!  operator ──start──┐
//!  gateway ───bid────┼──► [command queue] ──► EngineActor ──► Ledger
//!  countdown ─expiry─┘                         │    ▲
//!                                              │    └── re-arms countdown
//!                                              ▼
//!                                           Notifier
//! ```
//!
//! A countdown that expires while a bid is queued ahead of it is ignored:
//! the bid re-arms a new countdown with a newer generation first.

mod actor;
mod config;
mod session;
mod timer;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::error::AuctionError;
use crate::ledger::Ledger;
use crate::notifier::Notifier;
use crate::types::{Amount, ChannelId, UserId};

use actor::{Command, EngineActor};

pub use config::AuctionConfig;
pub use session::{LeadingBid, SessionSnapshot};
pub use timer::CancellableTimer;

/// Queued commands before senders wait
const COMMAND_QUEUE_CAPACITY: usize = 64;

/// A candidate bid forwarded by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BidRequest {
    pub bidder: UserId,
    /// Team the bidder captains
    pub team: String,
    pub amount: Amount,
}

/// Result of submitting a bid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidOutcome {
    Accepted { amount: Amount },
    Rejected(BidRejection),
}

impl BidOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BidOutcome::Accepted { .. })
    }
}

/// Why a bid was turned down. Rejections are silent in the channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidRejection {
    /// No auction running or no player open
    NoActiveItem,
    /// Not strictly above the current bid
    NotHigher { current: Amount },
    /// More than the team has left
    OverBudget { budget: Amount },
    /// The team is not in the ledger
    UnknownTeam,
    /// The budget could not be read
    LedgerUnavailable,
}

/// What `start` changed before opening the first player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StartReport {
    /// Previously bought players returned to the pool
    pub players_returned: usize,
    /// Teams whose budget was reset, if budgets were reset
    pub teams_funded: Option<usize>,
}

/// Handle to the auction engine task
#[derive(Clone)]
pub struct AuctionEngine {
    commands: mpsc::Sender<Command>,
}

impl AuctionEngine {
    /// Spawn the engine task on the current tokio runtime
    pub fn spawn(
        ledger: Arc<dyn Ledger>,
        notifier: Arc<dyn Notifier>,
        config: AuctionConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let actor = EngineActor::new(ledger, notifier, config, tx.downgrade());
        tokio::spawn(actor.run(rx));
        Self { commands: tx }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, AuctionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| AuctionError::EngineClosed)?;
        response.await.map_err(|_| AuctionError::EngineClosed)
    }

    /// Start an auction in `channel` and open the first player.
    ///
    /// Fails with [`AuctionError::AlreadyActive`] without touching the
    /// running auction if one is in progress.
    pub async fn start(&self, channel: ChannelId) -> Result<StartReport, AuctionError> {
        self.request(|reply| Command::Start { channel, reply })
            .await?
    }

    /// Validate and, if it beats the current bid within budget, accept a bid
    pub async fn submit_bid(&self, request: BidRequest) -> Result<BidOutcome, AuctionError> {
        self.request(|reply| Command::Bid { request, reply }).await
    }

    /// Abandon the running auction, cancelling its countdown
    pub async fn stop(&self) -> Result<(), AuctionError> {
        self.request(|reply| Command::Stop { reply }).await
    }

    pub async fn snapshot(&self) -> Result<SessionSnapshot, AuctionError> {
        self.request(|reply| Command::Snapshot { reply }).await
    }

    /// Channel of the running auction, if any
    pub async fn active_channel(&self) -> Option<ChannelId> {
        self.snapshot()
            .await
            .ok()
            .filter(|snapshot| snapshot.active)
            .and_then(|snapshot| snapshot.channel)
    }

    /// Stop the auction and end the engine task
    pub async fn shutdown(&self) -> Result<(), AuctionError> {
        self.request(|reply| Command::Shutdown { reply }).await
    }
}
