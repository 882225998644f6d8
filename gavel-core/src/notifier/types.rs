//! Announcements the engine posts to the auction channel

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{Amount, UserId, format_amount};

/// Something the auction channel should be told
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Announcement {
    /// Every team's budget was reset ahead of the auction
    BudgetsReset { teams: usize, budget: Amount },
    /// The auction has begun
    AuctionLive { bid_prefix: String },
    /// A player is open for bidding
    ItemOpened {
        player: UserId,
        #[serde(with = "humantime_serde")]
        countdown: Duration,
        bid_prefix: String,
    },
    /// A bid was accepted and the countdown restarted
    BidAccepted {
        player: UserId,
        amount: Amount,
        bidder: UserId,
        team: String,
        #[serde(with = "humantime_serde")]
        countdown: Duration,
    },
    /// The countdown ran out with a leading bid
    Sold {
        player: UserId,
        team: String,
        amount: Amount,
    },
    /// The countdown ran out with a leading bid the ledger refused to settle
    SaleFailed {
        player: UserId,
        team: String,
        amount: Amount,
        reason: String,
    },
    /// The countdown ran out with no bids
    Skipped { player: UserId },
    /// The pool is exhausted
    Finished,
    /// The auction could not continue
    Aborted { reason: String },
}

impl Announcement {
    /// Player the announcement is about, if any
    pub fn player(&self) -> Option<UserId> {
        match self {
            Announcement::ItemOpened { player, .. }
            | Announcement::BidAccepted { player, .. }
            | Announcement::Sold { player, .. }
            | Announcement::SaleFailed { player, .. }
            | Announcement::Skipped { player } => Some(*player),
            _ => None,
        }
    }
}

/// How to bid, with examples in both amount notations
pub fn bid_prompt(prefix: &str) -> String {
    format!(
        "Use {prefix} <amount>\n\nExample:\n{prefix} 10M\n{prefix} 10000000"
    )
}

impl fmt::Display for Announcement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Announcement::BudgetsReset { teams, budget } => write!(
                f,
                "**All team budgets have been reset.**\n{} teams now have **{}** each",
                teams,
                format_amount(*budget)
            ),
            Announcement::AuctionLive { bid_prefix } => {
                write!(f, "**Auction is live**\nUse {} <amount>", bid_prefix)
            }
            Announcement::ItemOpened {
                player,
                countdown,
                bid_prefix,
            } => write!(
                f,
                "<@{}> is now open for bidding\n\n{}\n\nCurrent Bid: No bids yet\nTime remaining: {}s",
                player,
                bid_prompt(bid_prefix),
                countdown.as_secs()
            ),
            Announcement::BidAccepted {
                amount,
                bidder,
                team,
                countdown,
                ..
            } => write!(
                f,
                "**New bid** {} by <@{}> ({})\nTimer reset to {}s",
                format_amount(*amount),
                bidder,
                team,
                countdown.as_secs()
            ),
            Announcement::Sold {
                player,
                team,
                amount,
            } => write!(
                f,
                "**SOLD** <@{}> to {}\nfor **{}**",
                player,
                team,
                format_amount(*amount)
            ),
            Announcement::SaleFailed {
                player,
                team,
                amount,
                reason,
            } => write!(
                f,
                "**Sale failed** <@{}> to {} for **{}**: {}\nPlayer goes back up for auction",
                player,
                team,
                format_amount(*amount),
                reason
            ),
            Announcement::Skipped { player } => {
                write!(f, "**No bids** for <@{}>; Player skipped", player)
            }
            Announcement::Finished => write!(f, "Auction finished, no unsold players"),
            Announcement::Aborted { reason } => write!(f, "Auction stopped: {}", reason),
        }
    }
}
