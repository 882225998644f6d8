//! Auction tuning knobs

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::Amount;

/// Configuration for the auction engine and bid gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionConfig {
    /// Time a player stays open without a new bid
    #[serde(default = "default_countdown", with = "humantime_serde")]
    pub countdown: Duration,

    /// Reset every team's budget when an auction starts
    #[serde(default = "default_true")]
    pub reset_budgets_on_start: bool,

    /// Budget each team gets when budgets are reset
    #[serde(default = "default_starting_budget")]
    pub starting_budget: Amount,

    /// Return previously bought players to the pool when an auction starts
    #[serde(default = "default_true")]
    pub reset_pool_on_start: bool,

    /// Command prefix that marks a chat message as a bid
    #[serde(default = "default_bid_prefix")]
    pub bid_prefix: String,
}

fn default_countdown() -> Duration {
    Duration::from_secs(15)
}

fn default_starting_budget() -> Amount {
    145_000_000
}

fn default_true() -> bool {
    true
}

fn default_bid_prefix() -> String {
    "!bid".to_string()
}

impl Default for AuctionConfig {
    fn default() -> Self {
        Self {
            countdown: default_countdown(),
            reset_budgets_on_start: true,
            starting_budget: default_starting_budget(),
            reset_pool_on_start: true,
            bid_prefix: default_bid_prefix(),
        }
    }
}

impl AuctionConfig {
    #[must_use]
    pub fn with_countdown(mut self, countdown: Duration) -> Self {
        self.countdown = countdown;
        self
    }

    #[must_use]
    pub fn with_starting_budget(mut self, budget: Amount) -> Self {
        self.starting_budget = budget;
        self
    }

    /// Start auctions against the ledger exactly as it is
    #[must_use]
    pub fn without_resets(mut self) -> Self {
        self.reset_budgets_on_start = false;
        self.reset_pool_on_start = false;
        self
    }
}
