//! In-memory auction session state

use serde::{Deserialize, Serialize};

use super::timer::CancellableTimer;
use crate::types::{Amount, ChannelId, UserId};

/// Highest accepted bid on the open player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadingBid {
    pub amount: Amount,
    pub bidder: UserId,
    pub team: String,
}

/// The player currently open for bidding
#[derive(Debug)]
pub(crate) struct Lot {
    pub player: UserId,
    /// `None` until the first bid is accepted
    pub leading: Option<LeadingBid>,
}

impl Lot {
    pub fn new(player: UserId) -> Self {
        Self {
            player,
            leading: None,
        }
    }

    /// Highest accepted bid, `0` when nobody has bid
    pub fn current_bid(&self) -> Amount {
        self.leading.as_ref().map_or(0, |bid| bid.amount)
    }
}

/// Live state of one running auction
///
/// Owned exclusively by the engine task; nothing else can reach it.
#[derive(Debug, Default)]
pub(crate) struct AuctionSession {
    pub active: bool,
    pub channel: Option<ChannelId>,
    pub lot: Option<Lot>,
    pub timer: Option<CancellableTimer>,
    next_generation: u64,
}

impl AuctionSession {
    /// Clear everything and cancel any outstanding countdown
    pub fn reset(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.active = false;
        self.channel = None;
        self.lot = None;
    }

    pub fn activate(&mut self, channel: ChannelId) {
        self.reset();
        self.active = true;
        self.channel = Some(channel);
    }

    /// Lot open for bids, only while the session is active
    pub fn open_lot_mut(&mut self) -> Option<&mut Lot> {
        if self.active { self.lot.as_mut() } else { None }
    }

    /// Install a new countdown, cancelling the previous one first.
    ///
    /// `arm` receives the new generation. Returns whether a previous timer
    /// had to be cancelled.
    pub fn replace_timer<F>(&mut self, arm: F) -> bool
    where
        F: FnOnce(u64) -> CancellableTimer,
    {
        let replaced = match self.timer.take() {
            Some(previous) => {
                previous.cancel();
                true
            }
            None => false,
        };
        self.next_generation += 1;
        self.timer = Some(arm(self.next_generation));
        replaced
    }

    /// Whether `generation` is the countdown currently armed
    pub fn is_current_timer(&self, generation: u64) -> bool {
        self.timer
            .as_ref()
            .is_some_and(|timer| timer.generation() == generation)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let leading = self.lot.as_ref().and_then(|lot| lot.leading.clone());
        SessionSnapshot {
            active: self.active,
            channel: self.channel,
            current_item: self.lot.as_ref().map(|lot| lot.player),
            current_bid: self.lot.as_ref().map_or(0, Lot::current_bid),
            highest_bidder: leading.map(|bid| (bid.bidder, bid.team)),
            timer_armed: self.timer.is_some(),
        }
    }
}

/// Point-in-time copy of the session, for status displays and tests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub active: bool,
    pub channel: Option<ChannelId>,
    pub current_item: Option<UserId>,
    pub current_bid: Amount,
    pub highest_bidder: Option<(UserId, String)>,
    pub timer_armed: bool,
}
