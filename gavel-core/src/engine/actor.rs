//! The task that owns the auction session
//!
//! Every event (operator start, bid, countdown expiry, stop) arrives as a
//! [`Command`] on one queue and is handled to completion before the next one
//! is received. That queue is the only way to reach the session.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::config::AuctionConfig;
use super::session::{AuctionSession, LeadingBid, Lot, SessionSnapshot};
use super::timer::CancellableTimer;
use super::{BidOutcome, BidRejection, BidRequest, StartReport};
use crate::error::AuctionError;
use crate::ledger::Ledger;
use crate::notifier::{Announcement, Notifier};
use crate::types::{ChannelId, UserId};

/// Messages handled by the engine task
pub(crate) enum Command {
    Start {
        channel: ChannelId,
        reply: oneshot::Sender<Result<StartReport, AuctionError>>,
    },
    Bid {
        request: BidRequest,
        reply: oneshot::Sender<BidOutcome>,
    },
    TimerExpired {
        generation: u64,
    },
    Stop {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

pub(crate) struct EngineActor {
    session: AuctionSession,
    ledger: Arc<dyn Ledger>,
    notifier: Arc<dyn Notifier>,
    config: AuctionConfig,
    /// Weak so countdowns never keep the engine alive
    commands: mpsc::WeakSender<Command>,
}

impl EngineActor {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        notifier: Arc<dyn Notifier>,
        config: AuctionConfig,
        commands: mpsc::WeakSender<Command>,
    ) -> Self {
        Self {
            session: AuctionSession::default(),
            ledger,
            notifier,
            config,
            commands,
        }
    }

    /// Process commands until shutdown or until every handle is dropped
    pub async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        debug!("Auction engine started");

        while let Some(command) = rx.recv().await {
            match command {
                Command::Start { channel, reply } => {
                    let result = self.start(channel).await;
                    let _ = reply.send(result);
                }
                Command::Bid { request, reply } => {
                    let outcome = self.submit_bid(request).await;
                    let _ = reply.send(outcome);
                }
                Command::TimerExpired { generation } => self.on_timer_expiry(generation).await,
                Command::Stop { reply } => {
                    self.stop();
                    let _ = reply.send(());
                }
                Command::Snapshot { reply } => {
                    let _ = reply.send(self.session.snapshot());
                }
                Command::Shutdown { reply } => {
                    self.stop();
                    let _ = reply.send(());
                    break;
                }
            }
        }

        self.session.reset();
        debug!("Auction engine stopped");
    }

    async fn start(&mut self, channel: ChannelId) -> Result<StartReport, AuctionError> {
        if self.session.active {
            return Err(AuctionError::AlreadyActive);
        }
        if self.ledger.player_count()? == 0 {
            return Err(AuctionError::NoPlayers);
        }
        if self.ledger.team_count()? == 0 {
            return Err(AuctionError::NoTeams);
        }

        let players_returned = if self.config.reset_pool_on_start {
            self.ledger.reset_pool()?
        } else {
            0
        };
        if players_returned > 0 {
            info!(players_returned, "Returned players to the auction pool");
        }

        let teams_funded = if self.config.reset_budgets_on_start {
            let budget = self.config.starting_budget;
            let teams = self.ledger.reset_budgets(budget)?;
            self.announce_to(channel, &Announcement::BudgetsReset { teams, budget })
                .await;
            Some(teams)
        } else {
            None
        };

        self.session.activate(channel);
        info!(channel = %channel, "Auction started");
        self.announce(Announcement::AuctionLive {
            bid_prefix: self.config.bid_prefix.clone(),
        })
        .await;
        self.advance().await;

        Ok(StartReport {
            players_returned,
            teams_funded,
        })
    }

    /// Open the next player, or finish when the pool is empty
    async fn advance(&mut self) {
        let next = match self.ledger.next_unassigned_player() {
            Ok(next) => next,
            Err(e) => {
                error!(error = %e, "Failed to fetch next player, stopping auction");
                self.finish(Announcement::Aborted {
                    reason: e.to_string(),
                })
                .await;
                return;
            }
        };

        let Some(player) = next else {
            info!("Auction finished, no unsold players");
            self.finish(Announcement::Finished).await;
            return;
        };

        self.session.lot = Some(Lot::new(player));
        let replaced = self.arm_timer();
        debug_assert!(!replaced, "countdown still armed when opening a player");
        if replaced {
            warn!(player = %player, "Cancelled a countdown left over from the previous player");
        }
        info!(player = %player, "Player open for bidding");
        self.announce(Announcement::ItemOpened {
            player,
            countdown: self.config.countdown,
            bid_prefix: self.config.bid_prefix.clone(),
        })
        .await;
    }

    async fn submit_bid(&mut self, request: BidRequest) -> BidOutcome {
        let BidRequest {
            bidder,
            team,
            amount,
        } = request;

        let Some(lot) = self.session.open_lot_mut() else {
            return self.reject(bidder, BidRejection::NoActiveItem);
        };
        let player = lot.player;
        let current = lot.current_bid();
        if amount <= current {
            return self.reject(bidder, BidRejection::NotHigher { current });
        }

        let budget = match self.ledger.team_budget(&team) {
            Ok(Some(budget)) => budget,
            Ok(None) => return self.reject(bidder, BidRejection::UnknownTeam),
            Err(e) => {
                warn!(team = %team, error = %e, "Could not read team budget");
                return self.reject(bidder, BidRejection::LedgerUnavailable);
            }
        };
        if amount > budget {
            return self.reject(bidder, BidRejection::OverBudget { budget });
        }

        if let Some(lot) = self.session.open_lot_mut() {
            lot.leading = Some(LeadingBid {
                amount,
                bidder,
                team: team.clone(),
            });
        }
        self.arm_timer();

        info!(player = %player, bidder = %bidder, team = %team, amount, "Bid accepted");
        self.announce(Announcement::BidAccepted {
            player,
            amount,
            bidder,
            team,
            countdown: self.config.countdown,
        })
        .await;

        BidOutcome::Accepted { amount }
    }

    fn reject(&self, bidder: UserId, reason: BidRejection) -> BidOutcome {
        debug!(bidder = %bidder, reason = ?reason, "Bid rejected");
        BidOutcome::Rejected(reason)
    }

    async fn on_timer_expiry(&mut self, generation: u64) {
        if !self.session.is_current_timer(generation) {
            debug!(generation, "Ignoring superseded countdown");
            return;
        }
        // this countdown has fired; drop its handle
        self.session.timer = None;

        let Some(lot) = self.session.lot.take() else {
            return;
        };

        match lot.leading {
            None => {
                info!(player = %lot.player, "No bids, player skipped");
                self.announce(Announcement::Skipped { player: lot.player })
                    .await;
                if let Err(e) = self.ledger.mark_skipped(lot.player) {
                    error!(player = %lot.player, error = %e, "Failed to mark player skipped");
                }
            }
            Some(bid) => self.finalize_sale(lot.player, bid).await,
        }

        self.advance().await;
    }

    async fn finalize_sale(&mut self, player: UserId, bid: LeadingBid) {
        // conditional debit: a budget changed out of band fails here instead of overspending
        if let Err(e) = self.ledger.settle_sale(player, &bid.team, bid.amount) {
            error!(
                player = %player,
                team = %bid.team,
                amount = bid.amount,
                error = %e,
                "Failed to settle sale, player stays in the pool"
            );
            self.announce(Announcement::SaleFailed {
                player,
                team: bid.team,
                amount: bid.amount,
                reason: e.to_string(),
            })
            .await;
            return;
        }

        info!(player = %player, team = %bid.team, amount = bid.amount, "Player sold");
        self.announce(Announcement::Sold {
            player,
            team: bid.team.clone(),
            amount: bid.amount,
        })
        .await;

        self.grant_team_role(player, &bid.team).await;
    }

    /// Best effort: a missing role or member is logged, never fatal
    async fn grant_team_role(&self, player: UserId, team: &str) {
        let role = match self.ledger.team_role(team) {
            Ok(Some(role)) => role,
            Ok(None) => {
                warn!(team, "Team has no role to grant");
                return;
            }
            Err(e) => {
                warn!(team, error = %e, "Could not look up team role");
                return;
            }
        };

        if let Err(e) = self.notifier.grant_role(player, role).await {
            warn!(player = %player, role = %role, error = %e, "Failed to grant team role");
        }
    }

    /// Arm a fresh countdown for the open player, cancelling any other.
    /// Returns whether a previous countdown was still armed.
    fn arm_timer(&mut self) -> bool {
        let duration = self.config.countdown;
        let commands = self.commands.clone();

        self.session.replace_timer(|generation| {
            CancellableTimer::start(generation, duration, move || async move {
                if let Some(commands) = commands.upgrade() {
                    let _ = commands.send(Command::TimerExpired { generation }).await;
                }
            })
        })
    }

    fn stop(&mut self) {
        if self.session.active {
            info!("Auction stopped");
        }
        self.session.reset();
    }

    /// End the session and post the closing announcement
    async fn finish(&mut self, announcement: Announcement) {
        let channel = self.session.channel;
        self.session.reset();
        if let Some(channel) = channel {
            self.announce_to(channel, &announcement).await;
        }
    }

    async fn announce(&self, announcement: Announcement) {
        if let Some(channel) = self.session.channel {
            self.announce_to(channel, &announcement).await;
        }
    }

    async fn announce_to(&self, channel: ChannelId, announcement: &Announcement) {
        if let Err(e) = self.notifier.announce(channel, announcement).await {
            warn!(channel = %channel, error = %e, "Failed to deliver announcement");
        }
    }
}
