//! Bid gateway: turns raw chat messages into candidate bids
//!
//! The gateway only filters and parses. Whether a bid beats the current one
//! or fits the team's budget is decided by the engine alone.

mod amount;
mod operator;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::engine::{AuctionEngine, BidOutcome, BidRequest};
use crate::error::AuctionError;
use crate::ledger::Ledger;
use crate::notifier::Notifier;
use crate::types::{ChannelId, MessageId, RoleId, UserId};

pub use amount::{BidParseError, parse_amount};
pub use operator::{StartCommand, start_auction, start_reply};

/// Platform-neutral view of an incoming chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub id: MessageId,
    pub channel: ChannelId,
    pub author: UserId,
    pub author_is_bot: bool,
    pub author_roles: Vec<RoleId>,
    pub content: String,
}

/// What the gateway did with a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayOutcome {
    /// Not a bid for the running auction; left alone
    Ignored,
    /// A bid command that never reached the engine
    Discarded(DiscardReason),
    /// Handed to the engine
    Forwarded(BidOutcome),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// Sender cannot bid for any team
    NotCaptain,
    Unparsable(BidParseError),
}

/// Filters chat traffic down to bids for the engine
pub struct BidGateway {
    engine: AuctionEngine,
    ledger: Arc<dyn Ledger>,
    notifier: Arc<dyn Notifier>,
    prefix: String,
}

impl BidGateway {
    pub fn new(
        engine: AuctionEngine,
        ledger: Arc<dyn Ledger>,
        notifier: Arc<dyn Notifier>,
        prefix: impl Into<String>,
    ) -> Self {
        Self {
            engine,
            ledger,
            notifier,
            prefix: prefix.into(),
        }
    }

    /// Gate one message. Bid commands in the auction channel are always
    /// deleted afterwards, whatever the outcome.
    pub async fn handle(&self, message: &InboundMessage) -> Result<GatewayOutcome, AuctionError> {
        if message.author_is_bot {
            return Ok(GatewayOutcome::Ignored);
        }
        let Some(token) = bid_token(&message.content, &self.prefix) else {
            return Ok(GatewayOutcome::Ignored);
        };
        if self.engine.active_channel().await != Some(message.channel) {
            return Ok(GatewayOutcome::Ignored);
        }

        let outcome = self.evaluate(message, token).await;
        self.delete(message).await;
        outcome
    }

    async fn evaluate(
        &self,
        message: &InboundMessage,
        token: &str,
    ) -> Result<GatewayOutcome, AuctionError> {
        let team = match self
            .ledger
            .captain_team(message.author, &message.author_roles)
        {
            Ok(Some(team)) => team,
            Ok(None) => {
                debug!(author = %message.author, "Bid from a non-captain discarded");
                return Ok(GatewayOutcome::Discarded(DiscardReason::NotCaptain));
            }
            Err(e) => {
                warn!(author = %message.author, error = %e, "Could not resolve captain's team");
                return Ok(GatewayOutcome::Discarded(DiscardReason::NotCaptain));
            }
        };

        let amount = match parse_amount(token) {
            Ok(amount) => amount,
            Err(e) => {
                debug!(author = %message.author, error = %e, "Unparsable bid discarded");
                return Ok(GatewayOutcome::Discarded(DiscardReason::Unparsable(e)));
            }
        };

        let outcome = self
            .engine
            .submit_bid(BidRequest {
                bidder: message.author,
                team,
                amount,
            })
            .await?;
        Ok(GatewayOutcome::Forwarded(outcome))
    }

    async fn delete(&self, message: &InboundMessage) {
        if let Err(e) = self
            .notifier
            .delete_message(message.channel, message.id)
            .await
        {
            warn!(message = %message.id, error = %e, "Failed to delete bid message");
        }
    }
}

/// Amount token of a bid command, or `None` if `content` is not one.
/// The prefix matches case-insensitively.
pub fn bid_token<'a>(content: &'a str, prefix: &str) -> Option<&'a str> {
    let head = content.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&content[prefix.len()..])
    } else {
        None
    }
}
