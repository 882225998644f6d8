//! Delivers auction output to Discord over the REST API

use std::sync::Arc;

use async_trait::async_trait;
use gavel_core::{
    Announcement, ChannelId, MessageId, Notifier, NotifierError, RoleId, UserId, bid_prompt,
};
use serenity::all::{Colour, CreateEmbed, CreateMessage, GuildId, Http};

use super::{to_channel, to_message, to_role, to_user};

/// Reason recorded in the guild audit log for role grants
const GRANT_REASON: &str = "Bought at auction";

pub struct DiscordNotifier {
    http: Arc<Http>,
    guild: GuildId,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>, guild: GuildId) -> Self {
        Self { http, guild }
    }
}

/// Blue embed shown when a player opens for bidding
fn item_embed(announcement: &Announcement) -> Option<CreateEmbed> {
    let Announcement::ItemOpened {
        player,
        countdown,
        bid_prefix,
    } = announcement
    else {
        return None;
    };
    Some(
        CreateEmbed::new()
            .title("New player up for auction")
            .description(format!(
                "<@{player}> is now open for bidding\n\n{}",
                bid_prompt(bid_prefix)
            ))
            .colour(Colour::BLUE)
            .field("Current Bid", "No bids yet", true)
            .field("Time remaining", format!("{}s", countdown.as_secs()), true),
    )
}

fn delivery(e: serenity::Error) -> NotifierError {
    NotifierError::Delivery(e.to_string())
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn announce(
        &self,
        channel: ChannelId,
        announcement: &Announcement,
    ) -> Result<(), NotifierError> {
        let channel = to_channel(channel)?;
        match item_embed(announcement) {
            Some(embed) => channel
                .send_message(&*self.http, CreateMessage::new().embed(embed))
                .await
                .map(|_| ())
                .map_err(delivery),
            None => channel
                .say(&*self.http, announcement.to_string())
                .await
                .map(|_| ())
                .map_err(delivery),
        }
    }

    async fn grant_role(&self, member: UserId, role: RoleId) -> Result<(), NotifierError> {
        self.http
            .add_member_role(self.guild, to_user(member)?, to_role(role)?, Some(GRANT_REASON))
            .await
            .map_err(delivery)
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), NotifierError> {
        to_channel(channel)?
            .delete_message(&*self.http, to_message(message)?)
            .await
            .map_err(delivery)
    }
}
