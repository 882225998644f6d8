//! Discord adapter: gateway events in, announcements out

mod commands;
mod handler;
mod notifier;

use std::num::NonZeroU64;

use gavel_core::NotifierError;
use serenity::all as discord;

pub use handler::Handler;
pub use notifier::DiscordNotifier;

// Discord snowflakes are never zero; a zero id can only come from a bad ledger row.

fn non_zero(value: u64) -> Option<NonZeroU64> {
    NonZeroU64::new(value)
}

fn to_channel(id: gavel_core::ChannelId) -> Result<discord::ChannelId, NotifierError> {
    non_zero(id.get())
        .map(discord::ChannelId::from)
        .ok_or_else(|| NotifierError::Delivery(format!("invalid channel id {id}")))
}

fn to_message(id: gavel_core::MessageId) -> Result<discord::MessageId, NotifierError> {
    non_zero(id.get())
        .map(discord::MessageId::from)
        .ok_or_else(|| NotifierError::Delivery(format!("invalid message id {id}")))
}

fn to_user(id: gavel_core::UserId) -> Result<discord::UserId, NotifierError> {
    non_zero(id.get())
        .map(discord::UserId::from)
        .ok_or(NotifierError::MissingMember(id))
}

fn to_role(id: gavel_core::RoleId) -> Result<discord::RoleId, NotifierError> {
    non_zero(id.get())
        .map(discord::RoleId::from)
        .ok_or(NotifierError::MissingRole(id))
}
