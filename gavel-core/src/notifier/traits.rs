//! Notifier trait: delivery of chat output

use async_trait::async_trait;

use super::Announcement;
use crate::error::NotifierError;
use crate::types::{ChannelId, MessageId, RoleId, UserId};

/// Chat platform operations the auction needs
///
/// Implementations deliver messages, grant roles and remove bid commands.
/// Every failure is reported to the caller, which decides whether it is fatal.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post an announcement to a channel
    async fn announce(
        &self,
        channel: ChannelId,
        announcement: &Announcement,
    ) -> Result<(), NotifierError>;

    /// Grant `role` to `member`
    async fn grant_role(&self, member: UserId, role: RoleId) -> Result<(), NotifierError>;

    /// Remove a message from a channel
    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), NotifierError>;
}
