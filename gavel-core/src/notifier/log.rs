//! Notifier that writes to the tracing log

use async_trait::async_trait;
use tracing::info;

use super::{Announcement, Notifier};
use crate::error::NotifierError;
use crate::types::{ChannelId, MessageId, RoleId, UserId};

/// Emits every notifier call as a log line
///
/// Used when the auction runs without a chat connection.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn announce(
        &self,
        channel: ChannelId,
        announcement: &Announcement,
    ) -> Result<(), NotifierError> {
        info!(channel = %channel, "{}", announcement.to_string().replace('\n', " | "));
        Ok(())
    }

    async fn grant_role(&self, member: UserId, role: RoleId) -> Result<(), NotifierError> {
        info!(member = %member, role = %role, "Role granted");
        Ok(())
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), NotifierError> {
        info!(channel = %channel, message = %message, "Message deleted");
        Ok(())
    }
}
