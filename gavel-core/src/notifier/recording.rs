//! Notifier that records every call, for tests and transcripts

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{Announcement, Notifier};
use crate::error::NotifierError;
use crate::types::{ChannelId, MessageId, RoleId, UserId};

/// A single recorded notifier call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    Announce {
        channel: ChannelId,
        announcement: Announcement,
    },
    GrantRole {
        member: UserId,
        role: RoleId,
    },
    DeleteMessage {
        channel: ChannelId,
        message: MessageId,
    },
}

/// Records calls in the order they were made
///
/// Can be told to fail role grants or announcements to exercise
/// best-effort paths.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: Mutex<Vec<NotifierCall>>,
    fail_grants: AtomicBool,
    fail_announcements: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `grant_role` fail with `MissingMember`
    pub fn fail_grants(&self, fail: bool) {
        self.fail_grants.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `announce` fail (the call is still recorded)
    pub fn fail_announcements(&self, fail: bool) {
        self.fail_announcements.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, Vec<NotifierCall>> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every call so far
    pub fn calls(&self) -> Vec<NotifierCall> {
        self.lock().clone()
    }

    /// Announcements so far, in order
    pub fn announcements(&self) -> Vec<Announcement> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                NotifierCall::Announce { announcement, .. } => Some(announcement.clone()),
                _ => None,
            })
            .collect()
    }

    /// Rendered announcement texts, in order
    pub fn texts(&self) -> Vec<String> {
        self.announcements().iter().map(|a| a.to_string()).collect()
    }

    /// Role grants so far
    pub fn grants(&self) -> Vec<(UserId, RoleId)> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                NotifierCall::GrantRole { member, role } => Some((*member, *role)),
                _ => None,
            })
            .collect()
    }

    /// Deleted messages so far
    pub fn deleted(&self) -> Vec<MessageId> {
        self.lock()
            .iter()
            .filter_map(|call| match call {
                NotifierCall::DeleteMessage { message, .. } => Some(*message),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn announce(
        &self,
        channel: ChannelId,
        announcement: &Announcement,
    ) -> Result<(), NotifierError> {
        self.lock().push(NotifierCall::Announce {
            channel,
            announcement: announcement.clone(),
        });
        if self.fail_announcements.load(Ordering::SeqCst) {
            return Err(NotifierError::Delivery("announcements disabled".into()));
        }
        Ok(())
    }

    async fn grant_role(&self, member: UserId, role: RoleId) -> Result<(), NotifierError> {
        if self.fail_grants.load(Ordering::SeqCst) {
            return Err(NotifierError::MissingMember(member));
        }
        self.lock().push(NotifierCall::GrantRole { member, role });
        Ok(())
    }

    async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> Result<(), NotifierError> {
        self.lock()
            .push(NotifierCall::DeleteMessage { channel, message });
        Ok(())
    }
}
