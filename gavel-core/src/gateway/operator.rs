//! Operator commands

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::{AuctionEngine, StartReport};
use crate::error::AuctionError;
use crate::types::{ChannelId, UserId};

/// A request to start the auction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartCommand {
    /// Channel the auction runs in
    pub channel: ChannelId,
    pub invoker: UserId,
    pub invoker_is_admin: bool,
}

/// Start the auction on behalf of an operator.
///
/// Only administrators may start; everything else is the engine's call.
pub async fn start_auction(
    engine: &AuctionEngine,
    command: StartCommand,
) -> Result<StartReport, AuctionError> {
    if !command.invoker_is_admin {
        warn!(invoker = %command.invoker, "Non-administrator tried to start the auction");
        return Err(AuctionError::PermissionDenied);
    }

    let report = engine.start(command.channel).await?;
    info!(
        invoker = %command.invoker,
        channel = %command.channel,
        players_returned = report.players_returned,
        "Auction started by operator"
    );
    Ok(report)
}

/// Private reply shown to the operator
pub fn start_reply(result: &Result<StartReport, AuctionError>, channel: ChannelId) -> String {
    match result {
        Ok(report) => format!(
            "Auction started in <#{channel}>\nReset **{}** player(s) back into auction pool",
            report.players_returned
        ),
        Err(e) => e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::AuctionConfig;
    use crate::ledger::{Ledger, MemoryLedger};
    use crate::notifier::RecordingNotifier;
    use crate::types::Team;

    fn engine() -> (AuctionEngine, Arc<RecordingNotifier>) {
        let ledger = Arc::new(MemoryLedger::new());
        ledger
            .create_team(&Team::new("Alpha", "ALP", UserId(100)))
            .unwrap();
        ledger.enroll_player(UserId(1)).unwrap();
        let notifier = Arc::new(RecordingNotifier::new());
        let engine = AuctionEngine::spawn(ledger, notifier.clone(), AuctionConfig::default());
        (engine, notifier)
    }

    fn command(invoker_is_admin: bool) -> StartCommand {
        StartCommand {
            channel: ChannelId(500),
            invoker: UserId(42),
            invoker_is_admin,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn non_admin_cannot_start() {
        let (engine, notifier) = engine();

        let result = start_auction(&engine, command(false)).await;

        assert!(matches!(result, Err(AuctionError::PermissionDenied)));
        assert!(!engine.snapshot().await.unwrap().active);
        assert!(notifier.announcements().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn admin_starts_the_auction() {
        let (engine, _notifier) = engine();

        let result = start_auction(&engine, command(true)).await;

        assert!(result.is_ok());
        assert_eq!(
            start_reply(&result, ChannelId(500)),
            "Auction started in <#500>\nReset **0** player(s) back into auction pool"
        );
        let snapshot = engine.snapshot().await.unwrap();
        assert!(snapshot.active);
        assert_eq!(snapshot.current_item, Some(UserId(1)));
    }

    #[test]
    fn reply_reports_players_returned_to_the_pool() {
        let result = Ok(StartReport {
            players_returned: 3,
            teams_funded: Some(2),
        });

        let reply = start_reply(&result, ChannelId(500));

        assert!(reply.contains("Reset **3** player(s) back into auction pool"));
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_replies_already_running() {
        let (engine, _notifier) = engine();
        start_auction(&engine, command(true)).await.unwrap();

        let result = start_auction(&engine, command(true)).await;

        assert_eq!(
            start_reply(&result, ChannelId(500)),
            "Auction already running!"
        );
    }
}
