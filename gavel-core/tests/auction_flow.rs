//! End-to-end auction flows driven on a paused clock
//!
//! Each test builds a roster, starts the engine and advances virtual time past
//! countdowns to observe sales, skips and the finishing announcement.

use std::sync::Arc;
use std::time::Duration;

use gavel_core::{
    Announcement, AuctionConfig, AuctionEngine, AuctionError, BidOutcome, BidRejection,
    BidRequest, ChannelId, Ledger, MemoryLedger, PlayerStatus, RecordingNotifier, RoleId,
    SqliteLedger, Team, UserId,
};
use tempfile::TempDir;
use tokio::time::sleep;

const CHANNEL: ChannelId = ChannelId(500);
const COUNTDOWN: Duration = Duration::from_secs(15);
const START_BUDGET: u64 = 145_000_000;

const ALPHA_CAPTAIN: UserId = UserId(100);
const BETA_CAPTAIN: UserId = UserId(200);
const BETA_ROLE: RoleId = RoleId(20);

fn roster(ledger: &dyn Ledger, players: &[u64]) {
    ledger
        .create_team(&Team::new("Alpha", "ALP", ALPHA_CAPTAIN).with_roles(RoleId(10), RoleId(11)))
        .unwrap();
    ledger
        .create_team(&Team::new("Beta", "BET", BETA_CAPTAIN).with_roles(BETA_ROLE, RoleId(21)))
        .unwrap();
    for &player in players {
        ledger.enroll_player(UserId(player)).unwrap();
    }
}

fn spawn(ledger: Arc<dyn Ledger>) -> (AuctionEngine, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let engine = AuctionEngine::spawn(ledger, notifier.clone(), AuctionConfig::default());
    (engine, notifier)
}

fn live() -> Announcement {
    Announcement::AuctionLive {
        bid_prefix: "!bid".to_string(),
    }
}

fn opened(player: u64) -> Announcement {
    Announcement::ItemOpened {
        player: UserId(player),
        countdown: COUNTDOWN,
        bid_prefix: "!bid".to_string(),
    }
}

fn bid(bidder: UserId, team: &str, amount: u64) -> BidRequest {
    BidRequest {
        bidder,
        team: team.to_string(),
        amount,
    }
}

/// Sleep just past one full countdown
async fn expire() {
    sleep(COUNTDOWN + Duration::from_secs(1)).await;
}

fn status(ledger: &dyn Ledger, player: u64) -> PlayerStatus {
    ledger
        .players()
        .unwrap()
        .into_iter()
        .find(|p| p.id == UserId(player))
        .map(|p| p.status)
        .unwrap()
}

#[tokio::test(start_paused = true)]
async fn unbid_players_are_skipped_until_the_pool_is_empty() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1, 2]);
    let (engine, notifier) = spawn(ledger.clone());

    engine.start(CHANNEL).await.unwrap();
    assert_eq!(engine.snapshot().await.unwrap().current_item, Some(UserId(1)));

    expire().await;
    let snapshot = engine.snapshot().await.unwrap();
    assert_eq!(snapshot.current_item, Some(UserId(2)));
    assert_eq!(snapshot.current_bid, 0);

    expire().await;
    let snapshot = engine.snapshot().await.unwrap();
    assert!(!snapshot.active);
    assert!(!snapshot.timer_armed);

    assert_eq!(
        notifier.announcements(),
        vec![
            Announcement::BudgetsReset {
                teams: 2,
                budget: START_BUDGET
            },
            live(),
            opened(1),
            Announcement::Skipped { player: UserId(1) },
            opened(2),
            Announcement::Skipped { player: UserId(2) },
            Announcement::Finished,
        ]
    );
    assert_eq!(
        notifier.texts()[3],
        "**No bids** for <@1>; Player skipped"
    );
    assert_eq!(status(ledger.as_ref(), 1), PlayerStatus::Skipped);
    assert_eq!(status(ledger.as_ref(), 2), PlayerStatus::Skipped);
}

#[tokio::test(start_paused = true)]
async fn highest_bidder_buys_the_player() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1]);
    let (engine, notifier) = spawn(ledger.clone());
    engine.start(CHANNEL).await.unwrap();

    let first = engine.submit_bid(bid(ALPHA_CAPTAIN, "Alpha", 10_000_000)).await.unwrap();
    let low = engine.submit_bid(bid(BETA_CAPTAIN, "Beta", 5_000_000)).await.unwrap();
    let winning = engine.submit_bid(bid(BETA_CAPTAIN, "Beta", 15_000_000)).await.unwrap();

    assert!(first.is_accepted());
    assert_eq!(
        low,
        BidOutcome::Rejected(BidRejection::NotHigher {
            current: 10_000_000
        })
    );
    assert!(winning.is_accepted());

    expire().await;

    assert_eq!(ledger.team_budget("Beta").unwrap(), Some(130_000_000));
    assert_eq!(ledger.team_budget("Alpha").unwrap(), Some(START_BUDGET));
    assert_eq!(
        status(ledger.as_ref(), 1),
        PlayerStatus::Assigned("Beta".to_string())
    );
    assert_eq!(notifier.grants(), vec![(UserId(1), BETA_ROLE)]);
    assert!(
        notifier
            .texts()
            .contains(&"**SOLD** <@1> to Beta\nfor **15,000,000**".to_string())
    );
    assert_eq!(notifier.announcements().last(), Some(&Announcement::Finished));
}

#[tokio::test(start_paused = true)]
async fn each_accepted_bid_restarts_the_countdown() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1]);
    let (engine, _notifier) = spawn(ledger.clone());
    engine.start(CHANNEL).await.unwrap();

    sleep(Duration::from_secs(10)).await;
    engine.submit_bid(bid(ALPHA_CAPTAIN, "Alpha", 1_000_000)).await.unwrap();

    // 20s after the start, past the first countdown
    sleep(Duration::from_secs(10)).await;
    let snapshot = engine.snapshot().await.unwrap();
    assert!(snapshot.active);
    assert_eq!(snapshot.current_item, Some(UserId(1)));
    assert_eq!(snapshot.current_bid, 1_000_000);

    sleep(Duration::from_secs(6)).await;
    assert!(!engine.snapshot().await.unwrap().active);
    assert_eq!(
        status(ledger.as_ref(), 1),
        PlayerStatus::Assigned("Alpha".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_bids_leave_the_countdown_alone() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1, 2]);
    let (engine, notifier) = spawn(ledger.clone());
    engine.start(CHANNEL).await.unwrap();

    sleep(Duration::from_secs(10)).await;
    let outcome = engine
        .submit_bid(bid(ALPHA_CAPTAIN, "Alpha", START_BUDGET + 1))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        BidOutcome::Rejected(BidRejection::OverBudget {
            budget: START_BUDGET
        })
    );

    sleep(Duration::from_secs(6)).await;
    assert_eq!(engine.snapshot().await.unwrap().current_item, Some(UserId(2)));
    assert!(
        notifier
            .announcements()
            .contains(&Announcement::Skipped { player: UserId(1) })
    );
}

#[tokio::test(start_paused = true)]
async fn bid_equal_to_budget_is_accepted() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1]);
    let (engine, _notifier) = spawn(ledger.clone());
    engine.start(CHANNEL).await.unwrap();

    let outcome = engine
        .submit_bid(bid(ALPHA_CAPTAIN, "Alpha", START_BUDGET))
        .await
        .unwrap();
    assert!(outcome.is_accepted());

    expire().await;
    assert_eq!(ledger.team_budget("Alpha").unwrap(), Some(0));
}

#[tokio::test(start_paused = true)]
async fn bids_without_an_open_player_are_rejected() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1]);
    let (engine, _notifier) = spawn(ledger);

    let outcome = engine.submit_bid(bid(ALPHA_CAPTAIN, "Alpha", 5)).await.unwrap();

    assert_eq!(outcome, BidOutcome::Rejected(BidRejection::NoActiveItem));
}

#[tokio::test(start_paused = true)]
async fn bids_for_unknown_teams_are_rejected() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1]);
    let (engine, _notifier) = spawn(ledger);
    engine.start(CHANNEL).await.unwrap();

    let outcome = engine.submit_bid(bid(UserId(9), "Gamma", 5)).await.unwrap();

    assert_eq!(outcome, BidOutcome::Rejected(BidRejection::UnknownTeam));
    assert_eq!(engine.snapshot().await.unwrap().current_bid, 0);
}

#[tokio::test(start_paused = true)]
async fn second_start_leaves_the_running_auction_untouched() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1, 2]);
    let (engine, notifier) = spawn(ledger);
    engine.start(CHANNEL).await.unwrap();
    engine.submit_bid(bid(ALPHA_CAPTAIN, "Alpha", 3_000_000)).await.unwrap();
    let before = engine.snapshot().await.unwrap();
    let announced = notifier.announcements().len();

    let result = engine.start(ChannelId(999)).await;

    assert!(matches!(result, Err(AuctionError::AlreadyActive)));
    assert_eq!(engine.snapshot().await.unwrap(), before);
    assert_eq!(notifier.announcements().len(), announced);
}

#[tokio::test(start_paused = true)]
async fn start_requires_players_and_teams() {
    let empty = Arc::new(MemoryLedger::new());
    let (engine, _notifier) = spawn(empty.clone());
    assert!(matches!(
        engine.start(CHANNEL).await,
        Err(AuctionError::NoPlayers)
    ));

    empty.enroll_player(UserId(1)).unwrap();
    assert!(matches!(
        engine.start(CHANNEL).await,
        Err(AuctionError::NoTeams)
    ));
    assert!(!engine.snapshot().await.unwrap().active);
}

#[tokio::test(start_paused = true)]
async fn start_returns_bought_players_to_the_pool() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1, 2]);
    ledger.assign_player(UserId(1), "Alpha").unwrap();
    ledger.mark_skipped(UserId(2)).unwrap();
    let (engine, _notifier) = spawn(ledger.clone());

    let report = engine.start(CHANNEL).await.unwrap();

    assert_eq!(report.players_returned, 1);
    assert_eq!(report.teams_funded, Some(2));
    assert_eq!(engine.snapshot().await.unwrap().current_item, Some(UserId(1)));
    assert_eq!(status(ledger.as_ref(), 2), PlayerStatus::Skipped);
    assert_eq!(
        status(ledger.as_ref(), ALPHA_CAPTAIN.get()),
        PlayerStatus::Assigned("Alpha".to_string())
    );
}

#[tokio::test(start_paused = true)]
async fn without_resets_budgets_and_pool_are_kept() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1]);
    let notifier = Arc::new(RecordingNotifier::new());
    let engine = AuctionEngine::spawn(
        ledger.clone(),
        notifier.clone(),
        AuctionConfig::default().without_resets(),
    );

    let report = engine.start(CHANNEL).await.unwrap();

    assert_eq!(report.teams_funded, None);
    assert_eq!(ledger.team_budget("Alpha").unwrap(), Some(0));
    assert_eq!(notifier.announcements()[0], live());
}

#[tokio::test(start_paused = true)]
async fn failed_settlement_keeps_the_player_in_the_pool() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1]);
    let (engine, notifier) = spawn(ledger.clone());
    engine.start(CHANNEL).await.unwrap();
    engine
        .submit_bid(bid(ALPHA_CAPTAIN, "Alpha", 100_000_000))
        .await
        .unwrap();

    // budget spent elsewhere while the countdown runs
    ledger.debit_team("Alpha", 100_000_000).unwrap();
    expire().await;

    let announced = notifier.announcements();
    assert_eq!(announced.len(), 6);
    assert_eq!(
        announced[..3],
        [
            Announcement::BudgetsReset {
                teams: 2,
                budget: START_BUDGET
            },
            live(),
            opened(1),
        ]
    );
    assert_eq!(
        announced[3],
        Announcement::BidAccepted {
            player: UserId(1),
            amount: 100_000_000,
            bidder: ALPHA_CAPTAIN,
            team: "Alpha".to_string(),
            countdown: COUNTDOWN,
        }
    );
    assert!(matches!(
        &announced[4],
        Announcement::SaleFailed { player: UserId(1), team, amount: 100_000_000, .. }
            if team == "Alpha"
    ));
    assert_eq!(announced[5], opened(1));
    assert!(notifier.texts()[4].starts_with("**Sale failed** <@1> to Alpha"));

    assert_eq!(ledger.team_budget("Alpha").unwrap(), Some(45_000_000));
    assert_eq!(status(ledger.as_ref(), 1), PlayerStatus::Unsold);
    let snapshot = engine.snapshot().await.unwrap();
    assert_eq!(snapshot.current_item, Some(UserId(1)));
    assert_eq!(snapshot.current_bid, 0);
}

#[tokio::test(start_paused = true)]
async fn failed_role_grant_does_not_undo_the_sale() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1]);
    let (engine, notifier) = spawn(ledger.clone());
    notifier.fail_grants(true);
    engine.start(CHANNEL).await.unwrap();
    engine.submit_bid(bid(BETA_CAPTAIN, "Beta", 2_000_000)).await.unwrap();

    expire().await;

    assert!(notifier.grants().is_empty());
    assert_eq!(
        status(ledger.as_ref(), 1),
        PlayerStatus::Assigned("Beta".to_string())
    );
    assert_eq!(notifier.announcements().last(), Some(&Announcement::Finished));
}

#[tokio::test(start_paused = true)]
async fn stop_cancels_the_countdown() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1]);
    let (engine, notifier) = spawn(ledger.clone());
    engine.start(CHANNEL).await.unwrap();
    engine.submit_bid(bid(ALPHA_CAPTAIN, "Alpha", 1_000_000)).await.unwrap();

    engine.stop().await.unwrap();
    sleep(COUNTDOWN * 3).await;

    let snapshot = engine.snapshot().await.unwrap();
    assert!(!snapshot.active);
    assert!(!snapshot.timer_armed);
    assert_eq!(status(ledger.as_ref(), 1), PlayerStatus::Unsold);
    assert!(matches!(
        notifier.announcements().last(),
        Some(Announcement::BidAccepted { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn engine_can_run_again_after_finishing() {
    let ledger = Arc::new(MemoryLedger::new());
    roster(ledger.as_ref(), &[1]);
    let (engine, _notifier) = spawn(ledger.clone());

    engine.start(CHANNEL).await.unwrap();
    engine.submit_bid(bid(ALPHA_CAPTAIN, "Alpha", 1_000_000)).await.unwrap();
    expire().await;
    assert!(!engine.snapshot().await.unwrap().active);

    engine.start(CHANNEL).await.unwrap();
    let snapshot = engine.snapshot().await.unwrap();
    assert!(snapshot.active);
    assert_eq!(snapshot.current_item, Some(UserId(1)));
    assert_eq!(ledger.team_budget("Alpha").unwrap(), Some(START_BUDGET));
}

#[tokio::test(start_paused = true)]
async fn sqlite_ledger_records_the_sale() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stats.db");
    {
        let ledger = Arc::new(SqliteLedger::open(&path).unwrap());
        roster(ledger.as_ref(), &[1, 2]);
        let (engine, _notifier) = spawn(ledger.clone());
        engine.start(CHANNEL).await.unwrap();

        engine.submit_bid(bid(ALPHA_CAPTAIN, "Alpha", 10_000_000)).await.unwrap();
        engine.submit_bid(bid(BETA_CAPTAIN, "Beta", 15_000_000)).await.unwrap();
        expire().await;
        expire().await;

        assert!(!engine.snapshot().await.unwrap().active);
        engine.shutdown().await.unwrap();
    }

    let reopened = SqliteLedger::open(&path).unwrap();
    assert_eq!(reopened.team_budget("Beta").unwrap(), Some(130_000_000));
    assert_eq!(
        status(&reopened, 1),
        PlayerStatus::Assigned("Beta".to_string())
    );
    assert_eq!(status(&reopened, 2), PlayerStatus::Skipped);
    assert_eq!(reopened.next_unassigned_player().unwrap(), None);
}
