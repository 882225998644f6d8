//! Ledger trait: the durable record of teams, players and budgets

use super::LedgerError;
use crate::types::{Amount, Player, RoleId, Team, UserId};

/// Team name stored for players nobody bid on
pub const SKIP_SENTINEL: &str = "__No_Bids__";

/// Durable store of teams and players
///
/// Calls are blocking but bounded; the engine makes them from inside its
/// critical section. The engine is the only writer of auction outcomes.
pub trait Ledger: Send + Sync {
    /// Oldest enrolled player with no team. Skipped players count as assigned.
    fn next_unassigned_player(&self) -> Result<Option<UserId>, LedgerError>;

    /// Current budget, or `None` if the team does not exist
    fn team_budget(&self, team: &str) -> Result<Option<Amount>, LedgerError>;

    /// Role granted to players bought by `team`
    fn team_role(&self, team: &str) -> Result<Option<RoleId>, LedgerError>;

    /// Team that `member` may bid for, either as its captain or through its captain role
    fn captain_team(
        &self,
        member: UserId,
        roles: &[RoleId],
    ) -> Result<Option<String>, LedgerError>;

    fn assign_player(&self, player: UserId, team: &str) -> Result<(), LedgerError>;

    /// Subtract `amount` from the team's budget.
    ///
    /// Conditional: fails with [`LedgerError::InsufficientBudget`] and leaves
    /// the budget untouched if it would go negative.
    fn debit_team(&self, team: &str, amount: Amount) -> Result<(), LedgerError>;

    /// Withdraw a player nobody bid on
    fn mark_skipped(&self, player: UserId) -> Result<(), LedgerError>;

    /// Debit the team and assign the player as one commit.
    ///
    /// The default runs the debit first so a rejected debit never leaves a
    /// player assigned for free.
    fn settle_sale(&self, player: UserId, team: &str, amount: Amount) -> Result<(), LedgerError> {
        self.debit_team(team, amount)?;
        self.assign_player(player, team)
    }

    fn player_count(&self) -> Result<usize, LedgerError>;

    fn team_count(&self) -> Result<usize, LedgerError>;

    /// Return bought players to the pool. Captains and skipped players stay put.
    ///
    /// Returns the number of players moved.
    fn reset_pool(&self) -> Result<usize, LedgerError>;

    /// Set every team's budget to `budget`, returning the number of teams
    fn reset_budgets(&self, budget: Amount) -> Result<usize, LedgerError>;

    /// Add a player to the pool
    fn enroll_player(&self, player: UserId) -> Result<(), LedgerError>;

    /// Register a team. Its captain is enrolled (if needed) and assigned to it.
    fn create_team(&self, team: &Team) -> Result<(), LedgerError>;

    /// All teams, oldest first
    fn teams(&self) -> Result<Vec<Team>, LedgerError>;

    /// All players in enrollment order
    fn players(&self) -> Result<Vec<Player>, LedgerError>;
}
