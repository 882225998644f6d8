//! In-memory ledger for tests and dry runs

use std::sync::{Mutex, MutexGuard};

use super::traits::Ledger;
use super::LedgerError;
use crate::types::{Amount, Player, PlayerStatus, RoleId, Team, UserId};

#[derive(Default)]
struct Roster {
    /// Teams in creation order
    teams: Vec<Team>,
    /// Players in enrollment order
    players: Vec<Player>,
}

impl Roster {
    fn team_mut(&mut self, name: &str) -> Result<&mut Team, LedgerError> {
        self.teams
            .iter_mut()
            .find(|t| t.name == name)
            .ok_or_else(|| LedgerError::UnknownTeam(name.to_string()))
    }

    fn player_mut(&mut self, id: UserId) -> Result<&mut Player, LedgerError> {
        self.players
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| LedgerError::UnknownPlayer(id.to_string()))
    }

    fn debit(&mut self, team: &str, amount: Amount) -> Result<(), LedgerError> {
        let team = self.team_mut(team)?;
        match team.budget.checked_sub(amount) {
            Some(rest) => {
                team.budget = rest;
                Ok(())
            }
            None => Err(LedgerError::InsufficientBudget {
                team: team.name.clone(),
                budget: team.budget,
                amount,
            }),
        }
    }
}

/// Ledger that lives entirely in process memory
#[derive(Default)]
pub struct MemoryLedger {
    roster: Mutex<Roster>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn roster(&self) -> MutexGuard<'_, Roster> {
        self.roster
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Ledger for MemoryLedger {
    fn next_unassigned_player(&self) -> Result<Option<UserId>, LedgerError> {
        Ok(self
            .roster()
            .players
            .iter()
            .find(|p| p.status == PlayerStatus::Unsold)
            .map(|p| p.id))
    }

    fn team_budget(&self, team: &str) -> Result<Option<Amount>, LedgerError> {
        Ok(self
            .roster()
            .teams
            .iter()
            .find(|t| t.name == team)
            .map(|t| t.budget))
    }

    fn team_role(&self, team: &str) -> Result<Option<RoleId>, LedgerError> {
        Ok(self.roster().team_mut(team)?.team_role)
    }

    fn captain_team(
        &self,
        member: UserId,
        roles: &[RoleId],
    ) -> Result<Option<String>, LedgerError> {
        Ok(self
            .roster()
            .teams
            .iter()
            .find(|t| t.is_captained_by(member, roles))
            .map(|t| t.name.clone()))
    }

    fn assign_player(&self, player: UserId, team: &str) -> Result<(), LedgerError> {
        self.roster().player_mut(player)?.status = PlayerStatus::Assigned(team.to_string());
        Ok(())
    }

    fn debit_team(&self, team: &str, amount: Amount) -> Result<(), LedgerError> {
        self.roster().debit(team, amount)
    }

    fn mark_skipped(&self, player: UserId) -> Result<(), LedgerError> {
        self.roster().player_mut(player)?.status = PlayerStatus::Skipped;
        Ok(())
    }

    fn settle_sale(&self, player: UserId, team: &str, amount: Amount) -> Result<(), LedgerError> {
        let mut roster = self.roster();
        // validate the player before touching the budget
        roster.player_mut(player)?;
        roster.debit(team, amount)?;
        roster.player_mut(player)?.status = PlayerStatus::Assigned(team.to_string());
        Ok(())
    }

    fn player_count(&self) -> Result<usize, LedgerError> {
        Ok(self.roster().players.len())
    }

    fn team_count(&self) -> Result<usize, LedgerError> {
        Ok(self.roster().teams.len())
    }

    fn reset_pool(&self) -> Result<usize, LedgerError> {
        let mut roster = self.roster();
        let captains: Vec<UserId> = roster.teams.iter().map(|t| t.captain).collect();
        let mut moved = 0;
        for player in roster.players.iter_mut() {
            if matches!(player.status, PlayerStatus::Assigned(_)) && !captains.contains(&player.id)
            {
                player.status = PlayerStatus::Unsold;
                moved += 1;
            }
        }
        Ok(moved)
    }

    fn reset_budgets(&self, budget: Amount) -> Result<usize, LedgerError> {
        let mut roster = self.roster();
        for team in roster.teams.iter_mut() {
            team.budget = budget;
        }
        Ok(roster.teams.len())
    }

    fn enroll_player(&self, player: UserId) -> Result<(), LedgerError> {
        let mut roster = self.roster();
        if roster.players.iter().any(|p| p.id == player) {
            return Err(LedgerError::DuplicatePlayer(player.to_string()));
        }
        roster.players.push(Player {
            id: player,
            status: PlayerStatus::Unsold,
        });
        Ok(())
    }

    fn create_team(&self, team: &Team) -> Result<(), LedgerError> {
        let mut roster = self.roster();
        if roster.teams.iter().any(|t| t.name == team.name) {
            return Err(LedgerError::DuplicateTeam(team.name.clone()));
        }
        roster.teams.push(team.clone());

        let status = PlayerStatus::Assigned(team.name.clone());
        match roster.players.iter_mut().find(|p| p.id == team.captain) {
            Some(captain) => captain.status = status,
            None => roster.players.push(Player {
                id: team.captain,
                status,
            }),
        }
        Ok(())
    }

    fn teams(&self) -> Result<Vec<Team>, LedgerError> {
        Ok(self.roster().teams.clone())
    }

    fn players(&self) -> Result<Vec<Player>, LedgerError> {
        Ok(self.roster().players.clone())
    }
}
