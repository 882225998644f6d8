//! SQLite-backed ledger

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, ErrorCode, OptionalExtension, params};

use super::migrations::Migrator;
use super::traits::{Ledger, SKIP_SENTINEL};
use super::LedgerError;
use crate::types::{Amount, Player, PlayerStatus, RoleId, Team, UserId};

/// Ledger stored in a SQLite database
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    /// Open or create the database at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, LedgerError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self, LedgerError> {
        Migrator::new(&conn).migrate()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn budget_of(conn: &Connection, team: &str) -> Result<Option<Amount>, LedgerError> {
        let budget: Option<i64> = conn
            .query_row(
                "SELECT budget FROM teams WHERE name = ?1",
                [team],
                |row| row.get(0),
            )
            .optional()?;
        budget.map(from_sql_amount).transpose()
    }

    /// Conditional debit shared by `debit_team` and `settle_sale`
    fn debit(conn: &Connection, team: &str, amount: Amount) -> Result<(), LedgerError> {
        let changed = conn.execute(
            "UPDATE teams SET budget = budget - ?2 WHERE name = ?1 AND budget >= ?2",
            params![team, to_sql_amount(amount)?],
        )?;
        if changed == 1 {
            return Ok(());
        }

        match Self::budget_of(conn, team)? {
            None => Err(LedgerError::UnknownTeam(team.to_string())),
            Some(budget) => Err(LedgerError::InsufficientBudget {
                team: team.to_string(),
                budget,
                amount,
            }),
        }
    }

    fn assign(conn: &Connection, player: UserId, team: &str) -> Result<(), LedgerError> {
        let changed = conn.execute(
            "UPDATE players SET team_name = ?2 WHERE user_id = ?1",
            params![player.to_string(), team],
        )?;
        if changed == 0 {
            return Err(LedgerError::UnknownPlayer(player.to_string()));
        }
        Ok(())
    }
}

impl Ledger for SqliteLedger {
    fn next_unassigned_player(&self) -> Result<Option<UserId>, LedgerError> {
        let conn = self.conn();
        let raw: Option<String> = conn
            .query_row(
                "SELECT user_id FROM players
                 WHERE team_name IS NULL OR team_name = ''
                 ORDER BY joined_at ASC, rowid ASC
                 LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        raw.as_deref().map(parse_id).transpose()
    }

    fn team_budget(&self, team: &str) -> Result<Option<Amount>, LedgerError> {
        Self::budget_of(&self.conn(), team)
    }

    fn team_role(&self, team: &str) -> Result<Option<RoleId>, LedgerError> {
        let conn = self.conn();
        let role: Option<Option<String>> = conn
            .query_row(
                "SELECT teamrole_id FROM teams WHERE name = ?1",
                [team],
                |row| row.get(0),
            )
            .optional()?;
        match role {
            None => Err(LedgerError::UnknownTeam(team.to_string())),
            Some(raw) => raw.as_deref().map(parse_id).transpose(),
        }
    }

    fn captain_team(
        &self,
        member: UserId,
        roles: &[RoleId],
    ) -> Result<Option<String>, LedgerError> {
        Ok(self
            .teams()?
            .into_iter()
            .find(|team| team.is_captained_by(member, roles))
            .map(|team| team.name))
    }

    fn assign_player(&self, player: UserId, team: &str) -> Result<(), LedgerError> {
        Self::assign(&self.conn(), player, team)
    }

    fn debit_team(&self, team: &str, amount: Amount) -> Result<(), LedgerError> {
        Self::debit(&self.conn(), team, amount)
    }

    fn mark_skipped(&self, player: UserId) -> Result<(), LedgerError> {
        Self::assign(&self.conn(), player, SKIP_SENTINEL)
    }

    fn settle_sale(&self, player: UserId, team: &str, amount: Amount) -> Result<(), LedgerError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        Self::debit(&tx, team, amount)?;
        Self::assign(&tx, player, team)?;
        tx.commit()?;
        Ok(())
    }

    fn player_count(&self) -> Result<usize, LedgerError> {
        let count: i64 = self
            .conn()
            .query_row("SELECT count(*) FROM players", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn team_count(&self) -> Result<usize, LedgerError> {
        let count: i64 = self
            .conn()
            .query_row("SELECT count(*) FROM teams", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn reset_pool(&self) -> Result<usize, LedgerError> {
        let changed = self.conn().execute(
            "UPDATE players SET team_name = NULL
             WHERE team_name IS NOT NULL
               AND team_name != ''
               AND team_name != ?1
               AND user_id NOT IN (SELECT captain_id FROM teams)",
            [SKIP_SENTINEL],
        )?;
        Ok(changed)
    }

    fn reset_budgets(&self, budget: Amount) -> Result<usize, LedgerError> {
        let changed = self
            .conn()
            .execute("UPDATE teams SET budget = ?1", [to_sql_amount(budget)?])?;
        Ok(changed)
    }

    fn enroll_player(&self, player: UserId) -> Result<(), LedgerError> {
        self.conn()
            .execute(
                "INSERT INTO players (user_id, team_name) VALUES (?1, NULL)",
                [player.to_string()],
            )
            .map_err(|e| match constraint_violation(e) {
                Ok(()) => LedgerError::DuplicatePlayer(player.to_string()),
                Err(e) => e.into(),
            })?;
        Ok(())
    }

    fn create_team(&self, team: &Team) -> Result<(), LedgerError> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO teams (name, shorthandle, budget, captain_id, teamrole_id, captainrole_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                team.name,
                team.shorthandle,
                to_sql_amount(team.budget)?,
                team.captain.to_string(),
                team.team_role.map(|r| r.to_string()),
                team.captain_role.map(|r| r.to_string()),
            ],
        )
        .map_err(|e| match constraint_violation(e) {
            Ok(()) => LedgerError::DuplicateTeam(team.name.clone()),
            Err(e) => e.into(),
        })?;
        tx.execute(
            "INSERT INTO players (user_id, team_name) VALUES (?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET team_name = excluded.team_name",
            params![team.captain.to_string(), team.name],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn teams(&self) -> Result<Vec<Team>, LedgerError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT name, shorthandle, budget, captain_id, teamrole_id, captainrole_id
             FROM teams ORDER BY created_at ASC, rowid ASC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(name, shorthandle, budget, captain, team_role, captain_role)| {
                Ok(Team {
                    name,
                    shorthandle,
                    budget: from_sql_amount(budget)?,
                    captain: parse_id(&captain)?,
                    team_role: team_role.as_deref().map(parse_id).transpose()?,
                    captain_role: captain_role.as_deref().map(parse_id).transpose()?,
                })
            })
            .collect()
    }

    fn players(&self) -> Result<Vec<Player>, LedgerError> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT user_id, team_name FROM players ORDER BY joined_at ASC, rowid ASC")?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, team)| {
                let status = match team.as_deref() {
                    None | Some("") => PlayerStatus::Unsold,
                    Some(SKIP_SENTINEL) => PlayerStatus::Skipped,
                    Some(name) => PlayerStatus::Assigned(name.to_string()),
                };
                Ok(Player {
                    id: parse_id(&id)?,
                    status,
                })
            })
            .collect()
    }
}

fn parse_id<T: From<u64>>(raw: &str) -> Result<T, LedgerError> {
    raw.parse::<u64>()
        .map(T::from)
        .map_err(|_| LedgerError::Corrupt(format!("invalid id '{}'", raw)))
}

fn to_sql_amount(amount: Amount) -> Result<i64, LedgerError> {
    i64::try_from(amount).map_err(|_| LedgerError::Corrupt(format!("amount {} too large", amount)))
}

fn from_sql_amount(raw: i64) -> Result<Amount, LedgerError> {
    Amount::try_from(raw).map_err(|_| LedgerError::Corrupt(format!("negative amount {}", raw)))
}

/// `Ok(())` if the error is a constraint violation, otherwise hands it back
fn constraint_violation(err: rusqlite::Error) -> Result<(), rusqlite::Error> {
    match &err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => Ok(()),
        _ => Err(err),
    }
}
