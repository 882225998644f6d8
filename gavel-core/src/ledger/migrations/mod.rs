//! Schema migrations for the SQLite ledger

use rusqlite::Connection;

use crate::ledger::LedgerError;

/// SQL for each schema version, applied in order
const MIGRATIONS: &[(&str, &str)] = &[
    ("v001_initial", include_str!("v001_initial.sql")),
    (
        "v002_shorthandle_unique",
        include_str!("v002_shorthandle_unique.sql"),
    ),
];

/// Brings a connection's schema up to the latest version
pub struct Migrator<'a> {
    conn: &'a Connection,
}

impl<'a> Migrator<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Schema version recorded in `PRAGMA user_version`
    pub fn current_version(&self) -> Result<i32, LedgerError> {
        let version: i32 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;
        Ok(version)
    }

    fn set_version(&self, version: i32) -> Result<(), LedgerError> {
        self.conn.pragma_update(None, "user_version", version)?;
        Ok(())
    }

    /// Apply every migration newer than the recorded version
    pub fn migrate(&self) -> Result<(), LedgerError> {
        let current = self.current_version()?;
        let target = self.target_version();
        if current >= target {
            tracing::debug!(current, "Ledger schema up to date");
            return Ok(());
        }

        for (idx, (name, sql)) in MIGRATIONS.iter().enumerate() {
            let version = (idx + 1) as i32;
            if version > current {
                tracing::info!(version, name, "Applying ledger migration");
                self.conn
                    .execute_batch(sql)
                    .map_err(|e| LedgerError::Migration(format!("{}: {}", name, e)))?;
                self.set_version(version)?;
            }
        }

        Ok(())
    }

    /// Version the schema reaches once every migration has run
    pub fn target_version(&self) -> i32 {
        MIGRATIONS.len() as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_fresh_database() {
        let conn = Connection::open_in_memory().unwrap();
        let migrator = Migrator::new(&conn);

        assert_eq!(migrator.current_version().unwrap(), 0);
        migrator.migrate().unwrap();
        assert_eq!(
            migrator.current_version().unwrap(),
            migrator.target_version()
        );
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        let migrator = Migrator::new(&conn);

        migrator.migrate().unwrap();
        migrator.migrate().unwrap();
        assert_eq!(
            migrator.current_version().unwrap(),
            migrator.target_version()
        );
    }

    #[test]
    fn test_newer_schema_is_left_alone() {
        let conn = Connection::open_in_memory().unwrap();
        let migrator = Migrator::new(&conn);
        let newer = migrator.target_version() + 1;
        migrator.set_version(newer).unwrap();

        migrator.migrate().unwrap();

        assert_eq!(migrator.current_version().unwrap(), newer);
        let tables: i64 = conn
            .query_row("SELECT count(*) FROM sqlite_master WHERE type = 'table'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(tables, 0);
    }

    #[test]
    fn test_tables_exist_after_migration() {
        let conn = Connection::open_in_memory().unwrap();
        Migrator::new(&conn).migrate().unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name IN ('teams', 'players')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);
    }
}
