use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

use crate::db::migration_runner::MigrationRunner;
use crate::error::JournalResult;

pub struct Database {
    pub conn: Mutex<Connection>,
}

impl Database {
    pub fn new(db_path: &str) -> JournalResult<Self> {
        let conn = Connection::open(db_path)?;

        conn.execute("PRAGMA foreign_keys = ON", [])?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Self::migrate(conn, db_path)
    }

    /// Fresh, fully migrated journal that lives only as long as the handle.
    pub fn open_in_memory() -> JournalResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute("PRAGMA foreign_keys = ON", [])?;
        Self::migrate(conn, ":memory:")
    }

    fn migrate(conn: Connection, db_path: &str) -> JournalResult<Self> {
        let runner = MigrationRunner::new();

        log::info!("=== Starting database migration check ===");
        log::info!("Current schema version: {:?}", runner.get_current_version(&conn)?);

        let applied = runner.run_pending_migrations(&conn, db_path)?;
        if applied > 0 {
            log::info!("Applied {} migrations successfully", applied);
        } else {
            log::info!("Database schema is up to date");
        }

        runner.verify_migrations(&conn)?;

        if let Some(version) = runner.get_current_version(&conn)? {
            log::info!("Final schema version: {}", version);
        }

        Ok(Database {
            conn: Mutex::new(conn),
        })
    }

    pub(crate) fn lock(&self) -> JournalResult<MutexGuard<'_, Connection>> {
        Ok(self.conn.lock()?)
    }
}
