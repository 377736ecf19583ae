use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use crate::error::{JournalError, JournalResult};

/// Backups older than the newest this many are pruned.
const BACKUPS_TO_KEEP: usize = 5;

#[derive(Debug, Clone)]
pub struct Migration {
    pub version: u32,
    pub name: &'static str,
    pub sql: &'static str,
}

impl Migration {
    pub fn new(version: u32, name: &'static str, sql: &'static str) -> Self {
        Self { version, name, sql }
    }

    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.sql.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

pub struct MigrationRunner {
    migrations: Vec<Migration>,
}

impl Default for MigrationRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl MigrationRunner {
    pub fn new() -> Self {
        Self {
            migrations: vec![
                Migration::new(0, "bootstrap", include_str!("migrations/000_bootstrap.sql")),
                Migration::new(
                    1,
                    "initial_schema",
                    include_str!("migrations/001_initial_schema.sql"),
                ),
                Migration::new(
                    2,
                    "add_strategy_compliance",
                    include_str!("migrations/002_add_strategy_compliance.sql"),
                ),
                Migration::new(3, "add_settings", include_str!("migrations/003_add_settings.sql")),
            ],
        }
    }

    /// Apply every migration newer than the recorded schema version.
    ///
    /// Journals created before migrations were tracked are bootstrapped first:
    /// their version is inferred from the columns present. Returns the number
    /// of migrations applied.
    pub fn run_pending_migrations(&self, conn: &Connection, db_path: &str) -> JournalResult<usize> {
        if !self.has_table(conn, "schema_migrations")? {
            log::info!("No migration history found - bootstrapping migration system");
            self.bootstrap_untracked_schema(conn)?;
        }

        let current_version = self.get_current_version(conn)?;
        let pending: Vec<&Migration> = self
            .migrations
            .iter()
            .filter(|m| current_version.is_none_or(|v| m.version > v))
            .collect();

        let Some(target) = pending.last() else {
            return Ok(0);
        };
        log::info!(
            "Found {} pending migrations (v{:?} -> v{})",
            pending.len(),
            current_version,
            target.version
        );

        let backup_path = if is_in_memory(db_path) {
            None
        } else {
            Some(self.create_backup(db_path, target.version)?)
        };

        let mut applied = 0;
        for migration in pending {
            if let Err(e) = self.apply_migration(conn, migration) {
                log::error!("Migration {} ({}) failed: {}", migration.version, migration.name, e);
                if let Some(path) = &backup_path {
                    log::error!("Backup available at: {}", path.display());
                }
                return Err(e);
            }
            applied += 1;
        }

        Ok(applied)
    }

    fn apply_migration(&self, conn: &Connection, migration: &Migration) -> JournalResult<()> {
        let start = Instant::now();

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql)?;

        let execution_time = start.elapsed().as_millis() as i64;
        tx.execute(
            "INSERT INTO schema_migrations (version, name, applied_at, checksum, execution_time_ms, notes)
             VALUES (?, ?, ?, ?, ?, NULL)",
            params![
                migration.version,
                migration.name,
                Utc::now().timestamp(),
                migration.checksum(),
                execution_time
            ],
        )?;
        tx.commit()?;

        log::info!(
            "Applied migration {}: {} in {}ms",
            migration.version,
            migration.name,
            execution_time
        );
        Ok(())
    }

    /// Fail if an applied migration's SQL changed after it ran.
    pub fn verify_migrations(&self, conn: &Connection) -> JournalResult<()> {
        let mut stmt = conn.prepare(
            "SELECT version, name, checksum FROM schema_migrations WHERE checksum IS NOT NULL ORDER BY version",
        )?;
        let applied = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, u32>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (version, name, stored) in applied {
            let Some(migration) = self.migrations.iter().find(|m| m.version == version) else {
                continue;
            };
            if stored != migration.checksum() {
                log::error!("Checksum mismatch for migration {} ({})", version, name);
                return Err(JournalError::Migration(format!(
                    "migration {} ({}) was modified after it was applied",
                    version, name
                )));
            }
        }

        Ok(())
    }

    pub fn get_current_version(&self, conn: &Connection) -> JournalResult<Option<u32>> {
        if !self.has_table(conn, "schema_migrations")? {
            return Ok(None);
        }

        let version = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get::<_, Option<u32>>(0)
            })
            .optional()?
            .flatten();
        Ok(version)
    }

    fn create_backup(&self, db_path: &str, target_version: u32) -> JournalResult<PathBuf> {
        let backup_dir = Path::new(db_path)
            .parent()
            .map(|dir| dir.join("backups"))
            .ok_or_else(|| JournalError::Migration(format!("no parent directory for {}", db_path)))?;
        fs::create_dir_all(&backup_dir)?;

        let backup_path = backup_dir.join(format!(
            "pre_migration_v{}_{}.db",
            target_version,
            Utc::now().timestamp()
        ));

        let src = Connection::open(db_path)?;
        let mut dst = Connection::open(&backup_path)?;
        {
            let backup = rusqlite::backup::Backup::new(&src, &mut dst)?;
            backup.run_to_completion(5, Duration::from_millis(250), None)?;
        }

        let integrity: String = dst.pragma_query_value(None, "integrity_check", |row| row.get(0))?;
        if integrity != "ok" {
            return Err(JournalError::Migration(format!(
                "backup integrity check failed: {}",
                integrity
            )));
        }

        log::info!("Backup created: {}", backup_path.display());
        self.cleanup_old_backups(&backup_dir);

        Ok(backup_path)
    }

    fn cleanup_old_backups(&self, backup_dir: &Path) {
        let entries = match fs::read_dir(backup_dir) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Failed to read backup directory: {}", e);
                return;
            }
        };

        let mut backups: Vec<_> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .is_some_and(|name| name.starts_with("pre_migration_") && name.ends_with(".db"))
            })
            .collect();

        backups.sort_by_key(|entry| {
            entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH)
        });

        let excess = backups.len().saturating_sub(BACKUPS_TO_KEEP);
        for entry in backups.iter().take(excess) {
            if let Err(e) = fs::remove_file(entry.path()) {
                log::warn!("Failed to delete old backup: {}", e);
            }
        }
    }

    fn has_table(&self, conn: &Connection, table: &str) -> JournalResult<bool> {
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
            [table],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn column_exists(&self, conn: &Connection, table: &str, column: &str) -> JournalResult<bool> {
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM pragma_table_info(?) WHERE name=?",
            params![table, column],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn bootstrap_untracked_schema(&self, conn: &Connection) -> JournalResult<()> {
        let detected = self.detect_untracked_version(conn)?;
        if detected > 0 {
            log::info!("Detected untracked schema at version {}", detected);
        }

        self.apply_migration(conn, &self.migrations[0])?;

        let now = Utc::now().timestamp();
        for migration in self.migrations.iter().skip(1).take(detected as usize) {
            conn.execute(
                "INSERT INTO schema_migrations (version, name, applied_at, checksum, execution_time_ms, notes)
                 VALUES (?, ?, ?, NULL, 0, 'Detected via schema introspection')",
                params![migration.version, migration.name, now],
            )?;
            log::info!("Marked migration {} as already applied", migration.name);
        }

        if detected > 0 {
            let normalised = conn.execute(
                "UPDATE trades SET trade_date = replace(trade_date, ' ', 'T')
                 WHERE trade_date GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9] [0-9]*'",
                [],
            )?;
            if normalised > 0 {
                log::info!("Normalised {} legacy trade dates", normalised);
            }
        }

        let integrity: String = conn.pragma_query_value(None, "integrity_check", |row| row.get(0))?;
        if integrity != "ok" {
            return Err(JournalError::Migration(format!(
                "schema integrity check failed: {}",
                integrity
            )));
        }

        Ok(())
    }

    /// Infer the schema version of a journal that predates migration tracking.
    fn detect_untracked_version(&self, conn: &Connection) -> JournalResult<u32> {
        if self.has_table(conn, "settings")? {
            return Ok(3);
        }
        if self.column_exists(conn, "trades", "strategy_compliance_rate")? {
            return Ok(2);
        }
        if self.has_table(conn, "trades")? {
            return Ok(1);
        }
        Ok(0)
    }
}

fn is_in_memory(db_path: &str) -> bool {
    db_path == ":memory:" || db_path.is_empty()
}
