pub mod analytics;
pub mod commands;
pub mod db;
pub mod error;
pub mod models;

use std::path::Path;

pub use analytics::{
    aggregate_strategy_performance, analyze_evolution, calculate_pnl_and_rr, detect_strategy_change,
    learn_pattern, recent_symbols, score_deviation,
};
pub use db::{CorruptRecord, Database, ImportSummary, RecordStore};
pub use error::{JournalError, JournalResult};

pub const DATABASE_FILE: &str = "trading_journal.db";

/// Open (creating if needed) the journal stored under `data_dir`.
pub fn open_journal(data_dir: &Path) -> JournalResult<Database> {
    std::fs::create_dir_all(data_dir)?;

    let db_path = data_dir.join(DATABASE_FILE);
    log::info!("Database path: {:?}", db_path);

    let path = db_path
        .to_str()
        .ok_or_else(|| JournalError::Validation(format!("database path is not UTF-8: {:?}", db_path)))?;

    Database::new(path).inspect_err(|e| {
        log::error!("Database initialization failed: {}", e);
        log::error!("This might be due to a failed migration or database corruption.");
        log::error!("Your database backups are located at: {:?}", data_dir.join("backups"));
        log::error!("Recovery steps:");
        log::error!("  1. Locate the most recent backup in the backups folder");
        log::error!("  2. Replace {} with the backup", DATABASE_FILE);
        log::error!("  3. Run again");
    })
}
