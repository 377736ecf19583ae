use rusqlite::{Connection, ToSql};

use crate::db::Database;
use crate::error::{JournalError, JournalResult};
use crate::models::{Language, Settings, UpdateSettingsInput};

pub(crate) fn read_settings(conn: &Connection) -> JournalResult<Settings> {
    let settings = conn.query_row(
        "SELECT id, user_name, language, currency, pattern_lookback, recent_symbols_limit, created_at, updated_at FROM settings WHERE id = 1",
        [],
        |row| {
            let language: String = row.get(2)?;
            Ok(Settings {
                id: row.get(0)?,
                user_name: row.get(1)?,
                language: Language::parse(&language).unwrap_or_else(|| {
                    log::warn!("Unknown language '{}' in settings, using english", language);
                    Language::English
                }),
                currency: row.get(3)?,
                pattern_lookback: row.get(4)?,
                recent_symbols_limit: row.get(5)?,
                created_at: row.get(6)?,
                updated_at: row.get(7)?,
            })
        },
    )?;

    Ok(settings)
}

pub fn get_settings(db: &Database) -> JournalResult<Settings> {
    let conn = db.lock()?;
    read_settings(&conn)
}

/// Apply the fields that are set; everything else keeps its stored value.
pub fn update_settings(db: &Database, settings: UpdateSettingsInput) -> JournalResult<Settings> {
    let conn = db.lock()?;

    let mut updates = Vec::new();
    let mut values: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(val) = settings.user_name {
        updates.push("user_name = ?");
        values.push(Box::new(val));
    }
    if let Some(val) = settings.language {
        updates.push("language = ?");
        values.push(Box::new(val.as_str()));
    }
    if let Some(val) = settings.currency {
        updates.push("currency = ?");
        values.push(Box::new(val));
    }
    if let Some(val) = settings.pattern_lookback {
        if val < 1 {
            return Err(JournalError::Validation(format!("pattern lookback must be positive, got {}", val)));
        }
        updates.push("pattern_lookback = ?");
        values.push(Box::new(val));
    }
    if let Some(val) = settings.recent_symbols_limit {
        if val < 1 {
            return Err(JournalError::Validation(format!(
                "recent symbols limit must be positive, got {}",
                val
            )));
        }
        updates.push("recent_symbols_limit = ?");
        values.push(Box::new(val));
    }

    updates.push("updated_at = strftime('%s', 'now')");

    let query = format!("UPDATE settings SET {} WHERE id = 1", updates.join(", "));
    let params: Vec<&dyn ToSql> = values.iter().map(|v| v.as_ref()).collect();
    conn.execute(&query, params.as_slice())?;

    read_settings(&conn)
}
