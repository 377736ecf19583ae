use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::commands::settings::read_settings;
use crate::db::{CorruptRecord, Database, ImportSummary, RecordStore};
use crate::error::{JournalError, JournalResult};
use crate::models::{Settings, Strategy, Trade};

pub const BACKUP_VERSION: &str = "1.1.0";

#[derive(Debug, Serialize, Deserialize)]
pub struct BackupData {
    pub settings: Settings,
    #[serde(default)]
    pub strategies: Vec<Strategy>,
    pub trades: Vec<Trade>,
    pub export_date: String,
    pub version: String,
}

/// Export settings, strategies and trades to pretty-printed JSON.
pub fn export_all_data(db: &Database) -> JournalResult<String> {
    let settings = read_settings(&*db.lock()?)?;

    let backup = BackupData {
        settings,
        strategies: db.load_strategies()?,
        trades: db.load_trades()?,
        export_date: Utc::now().to_rfc3339(),
        version: BACKUP_VERSION.to_string(),
    };

    Ok(serde_json::to_string_pretty(&backup)?)
}

/// Merge a JSON backup into the journal.
///
/// Settings are overwritten. Strategies are matched by name and trades are
/// appended under fresh ids, skipping ones the journal already holds.
pub fn import_all_data(db: &Database, json_data: &str) -> JournalResult<ImportSummary> {
    let backup: BackupData = serde_json::from_str(json_data)?;

    if let Some(trade) = backup.trades.iter().find(|t| t.symbol.trim().is_empty()) {
        return Err(JournalError::Validation(format!("trade {} has no symbol", trade.id)));
    }

    let summary = db.import_backup(&backup.settings, &backup.strategies, &backup.trades)?;
    log::info!(
        "Imported backup v{}: {} new strategies, {} trades, {} duplicates skipped",
        backup.version,
        summary.strategies,
        summary.trades,
        summary.duplicates
    );

    Ok(summary)
}

#[derive(Debug, Serialize)]
struct TradeCsvRow<'a> {
    id: i64,
    trade_date: String,
    symbol: &'a str,
    side: &'static str,
    trade_type: &'static str,
    entry_price: f64,
    exit_price: f64,
    qty: f64,
    leverage: f64,
    risk: f64,
    profit_or_loss: f64,
    rr_calculated: f64,
    market_context: &'a str,
    psychological_tags: String,
    strategy: String,
    strategy_compliance_rate: Option<f64>,
}

/// Write every trade as CSV, newest first. Returns the number of rows.
pub fn export_trades_csv<W: Write>(db: &Database, out: W) -> JournalResult<usize> {
    let trades = db.load_trades()?;
    let strategies = db.load_strategies()?;

    let mut writer = csv::Writer::from_writer(out);
    for trade in &trades {
        let strategy = trade
            .strategy_id
            .map(|id| {
                strategies
                    .iter()
                    .find(|s| s.id == id)
                    .map(|s| s.name.clone())
                    .unwrap_or_else(|| id.to_string())
            })
            .unwrap_or_default();

        writer.serialize(TradeCsvRow {
            id: trade.id,
            trade_date: trade.trade_date.format("%Y-%m-%d %H:%M:%S").to_string(),
            symbol: &trade.symbol,
            side: trade.side.as_str(),
            trade_type: trade.trade_type.as_str(),
            entry_price: trade.entry_price,
            exit_price: trade.exit_price,
            qty: trade.qty,
            leverage: trade.leverage,
            risk: trade.risk,
            profit_or_loss: trade.profit_or_loss,
            rr_calculated: trade.rr_calculated,
            market_context: trade.market_context.as_deref().unwrap_or_default(),
            psychological_tags: trade.psychological_tags.join(", "),
            strategy,
            strategy_compliance_rate: trade.strategy_compliance_rate,
        })?;
    }
    writer.flush()?;

    Ok(trades.len())
}

pub fn find_corrupt_records(db: &Database) -> JournalResult<Vec<CorruptRecord>> {
    db.find_corrupt_records()
}
