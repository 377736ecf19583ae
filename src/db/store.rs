use chrono::{DateTime, NaiveDateTime};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, ToSql};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::db::json_fields::{decode_list, decode_list_or_empty, encode_list};
use crate::db::Database;
use crate::error::{JournalError, JournalResult};
use crate::models::{
    Rule, Settings, Side, Strategy, Trade, TradeFilters, TradeType, TRADE_DATE_FORMAT,
};

/// Persistence boundary the analytics are fed from.
pub trait RecordStore {
    /// All trades, newest `trade_date` first.
    fn load_trades(&self) -> JournalResult<Vec<Trade>>;

    /// All strategies, ordered by name.
    fn load_strategies(&self) -> JournalResult<Vec<Strategy>>;

    /// Insert a trade. `trade.id` is ignored; the assigned id is returned.
    fn save_trade(&self, trade: &Trade) -> JournalResult<i64>;

    /// Insert a strategy. `Ok(false)` when the name is already taken.
    fn save_strategy(&self, strategy: &Strategy) -> JournalResult<bool>;
}

/// A stored row whose contents could not be read back as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorruptRecord {
    pub entity: String,
    pub id: i64,
    pub field: String,
    pub raw: Option<String>,
    pub reason: String,
}

/// Outcome of merging a backup into a journal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Strategies created; names already in the journal are reused
    pub strategies: usize,
    pub trades: usize,
    /// Trades skipped because the journal already holds them
    pub duplicates: usize,
}

const TRADE_COLUMNS: &str = "id, symbol, entry_price, exit_price, side, qty, risk, trade_type, leverage,
    psychological_tags, market_context, strategy_id, profit_or_loss, rr_calculated, trade_date,
    strategy_compliance_rate, strategy_missing_rules";

const STRATEGY_COLUMNS: &str = "id, name, description, entry_rules, exit_rules, created_at";

/// Trade row as stored, before enum and timestamp parsing.
struct TradeRow {
    id: i64,
    symbol: String,
    entry_price: f64,
    exit_price: f64,
    side: String,
    qty: f64,
    risk: f64,
    trade_type: String,
    leverage: f64,
    psychological_tags: Option<String>,
    market_context: Option<String>,
    strategy_id: Option<i64>,
    profit_or_loss: f64,
    rr_calculated: f64,
    trade_date: String,
    strategy_compliance_rate: Option<f64>,
    strategy_missing_rules: Option<String>,
}

fn read_trade_row(row: &Row) -> rusqlite::Result<TradeRow> {
    Ok(TradeRow {
        id: row.get("id")?,
        symbol: row.get::<_, Option<String>>("symbol")?.unwrap_or_default(),
        entry_price: row.get::<_, Option<f64>>("entry_price")?.unwrap_or(0.0),
        exit_price: row.get::<_, Option<f64>>("exit_price")?.unwrap_or(0.0),
        side: row.get::<_, Option<String>>("side")?.unwrap_or_default(),
        qty: row.get::<_, Option<f64>>("qty")?.unwrap_or(0.0),
        risk: row.get::<_, Option<f64>>("risk")?.unwrap_or(0.0),
        trade_type: row.get::<_, Option<String>>("trade_type")?.unwrap_or_default(),
        leverage: row.get::<_, Option<f64>>("leverage")?.unwrap_or(1.0),
        psychological_tags: row.get("psychological_tags")?,
        market_context: row.get("market_context")?,
        strategy_id: row.get("strategy_id")?,
        profit_or_loss: row.get::<_, Option<f64>>("profit_or_loss")?.unwrap_or(0.0),
        rr_calculated: row.get::<_, Option<f64>>("rr_calculated")?.unwrap_or(0.0),
        trade_date: row.get::<_, Option<String>>("trade_date")?.unwrap_or_default(),
        strategy_compliance_rate: row.get("strategy_compliance_rate")?,
        strategy_missing_rules: row.get("strategy_missing_rules")?,
    })
}

impl TradeRow {
    fn corrupt(&self, field: &str, raw: Option<&str>, reason: impl Into<String>) -> CorruptRecord {
        CorruptRecord {
            entity: "trade".to_string(),
            id: self.id,
            field: field.to_string(),
            raw: raw.map(str::to_string),
            reason: reason.into(),
        }
    }

    /// Problems that make the row unusable, or lose data when it is loaded.
    fn problems(&self) -> Vec<CorruptRecord> {
        let mut problems = Vec::new();
        if Side::parse(&self.side).is_none() {
            problems.push(self.corrupt("side", Some(&self.side), "unknown side"));
        }
        if TradeType::parse(&self.trade_type).is_none() {
            problems.push(self.corrupt("trade_type", Some(&self.trade_type), "unknown trade type"));
        }
        if parse_timestamp(&self.trade_date).is_none() {
            problems.push(self.corrupt("trade_date", Some(&self.trade_date), "unparseable timestamp"));
        }
        for (field, raw) in [
            ("psychological_tags", self.psychological_tags.as_deref()),
            ("strategy_missing_rules", self.strategy_missing_rules.as_deref()),
        ] {
            if let Err(e) = decode_list::<String>(raw) {
                problems.push(self.corrupt(field, raw, e.to_string()));
            }
        }
        problems
    }

    fn into_trade(self) -> Option<Trade> {
        let side = Side::parse(&self.side)?;
        let trade_type = TradeType::parse(&self.trade_type)?;
        let trade_date = parse_timestamp(&self.trade_date)?;

        Some(Trade {
            psychological_tags: decode_list_or_empty(
                self.psychological_tags.as_deref(),
                "trade",
                self.id,
                "psychological_tags",
            ),
            strategy_missing_rules: decode_list_or_empty(
                self.strategy_missing_rules.as_deref(),
                "trade",
                self.id,
                "strategy_missing_rules",
            ),
            id: self.id,
            symbol: self.symbol,
            entry_price: self.entry_price,
            exit_price: self.exit_price,
            qty: self.qty,
            risk: self.risk,
            side,
            trade_type,
            leverage: self.leverage,
            market_context: self.market_context,
            strategy_id: self.strategy_id,
            profit_or_loss: self.profit_or_loss,
            rr_calculated: self.rr_calculated,
            trade_date,
            strategy_compliance_rate: self.strategy_compliance_rate,
        })
    }
}

/// Rows that cannot become a `Trade` are skipped with a warning.
fn rows_to_trades(rows: Vec<TradeRow>) -> Vec<Trade> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            let trade = row.into_trade();
            if trade.is_none() {
                log::warn!("Skipping unreadable trade {}", id);
            }
            trade
        })
        .collect()
}

struct StrategyRow {
    id: i64,
    name: String,
    description: Option<String>,
    entry_rules: Option<String>,
    exit_rules: Option<String>,
    created_at: Option<String>,
}

fn read_strategy_row(row: &Row) -> rusqlite::Result<StrategyRow> {
    Ok(StrategyRow {
        id: row.get("id")?,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        description: row.get("description")?,
        entry_rules: row.get("entry_rules")?,
        exit_rules: row.get("exit_rules")?,
        created_at: row.get("created_at")?,
    })
}

impl StrategyRow {
    fn into_strategy(self) -> Strategy {
        let created_at = self
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or_else(|| {
                log::warn!("Strategy {} has no readable created_at", self.id);
                NaiveDateTime::default()
            });

        Strategy {
            entry_rules: decode_list_or_empty(self.entry_rules.as_deref(), "strategy", self.id, "entry_rules"),
            exit_rules: decode_list_or_empty(self.exit_rules.as_deref(), "strategy", self.id, "exit_rules"),
            id: self.id,
            name: self.name,
            description: self.description.unwrap_or_default(),
            created_at,
        }
    }

    fn problems(&self) -> Vec<CorruptRecord> {
        [
            ("entry_rules", self.entry_rules.as_deref()),
            ("exit_rules", self.exit_rules.as_deref()),
        ]
        .into_iter()
        .filter_map(|(field, raw)| {
            decode_list::<Rule>(raw).err().map(|e| CorruptRecord {
                entity: "strategy".to_string(),
                id: self.id,
                field: field.to_string(),
                raw: raw.map(str::to_string),
                reason: e.to_string(),
            })
        })
        .collect()
    }
}

/// Accepts the stored format, a space separator, or RFC 3339 with an offset
/// (kept as the local wall-clock time it names).
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, TRADE_DATE_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TRADE_DATE_FORMAT).to_string()
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(err, rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation)
}

fn insert_trade(conn: &Connection, trade: &Trade) -> JournalResult<i64> {
    let tags = encode_list(&trade.psychological_tags)?;
    let missing = encode_list(&trade.strategy_missing_rules)?;

    conn.execute(
        "INSERT INTO trades (
            symbol, entry_price, exit_price, side, qty, risk, trade_type, leverage,
            psychological_tags, market_context, strategy_id, profit_or_loss, rr_calculated,
            trade_date, strategy_compliance_rate, strategy_missing_rules
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            trade.symbol,
            trade.entry_price,
            trade.exit_price,
            trade.side.as_str(),
            trade.qty,
            trade.risk,
            trade.trade_type.as_str(),
            trade.leverage,
            tags,
            trade.market_context,
            trade.strategy_id,
            trade.profit_or_loss,
            trade.rr_calculated,
            format_timestamp(&trade.trade_date),
            trade.strategy_compliance_rate,
            missing,
        ],
    )?;

    Ok(conn.last_insert_rowid())
}

/// Insert a strategy under a fresh id. `None` when the name is taken.
fn insert_strategy_row(conn: &Connection, strategy: &Strategy) -> JournalResult<Option<i64>> {
    let result = conn.execute(
        "INSERT INTO strategies (name, description, entry_rules, exit_rules, created_at)
         VALUES (?, ?, ?, ?, ?)",
        params![
            strategy.name,
            strategy.description,
            encode_list(&strategy.entry_rules)?,
            encode_list(&strategy.exit_rules)?,
            format_timestamp(&strategy.created_at),
        ],
    );

    match result {
        Ok(_) => Ok(Some(conn.last_insert_rowid())),
        Err(e) if is_constraint_violation(&e) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Same instrument, direction, prices, size and timestamp.
fn trade_exists(conn: &Connection, trade: &Trade) -> JournalResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM trades
         WHERE symbol = ? AND side = ? AND trade_date = ? AND entry_price = ? AND exit_price = ? AND qty = ?",
        params![
            trade.symbol,
            trade.side.as_str(),
            format_timestamp(&trade.trade_date),
            trade.entry_price,
            trade.exit_price,
            trade.qty,
        ],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

impl Database {
    pub fn get_trade(&self, id: i64) -> JournalResult<Trade> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                &format!("SELECT {} FROM trades WHERE id = ?", TRADE_COLUMNS),
                [id],
                read_trade_row,
            )
            .optional()?
            .ok_or(JournalError::NotFound { entity: "trade", id })?;

        row.into_trade()
            .ok_or(JournalError::Validation(format!("trade {} is unreadable", id)))
    }

    /// Filtered, paginated trade listing, newest first.
    pub fn query_trades(&self, filters: &TradeFilters) -> JournalResult<Vec<Trade>> {
        let conn = self.lock()?;

        let mut query = format!("SELECT {} FROM trades WHERE 1=1", TRADE_COLUMNS);
        let mut params: Vec<Box<dyn ToSql>> = Vec::new();

        if let Some(symbol) = &filters.symbol {
            query.push_str(" AND symbol LIKE ?");
            params.push(Box::new(format!("%{}%", symbol)));
        }
        if let Some(strategy_id) = filters.strategy_id {
            query.push_str(" AND strategy_id = ?");
            params.push(Box::new(strategy_id));
        }
        if let Some(start) = &filters.start_date {
            query.push_str(" AND julianday(trade_date) >= julianday(?)");
            params.push(Box::new(format_timestamp(start)));
        }
        if let Some(end) = &filters.end_date {
            query.push_str(" AND julianday(trade_date) <= julianday(?)");
            params.push(Box::new(format_timestamp(end)));
        }

        // julianday() reads both `T` and space separated dates
        query.push_str(" ORDER BY julianday(trade_date) DESC, id DESC");

        if let Some(limit) = filters.limit {
            let page = filters.page.unwrap_or(1).max(1);
            query.push_str(" LIMIT ? OFFSET ?");
            params.push(Box::new(limit));
            params.push(Box::new((page - 1) * limit));
        }

        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&query)?;
        let rows = stmt
            .query_map(param_refs.as_slice(), read_trade_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows_to_trades(rows))
    }

    pub fn get_strategy(&self, id: i64) -> JournalResult<Strategy> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {} FROM strategies WHERE id = ?", STRATEGY_COLUMNS),
            [id],
            read_strategy_row,
        )
        .optional()?
        .map(StrategyRow::into_strategy)
        .ok_or(JournalError::NotFound { entity: "strategy", id })
    }

    /// Insert a strategy, returning its id, or `None` when the name is taken.
    pub fn insert_strategy(&self, strategy: &Strategy) -> JournalResult<Option<i64>> {
        let conn = self.lock()?;
        insert_strategy_row(&conn, strategy)
    }

    /// Replace name, description and rules. `Ok(false)` when the new name
    /// belongs to another strategy.
    pub fn update_strategy(&self, strategy: &Strategy) -> JournalResult<bool> {
        let conn = self.lock()?;
        let result = conn.execute(
            "UPDATE strategies SET name = ?, description = ?, entry_rules = ?, exit_rules = ? WHERE id = ?",
            params![
                strategy.name,
                strategy.description,
                encode_list(&strategy.entry_rules)?,
                encode_list(&strategy.exit_rules)?,
                strategy.id,
            ],
        );

        match result {
            Ok(0) => Err(JournalError::NotFound {
                entity: "strategy",
                id: strategy.id,
            }),
            Ok(_) => Ok(true),
            Err(e) if is_constraint_violation(&e) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Merge backed-up settings and records in one transaction.
    ///
    /// Records get fresh ids. A backed-up strategy whose name already exists
    /// maps onto the local one, and trade strategy references are rewritten
    /// through that mapping. Trades the journal already holds are skipped.
    pub fn import_backup(
        &self,
        settings: &Settings,
        strategies: &[Strategy],
        trades: &[Trade],
    ) -> JournalResult<ImportSummary> {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction()?;
        let mut summary = ImportSummary::default();

        tx.execute(
            "UPDATE settings SET user_name = ?, language = ?, currency = ?, pattern_lookback = ?,
             recent_symbols_limit = ?, updated_at = CAST(strftime('%s', 'now') AS INTEGER) WHERE id = 1",
            params![
                settings.user_name,
                settings.language.as_str(),
                settings.currency,
                settings.pattern_lookback.max(1),
                settings.recent_symbols_limit.max(1),
            ],
        )?;

        let mut strategy_ids: HashMap<i64, i64> = HashMap::new();
        for strategy in strategies {
            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM strategies WHERE name = ?",
                    [&strategy.name],
                    |row| row.get(0),
                )
                .optional()?;

            let local_id = match existing {
                Some(id) => id,
                None => {
                    summary.strategies += 1;
                    insert_strategy_row(&tx, strategy)?
                        .ok_or_else(|| JournalError::DuplicateStrategyName(strategy.name.clone()))?
                }
            };
            strategy_ids.insert(strategy.id, local_id);
        }

        let mut ordered: Vec<&Trade> = trades.iter().collect();
        ordered.sort_by_key(|t| (t.trade_date, t.id));

        for trade in ordered {
            let strategy_id = trade.strategy_id.and_then(|id| {
                let mapped = strategy_ids.get(&id).copied();
                if mapped.is_none() {
                    log::warn!("Backup trade {} references unknown strategy {}", trade.id, id);
                }
                mapped
            });
            let trade = Trade {
                strategy_id,
                ..trade.clone()
            };

            if trade_exists(&tx, &trade)? {
                summary.duplicates += 1;
                continue;
            }
            insert_trade(&tx, &trade)?;
            summary.trades += 1;
        }

        tx.commit()?;
        Ok(summary)
    }

    /// Every stored field that loads lossily or not at all.
    pub fn find_corrupt_records(&self) -> JournalResult<Vec<CorruptRecord>> {
        let conn = self.lock()?;

        let mut stmt = conn.prepare(&format!("SELECT {} FROM trades ORDER BY id", TRADE_COLUMNS))?;
        let trade_rows = stmt
            .query_map([], read_trade_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(&format!("SELECT {} FROM strategies ORDER BY id", STRATEGY_COLUMNS))?;
        let strategy_rows = stmt
            .query_map([], read_strategy_row)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut corrupt: Vec<CorruptRecord> = trade_rows.iter().flat_map(TradeRow::problems).collect();
        corrupt.extend(strategy_rows.iter().flat_map(StrategyRow::problems));

        if !corrupt.is_empty() {
            log::warn!("Found {} corrupt fields in journal", corrupt.len());
        }
        Ok(corrupt)
    }
}

impl RecordStore for Database {
    fn load_trades(&self) -> JournalResult<Vec<Trade>> {
        self.query_trades(&TradeFilters::default())
    }

    fn load_strategies(&self) -> JournalResult<Vec<Strategy>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM strategies ORDER BY name", STRATEGY_COLUMNS))?;
        let strategies = stmt
            .query_map([], read_strategy_row)?
            .map(|row| row.map(StrategyRow::into_strategy))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(strategies)
    }

    fn save_trade(&self, trade: &Trade) -> JournalResult<i64> {
        let conn = self.lock()?;
        insert_trade(&conn, trade)
    }

    fn save_strategy(&self, strategy: &Strategy) -> JournalResult<bool> {
        Ok(self.insert_strategy(strategy)?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, day)
            .unwrap()
            .and_hms_opt(hour, 30, 0)
            .unwrap()
    }

    fn sample_trade(symbol: &str, date: NaiveDateTime) -> Trade {
        Trade {
            id: 0,
            symbol: symbol.to_string(),
            entry_price: 100.0,
            exit_price: 105.0,
            qty: 2.0,
            risk: 5.0,
            side: Side::Buy,
            trade_type: TradeType::Futures,
            leverage: 3.0,
            psychological_tags: vec!["patience".into(), "ترس".into()],
            market_context: Some("trending".into()),
            strategy_id: None,
            profit_or_loss: 30.0,
            rr_calculated: 6.0,
            trade_date: date,
            strategy_compliance_rate: None,
            strategy_missing_rules: Vec::new(),
        }
    }

    fn sample_strategy(name: &str) -> Strategy {
        Strategy {
            id: 0,
            name: name.to_string(),
            description: "Pullback to the 20 EMA".into(),
            entry_rules: vec![Rule::new("Price touches EMA20", true), Rule::new("Bullish candle", false)],
            exit_rules: vec![Rule::new("Close below EMA50", true)],
            created_at: at(1, 9),
        }
    }

    #[test]
    fn test_trades_load_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.save_trade(&sample_trade("BTCUSDT", at(2, 10))).unwrap();
        db.save_trade(&sample_trade("ETHUSDT", at(5, 10))).unwrap();
        db.save_trade(&sample_trade("SOLUSDT", at(3, 10))).unwrap();

        let symbols: Vec<String> = db.load_trades().unwrap().into_iter().map(|t| t.symbol).collect();
        assert_eq!(symbols, vec!["ETHUSDT", "SOLUSDT", "BTCUSDT"]);
    }

    #[test]
    fn test_trade_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let trade = sample_trade("BTCUSDT", at(2, 10));
        let id = db.save_trade(&trade).unwrap();

        let loaded = db.get_trade(id).unwrap();
        assert_eq!(loaded, Trade { id, ..trade });
    }

    #[test]
    fn test_corrupt_tags_load_as_empty_and_are_reported() {
        let db = Database::open_in_memory().unwrap();
        let id = db.save_trade(&sample_trade("BTCUSDT", at(2, 10))).unwrap();
        db.lock()
            .unwrap()
            .execute(
                "UPDATE trades SET psychological_tags = 'patience, fear' WHERE id = ?",
                [id],
            )
            .unwrap();

        let trades = db.load_trades().unwrap();
        assert_eq!(trades.len(), 1);
        assert!(trades[0].psychological_tags.is_empty());

        let corrupt = db.find_corrupt_records().unwrap();
        assert_eq!(corrupt.len(), 1);
        assert_eq!(corrupt[0].field, "psychological_tags");
        assert_eq!(corrupt[0].raw.as_deref(), Some("patience, fear"));
    }

    #[test]
    fn test_unreadable_trade_is_skipped() {
        let db = Database::open_in_memory().unwrap();
        db.save_trade(&sample_trade("BTCUSDT", at(2, 10))).unwrap();
        let bad = db.save_trade(&sample_trade("ETHUSDT", at(3, 10))).unwrap();
        db.lock()
            .unwrap()
            .execute("UPDATE trades SET side = 'long' WHERE id = ?", [bad])
            .unwrap();

        assert_eq!(db.load_trades().unwrap().len(), 1);
        let corrupt = db.find_corrupt_records().unwrap();
        assert_eq!(corrupt[0].id, bad);
        assert_eq!(corrupt[0].field, "side");
    }

    #[test]
    fn test_duplicate_strategy_name() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.save_strategy(&sample_strategy("EMA Pullback")).unwrap());
        assert!(!db.save_strategy(&sample_strategy("EMA Pullback")).unwrap());
        assert!(db.save_strategy(&sample_strategy("Breakout")).unwrap());

        let names: Vec<String> = db.load_strategies().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["Breakout", "EMA Pullback"]);
    }

    #[test]
    fn test_update_strategy_conflict_and_missing() {
        let db = Database::open_in_memory().unwrap();
        let first = db.insert_strategy(&sample_strategy("A")).unwrap().unwrap();
        db.insert_strategy(&sample_strategy("B")).unwrap().unwrap();

        let mut edited = db.get_strategy(first).unwrap();
        edited.name = "B".into();
        assert!(!db.update_strategy(&edited).unwrap());

        edited.name = "A2".into();
        edited.entry_rules.pop();
        assert!(db.update_strategy(&edited).unwrap());
        assert_eq!(db.get_strategy(first).unwrap().entry_rules.len(), 1);

        edited.id = 999;
        assert!(matches!(
            db.update_strategy(&edited),
            Err(JournalError::NotFound { entity: "strategy", id: 999 })
        ));
    }

    #[test]
    fn test_query_trades_filters_and_pages() {
        let db = Database::open_in_memory().unwrap();
        for day in 1..=6 {
            let mut trade = sample_trade(if day % 2 == 0 { "BTCUSDT" } else { "ETHUSDT" }, at(day, 8));
            trade.strategy_id = (day > 3).then_some(1);
            db.save_trade(&trade).unwrap();
        }

        let btc = db
            .query_trades(&TradeFilters {
                symbol: Some("BTC".into()),
                ..TradeFilters::default()
            })
            .unwrap();
        assert_eq!(btc.len(), 3);

        let page = db
            .query_trades(&TradeFilters {
                page: Some(2),
                limit: Some(2),
                ..TradeFilters::default()
            })
            .unwrap();
        assert_eq!(page.iter().map(|t| t.trade_date).collect::<Vec<_>>(), vec![at(4, 8), at(3, 8)]);

        let tagged = db
            .query_trades(&TradeFilters {
                strategy_id: Some(1),
                start_date: Some(at(5, 0)),
                ..TradeFilters::default()
            })
            .unwrap();
        assert_eq!(tagged.len(), 2);
    }

    #[test]
    fn test_limit_without_page_returns_first_page() {
        let db = Database::open_in_memory().unwrap();
        for day in 1..=4 {
            db.save_trade(&sample_trade("BTCUSDT", at(day, 8))).unwrap();
        }

        let newest = db
            .query_trades(&TradeFilters {
                limit: Some(2),
                ..TradeFilters::default()
            })
            .unwrap();
        assert_eq!(newest.iter().map(|t| t.trade_date).collect::<Vec<_>>(), vec![at(4, 8), at(3, 8)]);
    }

    #[test]
    fn test_space_separated_dates_sort_by_time() {
        let db = Database::open_in_memory().unwrap();
        let morning = db.save_trade(&sample_trade("BTCUSDT", at(2, 8))).unwrap();
        let evening = db.save_trade(&sample_trade("ETHUSDT", at(2, 10))).unwrap();
        db.lock()
            .unwrap()
            .execute(
                "UPDATE trades SET trade_date = '2024-05-02 20:30:00' WHERE id = ?",
                [evening],
            )
            .unwrap();

        let ids: Vec<i64> = db.load_trades().unwrap().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![evening, morning]);

        let late = db
            .query_trades(&TradeFilters {
                start_date: Some(at(2, 12)),
                ..TradeFilters::default()
            })
            .unwrap();
        assert_eq!(late.len(), 1);
        assert_eq!(late[0].id, evening);
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = at(2, 10);
        assert_eq!(parse_timestamp("2024-05-02T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-02 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-05-02T10:30:00+03:30"), Some(expected));
        assert!(parse_timestamp("2024-05-02T10:30:00.123456").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }
}
