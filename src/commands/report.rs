use serde::{Deserialize, Serialize};

use crate::analytics::{
    aggregate_strategy_performance, analyze_evolution, detect_strategy_change, learn_pattern,
    new_strategy_outperforms, recent_symbols, resolve_strategy_names, summarize, EvolutionReport,
    JournalSummary, Pattern, StrategyChangeReport, StrategyPerformanceEntry,
};
use crate::commands::settings::get_settings;
use crate::db::{Database, RecordStore};
use crate::error::JournalResult;
use crate::models::{Strategy, Trade};

const RECENT_TRADES_SHOWN: usize = 10;

/// Everything the dashboard shows, computed from one snapshot of the journal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmartReport {
    pub user_name: String,
    pub currency: String,
    pub summary: JournalSummary,
    pub pattern: Option<Pattern>,
    pub evolution: Option<EvolutionReport>,
    pub strategy_performance: Vec<StrategyPerformanceEntry>,
    pub strategy_change: Option<StrategyChangeReport>,
    /// Only set when a strategy change was detected
    pub new_strategy_outperforms: Option<bool>,
    pub recent_trades: Vec<Trade>,
    pub recent_symbols: Vec<String>,
}

/// Name of the strategy with `id`, keeping `label` when it no longer exists.
fn resolve_name(id: Option<i64>, label: Option<String>, strategies: &[Strategy]) -> Option<String> {
    id.and_then(|id| strategies.iter().find(|s| s.id == id))
        .map(|s| s.name.clone())
        .or(label)
}

pub fn get_smart_report(db: &Database) -> JournalResult<SmartReport> {
    let settings = get_settings(db)?;
    let trades = db.load_trades()?;
    let strategies = db.load_strategies()?;

    let mut strategy_performance = aggregate_strategy_performance(&trades);
    resolve_strategy_names(&mut strategy_performance, &strategies);

    let strategy_change = detect_strategy_change(&trades).map(|change| StrategyChangeReport {
        from: resolve_name(change.from_id, change.from, &strategies),
        to: resolve_name(change.to_id, change.to, &strategies),
        ..change
    });
    let new_strategy_outperforms = strategy_change
        .as_ref()
        .filter(|c| c.changed)
        .map(|_| new_strategy_outperforms(&trades));

    log::debug!("Built smart report over {} trades", trades.len());

    Ok(SmartReport {
        user_name: settings.user_name,
        currency: settings.currency,
        summary: summarize(&trades),
        pattern: learn_pattern(&trades, settings.pattern_lookback.max(1) as usize),
        evolution: analyze_evolution(&trades),
        strategy_performance,
        strategy_change,
        new_strategy_outperforms,
        recent_symbols: recent_symbols(&trades, settings.recent_symbols_limit.max(1) as usize),
        recent_trades: trades.into_iter().take(RECENT_TRADES_SHOWN).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::strategies::create_strategy;
    use crate::commands::trades::record_trade;
    use crate::models::{Rule, StrategyInput, TradeDraft};
    use chrono::NaiveDate;

    fn draft(day: u32, strategy_id: Option<i64>, exit_price: f64) -> TradeDraft {
        TradeDraft {
            symbol: "BTCUSDT".into(),
            entry_price: 100.0,
            exit_price: Some(exit_price),
            qty: 1.0,
            side: "buy".into(),
            risk: 10.0,
            trade_type: "spot".into(),
            leverage: 1.0,
            strategy_id,
            trade_date: NaiveDate::from_ymd_opt(2024, 7, day).and_then(|d| d.and_hms_opt(14, 0, 0)),
            ..TradeDraft::default()
        }
    }

    fn strategy(db: &Database, name: &str) -> i64 {
        create_strategy(
            db,
            StrategyInput {
                name: name.into(),
                entry_rules: vec![Rule::new("Setup present", true)],
                ..StrategyInput::default()
            },
        )
        .unwrap()
        .id
    }

    #[test]
    fn test_empty_journal() {
        let db = Database::open_in_memory().unwrap();
        let report = get_smart_report(&db).unwrap();

        assert_eq!(report.summary.total_trades, 0);
        assert!(report.pattern.is_none());
        assert!(report.evolution.is_none());
        assert!(report.strategy_change.is_none());
        assert!(report.new_strategy_outperforms.is_none());
        assert_eq!(report.user_name, "Trader");
    }

    #[test]
    fn test_strategy_switch_uses_names() {
        let db = Database::open_in_memory().unwrap();
        let scalp = strategy(&db, "Scalp");
        let swing = strategy(&db, "Swing");

        for day in 1..=5 {
            record_trade(&db, draft(day, Some(scalp), 95.0)).unwrap();
        }
        for day in 6..=10 {
            record_trade(&db, draft(day, Some(swing), 120.0)).unwrap();
        }

        let report = get_smart_report(&db).unwrap();
        let change = report.strategy_change.unwrap();
        assert!(change.changed);
        assert_eq!(change.from.as_deref(), Some("Scalp"));
        assert_eq!(change.to.as_deref(), Some("Swing"));
        assert_eq!(report.new_strategy_outperforms, Some(true));

        assert_eq!(report.strategy_performance[0].strategy_name, "Swing");
        assert_eq!(report.strategy_performance[0].total_pnl, 100.0);
        assert_eq!(report.strategy_performance[1].strategy_name, "Scalp");
        assert_eq!(report.recent_trades.len(), 10);
        assert_eq!(report.recent_symbols, vec!["BTCUSDT"]);
        assert!(report.evolution.is_some());
    }

    #[test]
    fn test_strategy_switch_to_deleted_strategy_keeps_label() {
        let db = Database::open_in_memory().unwrap();
        let scalp = strategy(&db, "Scalp");

        let mut last = None;
        for day in 1..=5 {
            last = Some(record_trade(&db, draft(day, Some(scalp), 95.0)).unwrap());
        }
        // Trades whose strategy has since been removed
        let template = last.unwrap();
        for offset in 1..=5_i64 {
            let trade_date = template.trade_date + chrono::Duration::days(offset);
            db.save_trade(&Trade {
                strategy_id: Some(7),
                trade_date,
                ..template.clone()
            })
            .unwrap();
        }

        let change = get_smart_report(&db).unwrap().strategy_change.unwrap();
        assert_eq!(change.from.as_deref(), Some("Scalp"));
        assert_eq!(change.from_id, Some(scalp));
        assert_eq!(change.to.as_deref(), Some("Strategy 7"));
        assert_eq!(change.to_id, Some(7));
    }
}
