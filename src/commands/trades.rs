use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::analytics::{
    calculate_pnl_and_rr, check_deviation, evaluate_compliance, learn_pattern, symbol_suggestions,
    DeviationCheck, Pattern, DEVIATION_WARNING_THRESHOLD,
};
use crate::commands::settings::get_settings;
use crate::db::{Database, RecordStore};
use crate::error::{JournalError, JournalResult};
use crate::models::{Side, Trade, TradeDraft, TradeFilters, TradeType};

/// Result of comparing a draft against the trader's recent behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreTradeCheck {
    pub pattern: Option<Pattern>,
    /// `None` until enough trades exist to learn a pattern
    pub deviation: Option<DeviationCheck>,
    pub score: f64,
    pub warning: bool,
    pub suggested_symbols: Vec<String>,
}

pub fn get_trades(db: &Database, filters: Option<TradeFilters>) -> JournalResult<Vec<Trade>> {
    db.query_trades(&filters.unwrap_or_default())
}

pub fn get_trade(db: &Database, id: i64) -> JournalResult<Trade> {
    db.get_trade(id)
}

fn validate_draft(draft: &TradeDraft) -> JournalResult<(Side, TradeType)> {
    if draft.symbol.trim().is_empty() {
        return Err(JournalError::Validation("symbol is required".into()));
    }
    if draft.entry_price == 0.0 || draft.exit_price.unwrap_or(0.0) == 0.0 || draft.qty == 0.0 {
        return Err(JournalError::Validation(
            "entry price, exit price and quantity must be non-zero".into(),
        ));
    }
    if draft.leverage < 1.0 {
        return Err(JournalError::Validation(format!(
            "leverage must be at least 1, got {}",
            draft.leverage
        )));
    }

    let side = Side::parse(&draft.side)
        .ok_or_else(|| JournalError::Validation(format!("unknown side: {}", draft.side)))?;
    let trade_type = TradeType::parse(&draft.trade_type)
        .ok_or_else(|| JournalError::Validation(format!("unknown trade type: {}", draft.trade_type)))?;

    Ok((side, trade_type))
}

/// Validate a draft, derive PnL, R:R and strategy compliance, and persist it.
pub fn record_trade(db: &Database, draft: TradeDraft) -> JournalResult<Trade> {
    let (side, trade_type) = validate_draft(&draft)?;
    let (profit_or_loss, rr_calculated) = calculate_pnl_and_rr(&draft);

    let compliance = match draft.strategy_id {
        Some(id) => Some(evaluate_compliance(&db.get_strategy(id)?, &draft.met_conditions)),
        None => None,
    };
    if let Some(result) = compliance.as_ref().filter(|c| !c.required_missing.is_empty()) {
        log::warn!(
            "Trade on {} skips required rules: {:?}",
            draft.symbol,
            result.required_missing
        );
    }

    let trade = Trade {
        id: 0,
        symbol: draft.symbol.trim().to_string(),
        entry_price: draft.entry_price,
        exit_price: draft.exit_price.unwrap_or(0.0),
        qty: draft.qty,
        risk: draft.risk,
        side,
        trade_type,
        leverage: draft.leverage,
        psychological_tags: draft.psychological_tags,
        market_context: draft.market_context.filter(|c| !c.trim().is_empty()),
        strategy_id: draft.strategy_id,
        profit_or_loss,
        rr_calculated,
        trade_date: draft.trade_date.unwrap_or_else(|| Local::now().naive_local()),
        strategy_compliance_rate: compliance.as_ref().map(|c| c.rate),
        strategy_missing_rules: compliance.map(|c| c.missing_rules).unwrap_or_default(),
    };

    let id = db.save_trade(&trade)?;
    log::info!(
        "Recorded trade {} on {}: pnl {} rr {}",
        id,
        trade.symbol,
        profit_or_loss,
        rr_calculated
    );

    Ok(Trade { id, ..trade })
}

/// Score a draft against the pattern of the most recent trades.
pub fn pre_trade_check(db: &Database, draft: &TradeDraft) -> JournalResult<PreTradeCheck> {
    let settings = get_settings(db)?;
    let trades = db.load_trades()?;

    let pattern = learn_pattern(&trades, settings.pattern_lookback.max(1) as usize);
    let deviation = pattern.as_ref().map(|p| check_deviation(draft, p));
    let score = deviation.map(|d| d.score()).unwrap_or(0.0);

    Ok(PreTradeCheck {
        pattern,
        deviation,
        score,
        warning: score >= DEVIATION_WARNING_THRESHOLD,
        suggested_symbols: symbol_suggestions(&trades, settings.recent_symbols_limit.max(1) as usize),
    })
}
