use super::round2;
use crate::models::{Side, TradeDraft, TradeType};

/// Profit/loss and reward:risk for a draft, both rounded to 2 decimals.
///
/// An unrecognised side yields `(0.0, 0.0)`; zero risk yields an R:R of 0.
/// A draft without an exit price is priced at exit 0.
pub fn calculate_pnl_and_rr(draft: &TradeDraft) -> (f64, f64) {
    let Some(side) = Side::parse(&draft.side) else {
        return (0.0, 0.0);
    };

    let entry = draft.entry_price;
    let exit = draft.exit_price.unwrap_or(0.0);
    let multiplier = match TradeType::parse(&draft.trade_type) {
        Some(TradeType::Futures) => draft.leverage,
        _ => 1.0,
    };

    let pnl = match side {
        Side::Buy => (exit - entry) * draft.qty * multiplier,
        Side::Sell => (entry - exit) * draft.qty * multiplier,
    };
    let rr = if draft.risk > 0.0 { pnl / draft.risk } else { 0.0 };

    (round2(pnl), round2(rr))
}
