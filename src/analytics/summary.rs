use serde::{Deserialize, Serialize};

use crate::models::Trade;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JournalSummary {
    pub total_trades: usize,
    pub total_pnl: f64,
    pub wins: usize,
    pub win_rate: f64,
}

pub fn summarize(trades: &[Trade]) -> JournalSummary {
    let wins = trades.iter().filter(|t| t.is_win()).count();
    let win_rate = if trades.is_empty() {
        0.0
    } else {
        wins as f64 / trades.len() as f64
    };

    JournalSummary {
        total_trades: trades.len(),
        total_pnl: trades.iter().map(|t| t.profit_or_loss).sum(),
        wins,
        win_rate,
    }
}
