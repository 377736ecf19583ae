use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{mean, round2};
use crate::models::{strategy_label, Strategy, Trade};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyQuality {
    HighQuality,
    NeedsImprovement,
    Neutral,
}

impl StrategyQuality {
    pub fn from_avg_rr(avg_rr: f64) -> Self {
        if avg_rr > 1.0 {
            StrategyQuality::HighQuality
        } else if avg_rr < 0.5 {
            StrategyQuality::NeedsImprovement
        } else {
            StrategyQuality::Neutral
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPerformanceEntry {
    pub strategy_id: Option<i64>,
    pub strategy_name: String,
    pub total_pnl: f64,
    pub avg_rr: f64,
    pub win_rate: f64,
    pub trade_count: usize,
    pub wins: usize,
    pub losses: usize,
    /// Mean recorded entry-rule compliance, if any trade recorded one
    pub avg_compliance: Option<f64>,
    pub quality: StrategyQuality,
}

#[derive(Default)]
struct Accumulator {
    pnl: f64,
    rr_sum: f64,
    count: usize,
    wins: usize,
    losses: usize,
    compliance: Vec<f64>,
}

/// Per-strategy totals, sorted by total PnL, best first.
///
/// Trades without a strategy form their own "No Strategy" group. Groups with
/// equal PnL keep the order they were first seen in.
pub fn aggregate_strategy_performance(trades: &[Trade]) -> Vec<StrategyPerformanceEntry> {
    let mut order: Vec<Option<i64>> = Vec::new();
    let mut groups: HashMap<Option<i64>, Accumulator> = HashMap::new();

    for trade in trades {
        let acc = groups.entry(trade.strategy_id).or_insert_with(|| {
            order.push(trade.strategy_id);
            Accumulator::default()
        });

        acc.pnl += trade.profit_or_loss;
        acc.rr_sum += trade.rr_calculated;
        acc.count += 1;
        if trade.is_win() {
            acc.wins += 1;
        } else {
            acc.losses += 1;
        }
        if let Some(rate) = trade.strategy_compliance_rate {
            acc.compliance.push(rate);
        }
    }

    let mut results: Vec<StrategyPerformanceEntry> = order
        .into_iter()
        .filter_map(|id| groups.remove(&id).map(|acc| (id, acc)))
        .map(|(id, acc)| {
            let (avg_rr, win_rate) = if acc.count > 0 {
                (
                    acc.rr_sum / acc.count as f64,
                    acc.wins as f64 / acc.count as f64,
                )
            } else {
                (0.0, 0.0)
            };
            let avg_rr = round2(avg_rr);

            StrategyPerformanceEntry {
                strategy_id: id,
                strategy_name: strategy_label(id),
                total_pnl: round2(acc.pnl),
                avg_rr,
                win_rate: round2(win_rate),
                trade_count: acc.count,
                wins: acc.wins,
                losses: acc.losses,
                avg_compliance: (!acc.compliance.is_empty()).then(|| round2(mean(&acc.compliance))),
                quality: StrategyQuality::from_avg_rr(avg_rr),
            }
        })
        .collect();

    results.sort_by(|a, b| b.total_pnl.total_cmp(&a.total_pnl));
    results
}

/// Replace `Strategy <id>` labels with the names of known strategies.
pub fn resolve_strategy_names(entries: &mut [StrategyPerformanceEntry], strategies: &[Strategy]) {
    for entry in entries.iter_mut() {
        if let Some(strategy) = entry
            .strategy_id
            .and_then(|id| strategies.iter().find(|s| s.id == id))
        {
            entry.strategy_name = strategy.name.clone();
        }
    }
}
