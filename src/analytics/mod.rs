//! Behavioral analytics over a newest-first slice of trades.
//!
//! Everything in here is a pure function of its arguments: no I/O, no
//! locking, no mutation of the input.

pub mod compliance;
pub mod deviation;
pub mod evolution;
pub mod pattern;
pub mod pnl;
pub mod strategy_change;
pub mod strategy_performance;
pub mod summary;
pub mod symbols;

pub use compliance::{evaluate_compliance, ComplianceResult};
pub use deviation::{check_deviation, score_deviation, DeviationCheck, DEVIATION_WARNING_THRESHOLD};
pub use evolution::{analyze_evolution, EvolutionReport, Trend};
pub use pattern::{learn_pattern, Pattern, DEFAULT_LOOKBACK};
pub use pnl::calculate_pnl_and_rr;
pub use strategy_change::{detect_strategy_change, new_strategy_outperforms, StrategyChangeReport};
pub use strategy_performance::{
    aggregate_strategy_performance, resolve_strategy_names, StrategyPerformanceEntry,
    StrategyQuality,
};
pub use summary::{summarize, JournalSummary};
pub use symbols::{recent_symbols, symbol_suggestions, DEFAULT_RECENT_SYMBOLS_LIMIT};

/// Round to 2 decimal places, half away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Most frequent value. On a tie the value seen first wins.
pub(crate) fn mode_first_seen<T, I>(values: I) -> Option<T>
where
    T: PartialEq,
    I: IntoIterator<Item = T>,
{
    let mut counts: Vec<(T, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(T, usize)> = None;
    for (value, count) in counts {
        match &best {
            Some((_, best_count)) if count <= *best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}
