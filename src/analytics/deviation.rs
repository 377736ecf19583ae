use serde::{Deserialize, Serialize};

use super::pattern::Pattern;
use crate::models::{Side, TradeDraft, TradeType};

/// Leverage may drift this fraction of the average before it counts as a mismatch.
const LEVERAGE_TOLERANCE: f64 = 0.8;

const TOTAL_CHECKS: usize = 6;

/// Score at or above which a pre-trade check warns the trader.
pub const DEVIATION_WARNING_THRESHOLD: f64 = 0.5;

/// Outcome of each fingerprint check; `true` means the draft deviates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviationCheck {
    pub unusual_symbol: bool,
    pub unusual_side: bool,
    pub unusual_type: bool,
    pub unusual_leverage: bool,
    pub unusual_context: bool,
    pub unfamiliar_tags: bool,
}

impl DeviationCheck {
    pub fn mismatches(&self) -> usize {
        [
            self.unusual_symbol,
            self.unusual_side,
            self.unusual_type,
            self.unusual_leverage,
            self.unusual_context,
            self.unfamiliar_tags,
        ]
        .iter()
        .filter(|m| **m)
        .count()
    }

    /// Fraction of checks that failed, in `[0, 1]`.
    pub fn score(&self) -> f64 {
        self.mismatches() as f64 / TOTAL_CHECKS as f64
    }
}

pub fn check_deviation(candidate: &TradeDraft, pattern: &Pattern) -> DeviationCheck {
    let leverage_drift = (candidate.leverage - pattern.avg_leverage).abs();

    DeviationCheck {
        unusual_symbol: !pattern.common_symbols.contains(&candidate.symbol),
        unusual_side: Side::parse(&candidate.side) != Some(pattern.common_side),
        unusual_type: TradeType::parse(&candidate.trade_type) != Some(pattern.common_type),
        unusual_leverage: leverage_drift > pattern.avg_leverage * LEVERAGE_TOLERANCE,
        unusual_context: !pattern.common_contexts.contains(candidate.context_key()),
        unfamiliar_tags: !candidate
            .psychological_tags
            .iter()
            .any(|tag| pattern.common_tags.contains(tag)),
    }
}

/// Deviation of a draft from the fingerprint; 0.0 when there is no fingerprint.
pub fn score_deviation(candidate: &TradeDraft, pattern: Option<&Pattern>) -> f64 {
    match pattern {
        Some(pattern) => check_deviation(candidate, pattern).score(),
        None => 0.0,
    }
}
