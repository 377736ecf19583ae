use chrono::Timelike;
use serde::{Deserialize, Serialize};

use super::mean;
use crate::models::Trade;

pub const MIN_TRADES_FOR_EVOLUTION: usize = 8;

/// Improvement (in percent) above which the trend counts as improving.
const IMPROVING_THRESHOLD: f64 = 15.0;

// Tag markers, English and Farsi
const REVENGE_TAGS: &[&str] = &["revenge", "انتقام"];
const IMPULSIVE_TAGS: &[&str] = &["FOMO", "fomo", "هیجان"];
const FEAR_TAGS: &[&str] = &["fear", "ترس"];

/// Local hours (inclusive) when entries are treated as impulsive.
const IMPULSIVE_HOURS: std::ops::RangeInclusive<u32> = 2..=5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    NeedsAttention,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionReport {
    /// Signed percentage drop in behavioral-risk score, early to recent
    pub improvement: f64,
    pub early_avg_rr: f64,
    pub recent_avg_rr: f64,
    pub trend: Trend,
    pub early_score: f64,
    pub recent_score: f64,
}

/// Compare the older half of the history against the newer half.
///
/// `trades` is newest-first. Returns `None` below [`MIN_TRADES_FOR_EVOLUTION`].
pub fn analyze_evolution(trades: &[Trade]) -> Option<EvolutionReport> {
    if trades.len() < MIN_TRADES_FOR_EVOLUTION {
        return None;
    }

    let mid = trades.len() / 2;
    let (recent, early) = trades.split_at(mid);

    let early_score = period_score(early);
    let recent_score = period_score(recent);

    let improvement = if early_score == 0.0 {
        100.0
    } else {
        (early_score - recent_score) / early_score * 100.0
    };

    let trend = if improvement > IMPROVING_THRESHOLD {
        Trend::Improving
    } else {
        Trend::NeedsAttention
    };

    Some(EvolutionReport {
        improvement,
        early_avg_rr: winning_avg_rr(early),
        recent_avg_rr: winning_avg_rr(recent),
        trend,
        early_score,
        recent_score,
    })
}

/// Heuristic points for emotional or impulsive markers on one trade.
pub fn behavioral_risk_score(trade: &Trade) -> f64 {
    let has_any = |markers: &[&str]| {
        trade
            .psychological_tags
            .iter()
            .any(|tag| markers.contains(&tag.as_str()))
    };

    let mut score = 0.0;
    if has_any(REVENGE_TAGS) {
        score += 2.0;
    }
    if has_any(IMPULSIVE_TAGS) {
        score += 1.5;
    }
    if has_any(FEAR_TAGS) {
        score += 1.0;
    }
    if IMPULSIVE_HOURS.contains(&trade.trade_date.hour()) {
        score += 1.0;
    }
    score
}

fn period_score(period: &[Trade]) -> f64 {
    let scores: Vec<f64> = period.iter().map(behavioral_risk_score).collect();
    mean(&scores)
}

fn winning_avg_rr(period: &[Trade]) -> f64 {
    let rrs: Vec<f64> = period
        .iter()
        .filter(|t| t.is_win())
        .map(|t| t.rr_calculated)
        .collect();
    mean(&rrs)
}
