use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::mode_first_seen;
use crate::models::{Side, Trade, TradeType};

pub const DEFAULT_LOOKBACK: usize = 5;

/// Fewest trades a fingerprint is learned from.
pub const MIN_TRADES_FOR_PATTERN: usize = 3;

/// Behavioral fingerprint of the most recent trades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub common_symbols: BTreeSet<String>,
    pub common_side: Side,
    pub common_type: TradeType,
    pub avg_leverage: f64,
    pub common_contexts: BTreeSet<String>,
    pub common_tags: BTreeSet<String>,
}

/// Learn a fingerprint from the first `lookback` trades of a newest-first list.
///
/// Returns `None` below [`MIN_TRADES_FOR_PATTERN`] trades.
pub fn learn_pattern(trades: &[Trade], lookback: usize) -> Option<Pattern> {
    if trades.len() < MIN_TRADES_FOR_PATTERN {
        return None;
    }
    let window = &trades[..lookback.min(trades.len())];

    let common_side = mode_first_seen(window.iter().map(|t| t.side))?;
    let common_type = mode_first_seen(window.iter().map(|t| t.trade_type))?;
    let avg_leverage = window.iter().map(|t| t.leverage).sum::<f64>() / window.len() as f64;

    Some(Pattern {
        common_symbols: window.iter().map(|t| t.symbol.clone()).collect(),
        common_side,
        common_type,
        avg_leverage,
        common_contexts: window.iter().map(|t| t.context_key().to_string()).collect(),
        common_tags: window
            .iter()
            .flat_map(|t| t.psychological_tags.iter().cloned())
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::trade;
    use crate::models::CONTEXT_NOT_SET;

    fn history() -> Vec<Trade> {
        let mut a = trade("BTCUSDT", Side::Buy, 10.0);
        a.leverage = 2.0;
        a.psychological_tags = vec!["patience".into()];
        a.market_context = Some("trending".into());

        let mut b = trade("ETHUSDT", Side::Sell, -5.0);
        b.leverage = 4.0;
        b.trade_type = TradeType::Futures;
        b.psychological_tags = vec!["FOMO".into(), "patience".into()];
        b.market_context = Some(String::new());

        let mut c = trade("BTCUSDT", Side::Buy, 3.0);
        c.leverage = 3.0;

        vec![a, b, c]
    }

    #[test]
    fn test_needs_three_trades() {
        let trades = history();
        assert!(learn_pattern(&[], DEFAULT_LOOKBACK).is_none());
        assert!(learn_pattern(&trades[..1], DEFAULT_LOOKBACK).is_none());
        assert!(learn_pattern(&trades[..2], DEFAULT_LOOKBACK).is_none());
        assert!(learn_pattern(&trades, DEFAULT_LOOKBACK).is_some());
    }

    #[test]
    fn test_fingerprint_contents() {
        let pattern = learn_pattern(&history(), DEFAULT_LOOKBACK).unwrap();

        assert_eq!(
            pattern.common_symbols,
            BTreeSet::from(["BTCUSDT".to_string(), "ETHUSDT".to_string()])
        );
        assert_eq!(pattern.common_side, Side::Buy);
        assert_eq!(pattern.common_type, TradeType::Spot);
        assert!((pattern.avg_leverage - 3.0).abs() < 1e-9);
        assert_eq!(
            pattern.common_contexts,
            BTreeSet::from(["trending".to_string(), CONTEXT_NOT_SET.to_string()])
        );
        assert_eq!(
            pattern.common_tags,
            BTreeSet::from(["FOMO".to_string(), "patience".to_string()])
        );
    }

    #[test]
    fn test_window_uses_most_recent_trades() {
        let mut trades = history();
        trades.extend((0..5).map(|_| trade("XRPUSDT", Side::Sell, 1.0)));

        let pattern = learn_pattern(&trades, 3).unwrap();
        assert!(!pattern.common_symbols.contains("XRPUSDT"));
    }

    #[test]
    fn test_side_tie_goes_to_most_recent() {
        let trades = vec![
            trade("BTCUSDT", Side::Sell, 1.0),
            trade("BTCUSDT", Side::Buy, 1.0),
            trade("BTCUSDT", Side::Buy, 1.0),
            trade("BTCUSDT", Side::Sell, 1.0),
        ];
        let pattern = learn_pattern(&trades, 4).unwrap();
        assert_eq!(pattern.common_side, Side::Sell);
    }
}
