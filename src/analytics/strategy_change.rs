use serde::{Deserialize, Serialize};

use super::mode_first_seen;
use crate::models::{strategy_label, Trade};

/// Size of the oldest and newest windows compared for a strategy switch.
pub const CHANGE_WINDOW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyChangeReport {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_id: Option<i64>,
}

/// Compare the dominant strategy of the oldest five trades with the newest five.
///
/// Returns `None` with fewer than five trades, or when either window has no
/// strategy-tagged trade.
pub fn detect_strategy_change(trades: &[Trade]) -> Option<StrategyChangeReport> {
    if trades.len() < CHANGE_WINDOW {
        return None;
    }

    let first = &trades[trades.len() - CHANGE_WINDOW..];
    let last = &trades[..CHANGE_WINDOW];

    let first_mode = mode_first_seen(first.iter().filter_map(|t| t.strategy_id))?;
    let last_mode = mode_first_seen(last.iter().filter_map(|t| t.strategy_id))?;

    if first_mode == last_mode {
        return Some(StrategyChangeReport {
            changed: false,
            from: None,
            to: None,
            from_id: None,
            to_id: None,
        });
    }

    Some(StrategyChangeReport {
        changed: true,
        from: Some(strategy_label(Some(first_mode))),
        to: Some(strategy_label(Some(last_mode))),
        from_id: Some(first_mode),
        to_id: Some(last_mode),
    })
}

/// Whether the newer half of the history earned more than the older half.
///
/// With an odd count the middle trade belongs to the older half.
pub fn new_strategy_outperforms(trades: &[Trade]) -> bool {
    let (newer, older) = trades.split_at(trades.len() / 2);
    let pnl = |period: &[Trade]| period.iter().map(|t| t.profit_or_loss).sum::<f64>();
    pnl(newer) > pnl(older)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::fixtures::trade;
    use crate::models::Side;

    fn tagged(strategy_id: Option<i64>, pnl: f64) -> Trade {
        let mut t = trade("BTCUSDT", Side::Buy, pnl);
        t.strategy_id = strategy_id;
        t
    }

    #[test]
    fn test_needs_five_trades() {
        let trades: Vec<Trade> = (0..4).map(|_| tagged(Some(1), 1.0)).collect();
        assert!(detect_strategy_change(&trades).is_none());
    }

    #[test]
    fn test_no_strategy_references() {
        let trades: Vec<Trade> = (0..10).map(|_| tagged(None, 1.0)).collect();
        assert!(detect_strategy_change(&trades).is_none());
    }

    #[test]
    fn test_one_window_untagged() {
        let mut trades: Vec<Trade> = (0..5).map(|_| tagged(Some(2), 1.0)).collect();
        trades.extend((0..5).map(|_| tagged(None, 1.0)));
        assert!(detect_strategy_change(&trades).is_none());
    }

    #[test]
    fn test_detects_switch() {
        let mut trades: Vec<Trade> = (0..5).map(|_| tagged(Some(2), 1.0)).collect();
        trades.extend((0..5).map(|_| tagged(Some(1), 1.0)));

        let report = detect_strategy_change(&trades).unwrap();
        assert!(report.changed);
        assert_eq!(report.from.as_deref(), Some("Strategy 1"));
        assert_eq!(report.to.as_deref(), Some("Strategy 2"));
        assert_eq!((report.from_id, report.to_id), (Some(1), Some(2)));
    }

    #[test]
    fn test_same_dominant_strategy() {
        let trades = vec![
            tagged(Some(3), 1.0),
            tagged(None, 1.0),
            tagged(Some(3), 1.0),
            tagged(Some(4), 1.0),
            tagged(None, 1.0),
        ];

        let report = detect_strategy_change(&trades).unwrap();
        assert!(!report.changed);
        assert!(report.from.is_none());
        assert_eq!(serde_json::to_string(&report).unwrap(), r#"{"changed":false}"#);
    }

    #[test]
    fn test_new_strategy_outperforms() {
        let mut trades: Vec<Trade> = (0..3).map(|_| tagged(Some(2), 10.0)).collect();
        trades.extend((0..3).map(|_| tagged(Some(1), -5.0)));
        assert!(new_strategy_outperforms(&trades));

        trades.reverse();
        assert!(!new_strategy_outperforms(&trades));
    }

    #[test]
    fn test_odd_history_counts_middle_trade_as_older() {
        let trades: Vec<Trade> = [10.0, 10.0, -50.0, 15.0, 15.0]
            .into_iter()
            .map(|pnl| tagged(Some(1), pnl))
            .collect();

        // newer = 20, older = -50 + 15 + 15 = -20
        assert!(new_strategy_outperforms(&trades));

        let single = vec![tagged(Some(1), 5.0)];
        assert!(!new_strategy_outperforms(&single));
    }
}
