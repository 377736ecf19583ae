use std::collections::HashSet;

use crate::models::Trade;

pub const DEFAULT_RECENT_SYMBOLS_LIMIT: usize = 10;

/// Symbols always offered in the symbol picker, ahead of recent ones.
pub const DEFAULT_WATCHLIST: [&str; 5] = ["BTCUSDT", "ETHUSDT", "XRPUSDT", "SOLUSDT", "ADAUSDT"];

/// Distinct non-empty symbols, most recently used first.
pub fn recent_symbols(trades: &[Trade], limit: usize) -> Vec<String> {
    dedup_first_seen(trades.iter().map(|t| t.symbol.as_str()), limit)
}

/// Watch list followed by recent symbols, without repeats.
pub fn symbol_suggestions(trades: &[Trade], limit: usize) -> Vec<String> {
    let recent = recent_symbols(trades, limit);
    dedup_first_seen(
        DEFAULT_WATCHLIST
            .iter()
            .copied()
            .chain(recent.iter().map(String::as_str)),
        usize::MAX,
    )
}

fn dedup_first_seen<'a>(symbols: impl Iterator<Item = &'a str>, limit: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    symbols
        .filter(|s| !s.is_empty())
        .filter(|s| seen.insert(*s))
        .take(limit)
        .map(str::to_string)
        .collect()
}
