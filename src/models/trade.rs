use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Storage format for `trade_date` (ISO-8601, local wall-clock, no offset).
pub const TRADE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Stands in for a missing or empty market context.
pub const CONTEXT_NOT_SET: &str = "not_set";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Case-insensitive parse of a form value; anything but buy/sell is `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(Side::Buy),
            "sell" => Some(Side::Sell),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeType {
    Spot,
    Futures,
}

impl TradeType {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "spot" => Some(TradeType::Spot),
            "futures" => Some(TradeType::Futures),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Spot => "spot",
            TradeType::Futures => "futures",
        }
    }
}

impl fmt::Display for TradeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded trade. Immutable once persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    /// Assigned by the store on insert
    pub id: i64,
    pub symbol: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub qty: f64,
    pub risk: f64,
    pub side: Side,
    pub trade_type: TradeType,
    pub leverage: f64,
    #[serde(default)]
    pub psychological_tags: Vec<String>,
    pub market_context: Option<String>,
    pub strategy_id: Option<i64>,

    // Derived at creation, never edited
    pub profit_or_loss: f64,
    pub rr_calculated: f64,

    pub trade_date: NaiveDateTime,

    #[serde(default)]
    pub strategy_compliance_rate: Option<f64>,
    #[serde(default)]
    pub strategy_missing_rules: Vec<String>,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit_or_loss > 0.0
    }

    /// Market context with the `not_set` sentinel for missing/empty values.
    pub fn context_key(&self) -> &str {
        context_key(self.market_context.as_deref())
    }
}

pub(crate) fn context_key(context: Option<&str>) -> &str {
    match context {
        Some(ctx) if !ctx.is_empty() => ctx,
        _ => CONTEXT_NOT_SET,
    }
}

/// In-progress trade as entered in a form, before it is recorded.
///
/// Side and trade type stay raw strings here: an unknown side is a valid
/// draft that simply produces a zero PnL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeDraft {
    pub symbol: String,
    pub entry_price: f64,
    #[serde(default)]
    pub exit_price: Option<f64>,
    pub qty: f64,
    pub side: String,
    #[serde(default)]
    pub risk: f64,
    pub trade_type: String,
    #[serde(default = "default_leverage")]
    pub leverage: f64,
    #[serde(default)]
    pub psychological_tags: Vec<String>,
    #[serde(default)]
    pub market_context: Option<String>,
    #[serde(default)]
    pub strategy_id: Option<i64>,
    #[serde(default)]
    pub trade_date: Option<NaiveDateTime>,
    /// Entry-rule conditions the trader ticked as fulfilled
    #[serde(default)]
    pub met_conditions: Vec<String>,
}

fn default_leverage() -> f64 {
    1.0
}

impl TradeDraft {
    /// Split a comma-separated tag field, dropping blanks.
    pub fn parse_tags(input: &str) -> Vec<String> {
        input
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn context_key(&self) -> &str {
        context_key(self.market_context.as_deref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TradeFilters {
    pub symbol: Option<String>,
    pub strategy_id: Option<i64>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parse_is_case_insensitive() {
        assert_eq!(Side::parse("BUY"), Some(Side::Buy));
        assert_eq!(Side::parse(" Sell "), Some(Side::Sell));
        assert_eq!(Side::parse("long"), None);
        assert_eq!(TradeType::parse("Futures"), Some(TradeType::Futures));
    }

    #[test]
    fn test_parse_tags_drops_blanks() {
        let tags = TradeDraft::parse_tags("patience, , FOMO,fear ,");
        assert_eq!(tags, vec!["patience", "FOMO", "fear"]);
    }

    #[test]
    fn test_draft_defaults_from_json() {
        let json = r#"{
            "symbol": "BTCUSDT",
            "entry_price": 100.0,
            "qty": 1.0,
            "side": "buy",
            "trade_type": "spot"
        }"#;

        let draft: TradeDraft = serde_json::from_str(json).unwrap();
        assert_eq!(draft.leverage, 1.0);
        assert!(draft.psychological_tags.is_empty());
        assert_eq!(draft.context_key(), CONTEXT_NOT_SET);
    }
}
