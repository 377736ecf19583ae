use serde::{Deserialize, Serialize};

use crate::models::Strategy;

/// How closely a trade followed its strategy's entry rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    /// Met entry rules over total entry rules, 0 when there are none
    pub rate: f64,
    pub missing_rules: Vec<String>,
    pub required_missing: Vec<String>,
}

pub fn evaluate_compliance(strategy: &Strategy, met_conditions: &[String]) -> ComplianceResult {
    let total = strategy.entry_rules.len();
    let is_met = |condition: &str| met_conditions.iter().any(|c| c == condition);

    let missing: Vec<_> = strategy
        .entry_rules
        .iter()
        .filter(|rule| !is_met(rule.condition.as_str()))
        .collect();

    let rate = if total == 0 {
        0.0
    } else {
        (total - missing.len()) as f64 / total as f64
    };

    ComplianceResult {
        rate,
        missing_rules: missing.iter().map(|r| r.condition.clone()).collect(),
        required_missing: missing
            .iter()
            .filter(|r| r.required)
            .map(|r| r.condition.clone())
            .collect(),
    }
}
