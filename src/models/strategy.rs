use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const NO_STRATEGY_LABEL: &str = "No Strategy";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub condition: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl Rule {
    pub fn new(condition: impl Into<String>, required: bool) -> Self {
        Self {
            condition: condition.into(),
            required,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Strategy {
    /// Assigned by the store on insert
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entry_rules: Vec<Rule>,
    #[serde(default)]
    pub exit_rules: Vec<Rule>,
    pub created_at: NaiveDateTime,
}

/// Input for creating a strategy or replacing an existing one wholesale
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StrategyInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub entry_rules: Vec<Rule>,
    #[serde(default)]
    pub exit_rules: Vec<Rule>,
}

/// Display label for a strategy reference when its name is not at hand.
pub fn strategy_label(strategy_id: Option<i64>) -> String {
    match strategy_id {
        Some(id) => format!("Strategy {}", id),
        None => NO_STRATEGY_LABEL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_label() {
        assert_eq!(strategy_label(Some(3)), "Strategy 3");
        assert_eq!(strategy_label(None), "No Strategy");
    }

    #[test]
    fn test_rule_required_defaults_to_true() {
        let rule: Rule = serde_json::from_str(r#"{"condition": "EMA cross"}"#).unwrap();
        assert!(rule.required);
    }
}
