use chrono::{Local, NaiveDateTime};

use crate::db::{Database, RecordStore};
use crate::error::{JournalError, JournalResult};
use crate::models::{Rule, Strategy, StrategyInput};

pub fn get_strategies(db: &Database) -> JournalResult<Vec<Strategy>> {
    db.load_strategies()
}

fn validate_input(input: &StrategyInput) -> JournalResult<String> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(JournalError::Validation("strategy name is required".into()));
    }
    if input.entry_rules.iter().all(|r| r.condition.trim().is_empty()) {
        return Err(JournalError::Validation(
            "a strategy needs at least one entry rule".into(),
        ));
    }
    Ok(name.to_string())
}

fn non_blank(rules: Vec<Rule>) -> Vec<Rule> {
    rules
        .into_iter()
        .filter(|r| !r.condition.trim().is_empty())
        .collect()
}

fn into_strategy(id: i64, name: String, input: StrategyInput, created_at: NaiveDateTime) -> Strategy {
    Strategy {
        id,
        name,
        description: input.description,
        entry_rules: non_blank(input.entry_rules),
        exit_rules: non_blank(input.exit_rules),
        created_at,
    }
}

pub fn create_strategy(db: &Database, input: StrategyInput) -> JournalResult<Strategy> {
    let name = validate_input(&input)?;
    let strategy = into_strategy(0, name, input, Local::now().naive_local());

    match db.insert_strategy(&strategy)? {
        Some(id) => {
            log::info!("Created strategy {} ({})", id, strategy.name);
            Ok(Strategy { id, ..strategy })
        }
        None => Err(JournalError::DuplicateStrategyName(strategy.name)),
    }
}

/// Replace a strategy's name, description and rules. Trades keep their
/// stored compliance figures.
pub fn update_strategy(db: &Database, id: i64, input: StrategyInput) -> JournalResult<Strategy> {
    let name = validate_input(&input)?;
    let existing = db.get_strategy(id)?;
    let strategy = into_strategy(id, name, input, existing.created_at);

    if db.update_strategy(&strategy)? {
        Ok(strategy)
    } else {
        Err(JournalError::DuplicateStrategyName(strategy.name))
    }
}
