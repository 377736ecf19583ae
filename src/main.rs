use std::path::PathBuf;

use anyhow::Context;
use trade_journal_lib::{commands, open_journal};

const DEFAULT_DATA_DIR: &str = "./journal-data";

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let data_dir: PathBuf = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("TRADE_JOURNAL_DIR").ok())
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
        .into();

    let db = open_journal(&data_dir)
        .with_context(|| format!("failed to open journal in {}", data_dir.display()))?;

    let corrupt = commands::find_corrupt_records(&db)?;
    for record in &corrupt {
        log::warn!(
            "{} {} has a corrupt {} field: {}",
            record.entity,
            record.id,
            record.field,
            record.reason
        );
    }

    let report = commands::get_smart_report(&db).context("failed to build report")?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
