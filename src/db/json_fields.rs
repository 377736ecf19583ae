//! JSON text columns holding ordered lists (tags, missing rules, strategy rules).
//!
//! Lists are always written as a JSON array, so an empty list is `[]` and a
//! NULL column means the value was never recorded.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::JournalResult;

pub fn encode_list<T: Serialize>(items: &[T]) -> JournalResult<String> {
    Ok(serde_json::to_string(items)?)
}

/// Strict decode. NULL and empty text decode to an empty list.
pub fn decode_list<T: DeserializeOwned>(raw: Option<&str>) -> Result<Vec<T>, serde_json::Error> {
    match raw.map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(text) => serde_json::from_str(text),
    }
}

/// Lenient decode used when loading records: a malformed value becomes an
/// empty list and is reported, so one bad row never blocks the journal.
pub fn decode_list_or_empty<T: DeserializeOwned>(
    raw: Option<&str>,
    entity: &str,
    id: i64,
    field: &str,
) -> Vec<T> {
    decode_list(raw).unwrap_or_else(|e| {
        log::warn!(
            "Corrupt {} field on {} {}: {} (raw: {:?})",
            field,
            entity,
            id,
            e,
            raw
        );
        Vec::new()
    })
}
