pub mod connection;
pub mod json_fields;
pub mod migration_runner;
pub mod store;

pub use connection::Database;
pub use store::{CorruptRecord, ImportSummary, RecordStore};
