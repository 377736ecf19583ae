//! Service layer: each function takes the open journal and does one
//! user-facing operation.

pub mod backup;
pub mod report;
pub mod settings;
pub mod strategies;
pub mod trades;

pub use backup::*;
pub use report::*;
pub use settings::*;
pub use strategies::*;
pub use trades::*;
