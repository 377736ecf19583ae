pub mod settings;
pub mod strategy;
pub mod trade;

pub use settings::*;
pub use strategy::*;
pub use trade::*;
