pub mod analyst;
pub mod config;
pub mod deduplication;
pub mod error;
pub mod evaluator;
pub mod hunter;
pub mod logging;
pub mod monitoring;
pub mod scanners;
pub mod shutdown;
pub mod types;

pub use error::{ClawError, Result};
pub use hunter::AlphaHunter;
