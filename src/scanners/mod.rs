use std::time::Duration;

pub mod dex;
pub mod models;
pub mod sentiment;
pub mod whale;

pub use dex::DexScanner;
pub use sentiment::SentimentScanner;
pub use whale::WhaleScanner;

/// Per-request deadline for every scanner HTTP call.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
