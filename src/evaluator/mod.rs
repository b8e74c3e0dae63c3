pub mod pump_detector;
pub mod scorer;
pub mod whale_detector;

pub use pump_detector::detect_pumps;
pub use scorer::{OpportunityScorer, ScoreBreakdown};
pub use whale_detector::extract_large_swaps;
