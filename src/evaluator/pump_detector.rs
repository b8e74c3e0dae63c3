use crate::types::MarketSnapshot;

/// Multiplier applied to the threshold for the 6h window.
pub const H6_THRESHOLD_FACTOR: f64 = 1.5;

pub fn is_pump(snapshot: &MarketSnapshot, threshold_pct: f64) -> bool {
    snapshot.h1_change.abs() >= threshold_pct
        || snapshot.h6_change.abs() >= threshold_pct * H6_THRESHOLD_FACTOR
}

/// Selects pumping (or dumping) tokens, strongest 1h move first.
pub fn detect_pumps(snapshots: &[MarketSnapshot], threshold_pct: f64) -> Vec<MarketSnapshot> {
    let mut pumps: Vec<MarketSnapshot> = snapshots
        .iter()
        .filter(|s| is_pump(s, threshold_pct))
        .cloned()
        .collect();

    pumps.sort_by(|a, b| b.h1_change.abs().total_cmp(&a.h1_change.abs()));
    pumps
}
