use tracing::debug;

use crate::types::MarketSnapshot;

pub const MAX_SCORE: f64 = 100.0;

/// Inclusive-or-exclusive bound on one side of a rule's range.
#[derive(Debug, Clone, Copy)]
enum Bound {
    Unbounded,
    Inclusive(f64),
    Exclusive(f64),
}

/// One tier of a sub-score. Tiers are evaluated in order; the first match wins.
#[derive(Debug, Clone, Copy)]
struct TierRule {
    lower: Bound,
    upper: Bound,
    points: f64,
}

impl TierRule {
    const fn new(lower: Bound, upper: Bound, points: f64) -> Self {
        Self { lower, upper, points }
    }

    fn matches(&self, value: f64) -> bool {
        let above = match self.lower {
            Bound::Unbounded => true,
            Bound::Inclusive(min) => value >= min,
            Bound::Exclusive(min) => value > min,
        };
        let below = match self.upper {
            Bound::Unbounded => true,
            Bound::Inclusive(max) => value <= max,
            Bound::Exclusive(max) => value < max,
        };
        above && below
    }
}

use Bound::{Exclusive, Inclusive, Unbounded};

const LIQUIDITY_TIERS: &[TierRule] = &[
    TierRule::new(Exclusive(100_000.0), Unbounded, 25.0),
    TierRule::new(Exclusive(50_000.0), Unbounded, 20.0),
    TierRule::new(Exclusive(10_000.0), Unbounded, 15.0),
    TierRule::new(Exclusive(5_000.0), Unbounded, 10.0),
];

const VOLUME_TIERS: &[TierRule] = &[
    TierRule::new(Exclusive(500_000.0), Unbounded, 25.0),
    TierRule::new(Exclusive(100_000.0), Unbounded, 20.0),
    TierRule::new(Exclusive(50_000.0), Unbounded, 15.0),
    TierRule::new(Exclusive(10_000.0), Unbounded, 10.0),
];

// Ranges overlap and the first match wins: 10-100% scores 25, 5-200% scores
// 15, anything above 200% only 5.
const MOMENTUM_TIERS: &[TierRule] = &[
    TierRule::new(Inclusive(10.0), Inclusive(100.0), 25.0),
    TierRule::new(Inclusive(5.0), Inclusive(200.0), 15.0),
    TierRule::new(Exclusive(200.0), Unbounded, 5.0),
];

// Smaller caps have more upside.
const MARKET_CAP_TIERS: &[TierRule] = &[
    TierRule::new(Inclusive(10_000.0), Inclusive(500_000.0), 25.0),
    TierRule::new(Exclusive(500_000.0), Inclusive(5_000_000.0), 20.0),
    TierRule::new(Exclusive(5_000_000.0), Inclusive(50_000_000.0), 15.0),
    TierRule::new(Exclusive(50_000_000.0), Unbounded, 10.0),
];

fn tier_points(rules: &[TierRule], value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    rules
        .iter()
        .find(|rule| rule.matches(value))
        .map(|rule| rule.points)
        .unwrap_or(0.0)
}

/// The four sub-scores of an opportunity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub liquidity: f64,
    pub volume: f64,
    pub momentum: f64,
    pub market_cap: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        (self.liquidity + self.volume + self.momentum + self.market_cap).min(MAX_SCORE)
    }
}

/// Quick numeric 0-100 score of a snapshot, used to decide whether a token is
/// worth an LLM call.
#[derive(Debug, Clone, Copy)]
pub struct OpportunityScorer {
    min_alert_score: f64,
}

impl OpportunityScorer {
    pub fn new(min_alert_score: f64) -> Self {
        Self { min_alert_score }
    }

    pub fn breakdown(&self, snapshot: &MarketSnapshot) -> ScoreBreakdown {
        ScoreBreakdown {
            liquidity: tier_points(LIQUIDITY_TIERS, snapshot.liquidity_usd),
            volume: tier_points(VOLUME_TIERS, snapshot.volume_24h),
            momentum: tier_points(MOMENTUM_TIERS, snapshot.h1_change),
            market_cap: tier_points(MARKET_CAP_TIERS, snapshot.market_cap),
        }
    }

    pub fn calculate_score(&self, snapshot: &MarketSnapshot) -> f64 {
        let breakdown = self.breakdown(snapshot);
        let score = breakdown.total();
        debug!(
            "Score for {} ({}): {} [liq {} vol {} mom {} mcap {}]",
            snapshot.symbol,
            snapshot.address,
            score,
            breakdown.liquidity,
            breakdown.volume,
            breakdown.momentum,
            breakdown.market_cap
        );
        score
    }

    pub fn should_analyze(&self, score: f64) -> bool {
        score >= self.min_alert_score
    }
}

impl Default for OpportunityScorer {
    fn default() -> Self {
        Self::new(40.0)
    }
}
