use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::analyst::Signal;
use crate::config::TARGET_CHAIN;
use crate::scanners::models::{DexPair, TokenLeg};

/// One token's market state at observation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub price_usd: f64,
    pub liquidity_usd: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub h1_change: f64,
    pub h6_change: f64,
    pub h24_change: f64,
    pub dex: String,
    pub pair_created_at: Option<DateTime<Utc>>,
    pub url: String,
}

impl MarketSnapshot {
    /// Returns `None` when the record carries no token address or belongs to
    /// another chain.
    pub fn from_pair(pair: &DexPair) -> Option<Self> {
        if let Some(chain) = pair.chain_id.as_deref() {
            if chain != TARGET_CHAIN {
                return None;
            }
        }

        let base = pair.base_token.clone().unwrap_or_default();
        let address = pair
            .token_address
            .clone()
            .or(base.address)
            .filter(|a| !a.is_empty())?;

        let change = pair.price_change.clone().unwrap_or_default();

        Some(Self {
            name: base.name.or_else(|| pair.name.clone()).unwrap_or_else(|| "Unknown".to_string()),
            symbol: base.symbol.or_else(|| pair.symbol.clone()).unwrap_or_else(|| "???".to_string()),
            price_usd: pair.price_usd.unwrap_or(0.0),
            liquidity_usd: pair.liquidity.as_ref().and_then(|l| l.usd).unwrap_or(0.0),
            volume_24h: pair.volume.as_ref().and_then(|v| v.h24).unwrap_or(0.0),
            market_cap: pair.market_cap.unwrap_or(0.0),
            h1_change: change.h1.unwrap_or(0.0),
            h6_change: change.h6.unwrap_or(0.0),
            h24_change: change.h24.unwrap_or(0.0),
            dex: pair.dex_id.clone().unwrap_or_else(|| "unknown".to_string()),
            pair_created_at: pair
                .pair_created_at
                .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            url: format!("https://dexscreener.com/{}/{}", TARGET_CHAIN, address),
            address,
        })
    }

    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<f64> {
        self.pair_created_at
            .map(|created| (now - created).num_seconds() as f64 / 3600.0)
    }
}

/// A snapshot plus the fields the analyst prompt is given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenContext {
    #[serde(flatten)]
    pub snapshot: MarketSnapshot,
    pub score: f64,
}

impl TokenContext {
    pub fn new(snapshot: MarketSnapshot, score: f64) -> Self {
        Self { snapshot, score }
    }
}

/// A swap by a tracked wallet large enough to alert on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhaleSwap {
    pub signature: String,
    pub wallet: String,
    pub sol_amount: f64,
    pub usd_estimate: f64,
    pub token_inputs: Vec<String>,
    pub token_outputs: Vec<String>,
    pub timestamp: i64,
    pub url: String,
}

impl WhaleSwap {
    pub(crate) fn leg_mints(legs: &[TokenLeg]) -> Vec<String> {
        legs.iter().map(|leg| leg.mint.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub source: String,
    pub title: String,
    pub text: String,
    pub score: i64,
    pub comments: u64,
    pub url: String,
    pub created: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentReport {
    pub total_signals: usize,
    pub posts: Vec<SocialPost>,
    pub scanned_at: DateTime<Utc>,
}

impl Default for SentimentReport {
    fn default() -> Self {
        Self {
            total_signals: 0,
            posts: Vec::new(),
            scanned_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingSummary {
    pub name: String,
    pub symbol: String,
    pub price_change_1h: f64,
    pub volume_24h: f64,
}

impl From<&MarketSnapshot> for TrendingSummary {
    fn from(snapshot: &MarketSnapshot) -> Self {
        Self {
            name: snapshot.name.clone(),
            symbol: snapshot.symbol.clone(),
            price_change_1h: snapshot.h1_change,
            volume_24h: snapshot.volume_24h,
        }
    }
}

/// Everything the market brief is generated from. The default value (nothing
/// found anywhere) is valid input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BriefInput {
    pub new_tokens_count: usize,
    pub trending: Vec<TrendingSummary>,
    pub pumps: Vec<MarketSnapshot>,
    pub whale_activity: Vec<WhaleSwap>,
    pub sentiment: SentimentReport,
    pub watchlist: Vec<TokenContext>,
    /// Latest analyst signals, newest first.
    #[serde(skip_deserializing)]
    pub recent_signals: Vec<Signal>,
}
