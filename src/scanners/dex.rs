use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info};

use super::models::{DexPair, SearchResponse, TokenProfile};
use super::HTTP_TIMEOUT;
use crate::config::TARGET_CHAIN;
use crate::deduplication::SeenSet;
use crate::error::{ClawError, Result};
use crate::evaluator::detect_pumps;
use crate::types::MarketSnapshot;

pub const DEXSCREENER_BASE_URL: &str = "https://api.dexscreener.com";
const USER_AGENT: &str = "TrustClaw/1.0";

/// Deserializes each element of a JSON array on its own so one malformed
/// entry does not drop the listing. Anything but an array yields nothing.
pub(crate) fn list_or_empty<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Polls DexScreener for new Solana launches, trending tokens and pumps.
pub struct DexScanner {
    client: Client,
    base_url: String,
    seen_pairs: SeenSet,
}

impl DexScanner {
    pub fn new(seen_capacity: usize) -> Result<Self> {
        Self::with_base_url(DEXSCREENER_BASE_URL, seen_capacity)
    }

    pub fn with_base_url(base_url: &str, seen_capacity: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            seen_pairs: SeenSet::new("new-pairs", seen_capacity),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<T>().await?)
    }

    /// Newly listed Solana tokens (latest profiles plus latest boosts) that
    /// have not been returned before.
    pub async fn get_new_pairs(&self) -> Vec<TokenProfile> {
        match self.fetch_new_pairs().await {
            Ok(pairs) => pairs,
            Err(e) => {
                error!("DexScanner.get_new_pairs error: {}", e);
                Vec::new()
            }
        }
    }

    async fn fetch_new_pairs(&self) -> Result<Vec<TokenProfile>> {
        let profiles: Value = self
            .get_json("/token-profiles/latest/v1", &[("chainId", TARGET_CHAIN)])
            .await?;
        let boosted: Value = self.get_json("/token-boosts/latest/v1", &[]).await?;

        let mut candidates: Vec<TokenProfile> = list_or_empty(profiles);
        candidates.extend(list_or_empty::<TokenProfile>(boosted));

        Ok(self.select_unseen(candidates).await)
    }

    async fn select_unseen(&self, candidates: Vec<TokenProfile>) -> Vec<TokenProfile> {
        let mut fresh = Vec::new();
        for profile in candidates {
            if profile.chain_id.as_deref() != Some(TARGET_CHAIN) {
                continue;
            }
            let address = match profile.token_address.as_deref() {
                Some(address) if !address.is_empty() => address,
                _ => continue,
            };
            if self.seen_pairs.check_and_mark(address).await {
                fresh.push(profile);
            }
        }
        fresh
    }

    pub async fn seen_pair_count(&self) -> usize {
        self.seen_pairs.len().await
    }

    pub async fn get_trending(&self) -> Vec<MarketSnapshot> {
        let result: Result<Value> = self
            .get_json("/tokens/trending/v1", &[("chainId", TARGET_CHAIN)])
            .await;

        match result {
            Ok(value) => list_or_empty::<DexPair>(value)
                .iter()
                .filter_map(MarketSnapshot::from_pair)
                .collect(),
            Err(e) => {
                error!("DexScanner.get_trending error: {}", e);
                Vec::new()
            }
        }
    }

    /// Detailed market data for one Solana token (its first listed pair).
    pub async fn get_token_data(&self, token_address: &str) -> Option<MarketSnapshot> {
        match self.fetch_token_data(token_address).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!("DexScanner.get_token_data error for {}: {}", token_address, e);
                None
            }
        }
    }

    async fn fetch_token_data(&self, token_address: &str) -> Result<Option<MarketSnapshot>> {
        let path = format!("/tokens/v1/{}/{}", TARGET_CHAIN, token_address);
        let value: Value = self.get_json(&path, &[]).await?;

        let pair: Option<DexPair> = if value.is_array() {
            list_or_empty::<DexPair>(value).into_iter().next()
        } else if value.get("pairs").is_some() {
            serde_json::from_value::<SearchResponse>(value)?.pairs.into_iter().next()
        } else if value.is_object() {
            Some(serde_json::from_value(value)?)
        } else {
            return Err(ClawError::market_data_error(format!(
                "unexpected token payload for {}",
                token_address
            )));
        };

        Ok(pair.as_ref().and_then(MarketSnapshot::from_pair))
    }

    /// Trending tokens moving at least `min_pump_pct` percent, strongest first.
    pub async fn scan_for_pumps(&self, min_pump_pct: f64) -> Vec<MarketSnapshot> {
        let trending = self.get_trending().await;
        let pumps = detect_pumps(&trending, min_pump_pct);
        info!("{} of {} trending tokens are moving >= {}%", pumps.len(), trending.len(), min_pump_pct);
        pumps
    }

    pub async fn search_tokens(&self, query: &str) -> Vec<MarketSnapshot> {
        let result: Result<SearchResponse> = self.get_json("/latest/dex/search", &[("q", query)]).await;
        match result {
            Ok(response) => response
                .pairs
                .iter()
                .filter(|pair| pair.chain_id.as_deref() == Some(TARGET_CHAIN))
                .filter_map(MarketSnapshot::from_pair)
                .collect(),
            Err(e) => {
                error!("DexScanner.search_tokens error: {}", e);
                Vec::new()
            }
        }
    }
}
