//! Wire formats of the third-party APIs the scanners poll.
//!
//! Every field is optional: the upstream APIs drop or null fields freely and a
//! missing value must never fail a whole listing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Accepts `12.5`, `"12.5"` or `null`. Non-finite values read as missing.
pub(crate) fn flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let parsed: Option<f64> = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

/// Entry of `/token-profiles/latest/v1` and `/token-boosts/latest/v1`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenProfile {
    pub chain_id: Option<String>,
    pub token_address: Option<String>,
    pub url: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseToken {
    pub address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Liquidity {
    #[serde(deserialize_with = "flexible_f64")]
    pub usd: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Volume {
    #[serde(deserialize_with = "flexible_f64")]
    pub h24: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceChange {
    #[serde(deserialize_with = "flexible_f64")]
    pub h1: Option<f64>,
    #[serde(deserialize_with = "flexible_f64")]
    pub h6: Option<f64>,
    #[serde(deserialize_with = "flexible_f64")]
    pub h24: Option<f64>,
}

/// A pair from `/tokens/v1/{chain}/{address}` or `/latest/dex/search`, and the
/// flatter entries of `/tokens/trending/v1` (which carry `tokenAddress`,
/// `name` and `symbol` at the top level instead of a `baseToken`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DexPair {
    pub chain_id: Option<String>,
    pub dex_id: Option<String>,
    pub url: Option<String>,
    pub pair_address: Option<String>,
    pub token_address: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub base_token: Option<BaseToken>,
    #[serde(deserialize_with = "flexible_f64")]
    pub price_usd: Option<f64>,
    pub liquidity: Option<Liquidity>,
    pub volume: Option<Volume>,
    pub price_change: Option<PriceChange>,
    #[serde(deserialize_with = "flexible_f64")]
    pub market_cap: Option<f64>,
    /// Milliseconds since the epoch.
    pub pair_created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchResponse {
    pub pairs: Vec<DexPair>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexedTransaction {
    pub signature: String,
    pub timestamp: Option<i64>,
    pub events: Option<TransactionEvents>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionEvents {
    pub swap: Option<SwapEvent>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwapEvent {
    pub native_input: Option<NativeAmount>,
    pub native_output: Option<NativeAmount>,
    pub token_inputs: Vec<TokenLeg>,
    pub token_outputs: Vec<TokenLeg>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NativeAmount {
    pub account: Option<String>,
    /// Lamports.
    #[serde(deserialize_with = "flexible_f64")]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenLeg {
    pub user_account: Option<String>,
    pub mint: String,
    pub raw_token_amount: Option<RawTokenAmount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTokenAmount {
    #[serde(deserialize_with = "flexible_f64")]
    pub token_amount: Option<f64>,
    pub decimals: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedditListing {
    pub data: RedditListingData,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedditListingData {
    pub children: Vec<RedditChild>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedditChild {
    pub data: RedditPost,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub selftext: String,
    pub score: i64,
    pub num_comments: u64,
    pub permalink: String,
    pub created_utc: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pair_accepts_string_prices_and_nulls() {
        let raw = r#"{
            "chainId": "solana",
            "dexId": "raydium",
            "baseToken": {"address": "Mint111", "name": "Claw", "symbol": "CLAW"},
            "priceUsd": "0.00042",
            "liquidity": {"usd": 80000.5},
            "volume": {"h24": null},
            "priceChange": {"h1": 12.3, "h6": "-4.5"},
            "marketCap": 250000,
            "pairCreatedAt": 1700000000000
        }"#;

        let pair: DexPair = serde_json::from_str(raw).unwrap();
        assert_eq!(pair.price_usd, Some(0.00042));
        assert_eq!(pair.liquidity.unwrap().usd, Some(80000.5));
        assert_eq!(pair.volume.unwrap().h24, None);
        let change = pair.price_change.unwrap();
        assert_eq!(change.h1, Some(12.3));
        assert_eq!(change.h6, Some(-4.5));
        assert_eq!(change.h24, None);
        assert_eq!(pair.market_cap, Some(250000.0));
    }

    #[test]
    fn test_helius_swap_with_string_amounts() {
        let raw = r#"{
            "signature": "sig1",
            "timestamp": 1700000000,
            "events": {"swap": {
                "nativeInput": {"account": "w", "amount": "1500000000"},
                "tokenOutputs": [{"mint": "Mint111", "rawTokenAmount": {"tokenAmount": "2500000", "decimals": 6}}]
            }}
        }"#;

        let tx: IndexedTransaction = serde_json::from_str(raw).unwrap();
        let swap = tx.events.unwrap().swap.unwrap();
        assert_eq!(swap.native_input.unwrap().amount, Some(1_500_000_000.0));
        assert!(swap.native_output.is_none());
        assert_eq!(swap.token_outputs[0].mint, "Mint111");
        let raw_amount = swap.token_outputs[0].raw_token_amount.as_ref().unwrap();
        assert_eq!(raw_amount.token_amount, Some(2_500_000.0));
        assert_eq!(raw_amount.decimals, 6);
    }

    #[test]
    fn test_non_finite_strings_read_as_missing() {
        let raw = r#"{"h1": "NaN", "h6": "inf", "h24": "-infinity"}"#;
        let change: PriceChange = serde_json::from_str(raw).unwrap();
        assert_eq!(change.h1, None);
        assert_eq!(change.h6, None);
        assert_eq!(change.h24, None);

        let pair: DexPair = serde_json::from_str(r#"{"priceUsd": "NaN", "marketCap": "1e3"}"#).unwrap();
        assert_eq!(pair.price_usd, None);
        assert_eq!(pair.market_cap, Some(1000.0));
    }
}
