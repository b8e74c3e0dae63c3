use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info};

use super::models::IndexedTransaction;
use super::HTTP_TIMEOUT;
use crate::deduplication::SignatureWindow;
use crate::error::{ClawError, Result};
use crate::evaluator::extract_large_swaps;
use crate::shutdown::Shutdown;
use crate::types::WhaleSwap;

pub const HELIUS_BASE_URL: &str = "https://api.helius.xyz/v0";
const DETECTION_FETCH_LIMIT: usize = 20;
const WALLET_PAUSE: Duration = Duration::from_millis(500);

fn short(wallet: &str) -> String {
    let head: String = wallet.chars().take(8).collect();
    format!("{}...", head)
}

/// Watches configured whale wallets through the Helius enhanced
/// transactions API.
pub struct WhaleScanner {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    wallets: Vec<String>,
    min_usd: f64,
    last_signatures: SignatureWindow,
}

impl WhaleScanner {
    pub fn new(api_key: Option<String>, wallets: Vec<String>, min_usd: f64) -> Result<Self> {
        Self::with_base_url(HELIUS_BASE_URL, api_key, wallets, min_usd)
    }

    pub fn with_base_url(
        base_url: &str,
        api_key: Option<String>,
        wallets: Vec<String>,
        min_usd: f64,
    ) -> Result<Self> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            wallets,
            min_usd,
            last_signatures: SignatureWindow::new(),
        })
    }

    /// Scanning needs both an indexer key and at least one wallet.
    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some() && !self.wallets.is_empty()
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ClawError::indexer_error("HELIUS_API_KEY not configured"))
    }

    async fn fetch_transactions(&self, wallet: &str, limit: usize) -> Result<Vec<IndexedTransaction>> {
        let url = format!("{}/addresses/{}/transactions", self.base_url, wallet);
        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("api-key", self.api_key()?), ("limit", limit.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let value: Value = response.json().await?;
        Ok(super::dex::list_or_empty(value))
    }

    pub async fn get_wallet_transactions(&self, wallet: &str, limit: usize) -> Vec<IndexedTransaction> {
        match self.fetch_transactions(wallet, limit).await {
            Ok(txs) => txs,
            Err(e) => {
                error!("WhaleScanner.get_wallet_transactions error for {}: {}", short(wallet), e);
                Vec::new()
            }
        }
    }

    async fn fetch_balances(&self, wallet: &str) -> Result<Value> {
        let url = format!("{}/addresses/{}/balances", self.base_url, wallet);
        let response = self
            .client
            .get(&url)
            .query(&[("api-key", self.api_key()?)])
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    /// Token and native balances of a wallet, as returned by the indexer.
    pub async fn get_wallet_balances(&self, wallet: &str) -> Value {
        match self.fetch_balances(wallet).await {
            Ok(balances) => balances,
            Err(e) => {
                error!("WhaleScanner.get_wallet_balances error for {}: {}", short(wallet), e);
                Value::Object(Default::default())
            }
        }
    }

    /// Large swaps by `wallet` not reported on the previous pass.
    pub async fn detect_large_swaps(&self, wallet: &str) -> Vec<WhaleSwap> {
        let txs = self.get_wallet_transactions(wallet, DETECTION_FETCH_LIMIT).await;
        let seen = self.last_signatures.window(wallet).await;

        let swaps = extract_large_swaps(wallet, &txs, self.min_usd, &seen);

        self.last_signatures
            .mark(wallet, txs.iter().map(|tx| tx.signature.clone()))
            .await;

        debug!("{}: {} transactions, {} large swaps", short(wallet), txs.len(), swaps.len());
        swaps
    }

    /// Scans each wallet in turn, pausing between them. Stops early once
    /// `shutdown` is triggered.
    pub async fn scan_all_whales(&self, shutdown: &Shutdown) -> Vec<WhaleSwap> {
        if !self.is_enabled() {
            debug!("Whale scanning disabled, skipping...");
            return Vec::new();
        }

        let mut all_swaps = Vec::new();
        for (i, wallet) in self.wallets.iter().enumerate() {
            if i > 0 && !shutdown.pause(WALLET_PAUSE).await {
                break;
            }
            all_swaps.extend(self.detect_large_swaps(wallet).await);
        }

        if !all_swaps.is_empty() {
            info!("Detected {} whale swaps across {} wallets", all_swaps.len(), self.wallets.len());
        }
        all_swaps
    }
}
