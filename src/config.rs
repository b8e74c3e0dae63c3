use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::{ClawError, Result};

pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const TARGET_CHAIN: &str = "solana";

/// Which chat-completions backend the analyst talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmCredentials {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub llm_model: String,

    pub helius_api_key: Option<String>,

    // Scan intervals (seconds)
    pub new_token_scan_interval: u64,
    pub whale_scan_interval: u64,
    pub sentiment_scan_interval: u64,
    pub full_analysis_interval: u64,

    // Thresholds
    pub min_liquidity_usd: f64,
    pub min_volume_24h: f64,
    pub max_token_age_hours: u64,
    pub whale_min_usd: f64,
    pub pump_threshold_pct: f64,
    pub min_alert_score: f64,

    pub watchlist: Vec<String>,
    pub whale_wallets: Vec<String>,

    pub seen_cache_capacity: usize,
    pub signal_history_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram_bot_token: None,
            telegram_chat_id: None,
            groq_api_key: None,
            openai_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            helius_api_key: None,
            new_token_scan_interval: 30,
            whale_scan_interval: 60,
            sentiment_scan_interval: 300,
            full_analysis_interval: 3600,
            min_liquidity_usd: 5_000.0,
            min_volume_24h: 10_000.0,
            max_token_age_hours: 24,
            whale_min_usd: 10_000.0,
            pump_threshold_pct: 50.0,
            min_alert_score: 40.0,
            watchlist: Vec::new(),
            whale_wallets: Vec::new(),
            seen_cache_capacity: 10_000,
            signal_history_limit: 500,
        }
    }
}

impl Config {
    /// Builds a config from an arbitrary key lookup. Unset or blank keys keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Config::default();

        config.telegram_bot_token = get("TELEGRAM_BOT_TOKEN");
        config.telegram_chat_id = get("TELEGRAM_CHAT_ID");
        config.groq_api_key = get("GROQ_API_KEY");
        config.openai_api_key = get("OPENAI_API_KEY");
        config.helius_api_key = get("HELIUS_API_KEY");

        if let Some(model) = get("LLM_MODEL") {
            config.llm_model = model;
        }

        config.new_token_scan_interval =
            parse_or_default("NEW_TOKEN_SCAN_INTERVAL", get("NEW_TOKEN_SCAN_INTERVAL"), config.new_token_scan_interval);
        config.whale_scan_interval =
            parse_or_default("WHALE_SCAN_INTERVAL", get("WHALE_SCAN_INTERVAL"), config.whale_scan_interval);
        config.sentiment_scan_interval =
            parse_or_default("SENTIMENT_SCAN_INTERVAL", get("SENTIMENT_SCAN_INTERVAL"), config.sentiment_scan_interval);
        config.full_analysis_interval =
            parse_or_default("FULL_ANALYSIS_INTERVAL", get("FULL_ANALYSIS_INTERVAL"), config.full_analysis_interval);

        config.min_liquidity_usd =
            parse_or_default("MIN_LIQUIDITY_USD", get("MIN_LIQUIDITY_USD"), config.min_liquidity_usd);
        config.min_volume_24h = parse_or_default("MIN_VOLUME_24H", get("MIN_VOLUME_24H"), config.min_volume_24h);
        config.max_token_age_hours =
            parse_or_default("MAX_TOKEN_AGE_HOURS", get("MAX_TOKEN_AGE_HOURS"), config.max_token_age_hours);
        config.whale_min_usd = parse_or_default("WHALE_MIN_USD", get("WHALE_MIN_USD"), config.whale_min_usd);
        config.pump_threshold_pct =
            parse_or_default("PUMP_THRESHOLD_PCT", get("PUMP_THRESHOLD_PCT"), config.pump_threshold_pct);
        config.min_alert_score = parse_or_default("MIN_ALERT_SCORE", get("MIN_ALERT_SCORE"), config.min_alert_score);

        config.seen_cache_capacity =
            parse_or_default("SEEN_CACHE_CAPACITY", get("SEEN_CACHE_CAPACITY"), config.seen_cache_capacity);
        config.signal_history_limit =
            parse_or_default("SIGNAL_HISTORY_LIMIT", get("SIGNAL_HISTORY_LIMIT"), config.signal_history_limit);

        if let Some(list) = get("WATCHLIST") {
            config.watchlist = parse_list(&list);
        }
        if let Some(list) = get("WHALE_WALLETS") {
            config.whale_wallets = parse_list(&list);
        }

        config
    }

    /// Resolves the classification backend. Groq wins when both keys are set.
    pub fn llm_credentials(&self) -> Result<LlmCredentials> {
        if let Some(key) = &self.groq_api_key {
            return Ok(LlmCredentials {
                base_url: GROQ_BASE_URL.to_string(),
                api_key: key.clone(),
                model: self.llm_model.clone(),
            });
        }

        if let Some(key) = &self.openai_api_key {
            return Ok(LlmCredentials {
                base_url: OPENAI_BASE_URL.to_string(),
                api_key: key.clone(),
                model: self.llm_model.clone(),
            });
        }

        Err(ClawError::config_error(
            "GROQ_API_KEY (or OPENAI_API_KEY) not set - AI analysis cannot run",
        ))
    }

    pub fn telegram_enabled(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }

    pub fn whale_scanning_enabled(&self) -> bool {
        self.helius_api_key.is_some() && !self.whale_wallets.is_empty()
    }

    pub fn new_token_interval(&self) -> Duration {
        Duration::from_secs(self.new_token_scan_interval)
    }

    pub fn pump_interval(&self) -> Duration {
        Duration::from_secs(self.new_token_scan_interval * 2)
    }

    pub fn whale_interval(&self) -> Duration {
        Duration::from_secs(self.whale_scan_interval)
    }

    pub fn sentiment_interval(&self) -> Duration {
        Duration::from_secs(self.sentiment_scan_interval)
    }

    pub fn full_analysis_interval(&self) -> Duration {
        Duration::from_secs(self.full_analysis_interval)
    }

    /// Logs the one-time warnings for optional features that stay disabled.
    pub fn log_feature_status(&self) {
        if !self.telegram_enabled() {
            warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set - alerts will be disabled");
        }
        if self.helius_api_key.is_none() {
            warn!("HELIUS_API_KEY not set - whale scanning will be disabled");
        } else if self.whale_wallets.is_empty() {
            info!("No whale wallets configured - whale scanning is idle");
        }
        if !self.watchlist.is_empty() {
            info!("Watchlist: {} tokens", self.watchlist.len());
        }
    }
}

pub async fn load_config() -> Result<Config> {
    let config = Config::from_lookup(|key| env::var(key).ok());
    info!(
        "Loaded configuration (model: {}, new-token interval: {}s)",
        config.llm_model, config.new_token_scan_interval
    );
    Ok(config)
}

fn parse_or_default<T>(key: &str, raw: Option<String>, default: T) -> T
where
    T: FromStr + Display + Copy,
{
    match raw {
        Some(value) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!("Invalid value '{}' for {}, using default {}", value, key, default);
                default
            }
        },
        None => default,
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
