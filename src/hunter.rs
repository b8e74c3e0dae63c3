use chrono::Utc;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::analyst::{Analyst, Signal};
use crate::config::Config;
use crate::error::Result;
use crate::evaluator::OpportunityScorer;
use crate::monitoring::format::{
    format_market_brief, format_new_token, format_pump, format_signal, format_startup,
    format_whale_move,
};
use crate::monitoring::Notifier;
use crate::scanners::{DexScanner, SentimentScanner, WhaleScanner};
use crate::shutdown::Shutdown;
use crate::types::{BriefInput, MarketSnapshot, TokenContext, TrendingSummary};

const NEW_TOKENS_PER_PASS: usize = 10;
const PUMPS_PER_PASS: usize = 5;
const TRENDING_IN_BRIEF: usize = 10;
const WHALES_IN_BRIEF: usize = 5;
const RECENT_SIGNALS_IN_BRIEF: usize = 5;
const BRIEF_PUMP_THRESHOLD_PCT: f64 = 20.0;
/// Pumps at least this large (1h, either direction) also go to the analyst.
const PUMP_ANALYSIS_PCT: f64 = 100.0;
const TOKEN_PAUSE: Duration = Duration::from_secs(1);
const PUMP_PAUSE: Duration = Duration::from_millis(500);

/// Owns the scanners, the analyst and the notifier, and drives the polling
/// loops until [`AlphaHunter::shutdown`] is called.
pub struct AlphaHunter {
    config: Config,
    dex: DexScanner,
    whale: WhaleScanner,
    sentiment: SentimentScanner,
    analyst: Analyst,
    notifier: Arc<dyn Notifier>,
    scorer: OpportunityScorer,
    shutdown: Shutdown,
    briefs_sent: AtomicUsize,
}

impl AlphaHunter {
    /// Builds the production scanners from `config`.
    pub fn new(config: Config, analyst: Analyst, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let dex = DexScanner::new(config.seen_cache_capacity)?;
        let whale = WhaleScanner::new(
            config.helius_api_key.clone(),
            config.whale_wallets.clone(),
            config.whale_min_usd,
        )?;
        let sentiment = SentimentScanner::new(config.seen_cache_capacity)?;
        Ok(Self::from_parts(config, dex, whale, sentiment, analyst, notifier))
    }

    pub fn from_parts(
        config: Config,
        dex: DexScanner,
        whale: WhaleScanner,
        sentiment: SentimentScanner,
        analyst: Analyst,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            scorer: OpportunityScorer::new(config.min_alert_score),
            config,
            dex,
            whale,
            sentiment,
            analyst,
            notifier,
            shutdown: Shutdown::new(),
            briefs_sent: AtomicUsize::new(0),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.shutdown.is_triggered()
    }

    /// Stops every loop at its next check. Pending sleeps return immediately;
    /// in-flight requests are left to finish.
    pub fn shutdown(&self) {
        info!("Shutdown requested");
        self.shutdown.trigger();
    }

    /// Shuts the hunter down once `signal` resolves.
    pub fn shutdown_on<F>(self: &Arc<Self>, signal: F) -> tokio::task::JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let hunter = Arc::clone(self);
        tokio::spawn(async move {
            signal.await;
            hunter.shutdown();
        })
    }

    async fn pause(&self, duration: Duration) -> bool {
        self.shutdown.pause(duration).await
    }

    async fn notify(&self, text: String) {
        if let Err(e) = self.notifier.send_message(&text).await {
            error!("Failed to send alert: {}", e);
        }
    }

    pub fn briefs_sent(&self) -> usize {
        self.briefs_sent.load(Ordering::Relaxed)
    }

    /// Sends the startup message, then runs every loop concurrently until
    /// shutdown.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        info!("🐺 TrustClaw v{} starting...", env!("CARGO_PKG_VERSION"));
        self.config.log_feature_status();

        self.notify(format_startup(self.whale.is_enabled())).await;

        let tasks = vec![
            tokio::spawn({
                let hunter = Arc::clone(&self);
                async move { hunter.new_token_loop().await }
            }),
            tokio::spawn({
                let hunter = Arc::clone(&self);
                async move { hunter.pump_loop().await }
            }),
            tokio::spawn({
                let hunter = Arc::clone(&self);
                async move { hunter.whale_loop().await }
            }),
            tokio::spawn({
                let hunter = Arc::clone(&self);
                async move { hunter.sentiment_loop().await }
            }),
            tokio::spawn({
                let hunter = Arc::clone(&self);
                async move { hunter.brief_loop().await }
            }),
        ];

        info!("✅ All scanners running. Hunting for alpha...");

        for result in futures::future::join_all(tasks).await {
            if let Err(e) = result {
                error!("Scanner task ended abnormally: {}", e);
            }
        }

        info!("🐺 TrustClaw shutdown complete.");
        Ok(())
    }

    async fn new_token_loop(&self) {
        while self.is_running() {
            info!("🔍 Scanning for new tokens...");
            self.scan_new_tokens().await;
            if !self.pause(self.config.new_token_interval()).await {
                break;
            }
        }
    }

    async fn pump_loop(&self) {
        while self.is_running() {
            info!("📈 Scanning for pumps...");
            self.scan_pumps().await;
            if !self.pause(self.config.pump_interval()).await {
                break;
            }
        }
    }

    async fn whale_loop(&self) {
        while self.is_running() {
            self.scan_whales().await;
            if !self.pause(self.config.whale_interval()).await {
                break;
            }
        }
    }

    async fn sentiment_loop(&self) {
        while self.is_running() {
            info!("📰 Scanning sentiment...");
            let report = self.sentiment.scan_all().await;
            if report.total_signals > 0 {
                info!("Found {} social signals", report.total_signals);
            }
            if !self.pause(self.config.sentiment_interval()).await {
                break;
            }
        }
    }

    async fn brief_loop(&self) {
        while self.pause(self.config.full_analysis_interval()).await {
            self.run_brief_once().await;
        }
    }

    /// One pass over the newest pairs. Returns how many were alerted on.
    pub async fn scan_new_tokens(&self) -> usize {
        let profiles = self.dex.get_new_pairs().await;
        let mut alerted = 0;

        for profile in profiles.iter().take(NEW_TOKENS_PER_PASS) {
            if !self.is_running() {
                break;
            }
            let address = match profile.token_address.as_deref() {
                Some(address) if !address.is_empty() => address,
                _ => continue,
            };
            let snapshot = match self.dex.get_token_data(address).await {
                Some(snapshot) => snapshot,
                None => continue,
            };

            if self.process_new_token(snapshot).await.is_some() {
                alerted += 1;
            }
            if !self.pause(TOKEN_PAUSE).await {
                break;
            }
        }
        alerted
    }

    /// Age filter, score gate, new-token alert, classification and signal
    /// alert for one freshly listed token. `None` when the token was filtered
    /// out before alerting.
    pub async fn process_new_token(&self, snapshot: MarketSnapshot) -> Option<Signal> {
        if let Some(age) = snapshot.age_hours(Utc::now()) {
            if age > self.config.max_token_age_hours as f64 {
                debug!("Skipping {}: {:.1}h old", snapshot.symbol, age);
                return None;
            }
        }

        let score = self.scorer.calculate_score(&snapshot);
        if !self.scorer.should_analyze(score) {
            debug!("Skipping {}: score {}", snapshot.symbol, score);
            return None;
        }

        info!("🎯 High-score token found: {} (score: {})", snapshot.name, score);
        self.notify(format_new_token(&snapshot)).await;

        Some(self.classify_and_alert(TokenContext::new(snapshot, score)).await)
    }

    async fn classify_and_alert(&self, context: TokenContext) -> Signal {
        let signal = self.analyst.analyze_token(&context).await;
        if signal.kind.is_actionable() {
            self.notify(format_signal(&signal)).await;
        }
        signal
    }

    /// One pass over trending pumps. Returns how many were alerted on.
    pub async fn scan_pumps(&self) -> usize {
        let pumps = self.dex.scan_for_pumps(self.config.pump_threshold_pct).await;
        let mut alerted = 0;

        for pump in pumps.into_iter().take(PUMPS_PER_PASS) {
            if !self.is_running() {
                break;
            }
            if self.process_pump(pump).await {
                alerted += 1;
            }
            if !self.pause(PUMP_PAUSE).await {
                break;
            }
        }
        alerted
    }

    pub async fn process_pump(&self, pump: MarketSnapshot) -> bool {
        if pump.liquidity_usd < self.config.min_liquidity_usd || pump.volume_24h < self.config.min_volume_24h {
            debug!(
                "Ignoring thin pump {} (liq ${:.0}, vol ${:.0})",
                pump.symbol, pump.liquidity_usd, pump.volume_24h
            );
            return false;
        }

        self.notify(format_pump(&pump)).await;

        if pump.h1_change.abs() >= PUMP_ANALYSIS_PCT {
            let score = self.scorer.calculate_score(&pump);
            self.classify_and_alert(TokenContext::new(pump, score)).await;
        }
        true
    }

    pub async fn scan_whales(&self) -> usize {
        if !self.whale.is_enabled() {
            debug!("No whale wallets configured, skipping...");
            return 0;
        }

        info!("🐳 Scanning whale wallets...");
        let swaps = self.whale.scan_all_whales(&self.shutdown).await;
        for swap in &swaps {
            self.notify(format_whale_move(swap)).await;
        }
        swaps.len()
    }

    /// Gathers everything the market brief is written from.
    pub async fn build_brief_input(&self) -> BriefInput {
        let trending = self.dex.get_trending().await;
        let pumps = self.dex.scan_for_pumps(BRIEF_PUMP_THRESHOLD_PCT).await;
        let sentiment = self.sentiment.scan_all().await;
        let whale_activity = if self.whale.is_enabled() {
            self.whale.scan_all_whales(&self.shutdown).await
        } else {
            Vec::new()
        };

        let mut watchlist = Vec::new();
        for address in &self.config.watchlist {
            if let Some(snapshot) = self.dex.get_token_data(address).await {
                let score = self.scorer.calculate_score(&snapshot);
                watchlist.push(TokenContext::new(snapshot, score));
            }
        }

        BriefInput {
            new_tokens_count: self.dex.seen_pair_count().await,
            trending: trending
                .iter()
                .take(TRENDING_IN_BRIEF)
                .map(TrendingSummary::from)
                .collect(),
            pumps: pumps.into_iter().take(PUMPS_PER_PASS).collect(),
            whale_activity: whale_activity.into_iter().take(WHALES_IN_BRIEF).collect(),
            sentiment,
            watchlist,
            recent_signals: self.analyst.recent_signals(RECENT_SIGNALS_IN_BRIEF).await,
        }
    }

    pub async fn generate_brief(&self) -> String {
        info!("📊 Generating market brief...");
        let input = self.build_brief_input().await;
        self.analyst.generate_market_brief(&input).await
    }

    /// Generates a brief, sends it and returns its text.
    pub async fn run_brief_once(&self) -> String {
        let brief = self.generate_brief().await;
        self.notify(format_market_brief(&brief, Utc::now())).await;

        let count = self.briefs_sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!("✅ Market brief #{} sent", count);
        brief
    }

    /// On-demand classification of a single token.
    pub async fn analyze_address(&self, address: &str) -> Option<(TokenContext, Signal)> {
        let snapshot = self.dex.get_token_data(address).await?;
        let score = self.scorer.calculate_score(&snapshot);
        let context = TokenContext::new(snapshot, score);
        let signal = self.analyst.analyze_token(&context).await;
        Some((context, signal))
    }
}
