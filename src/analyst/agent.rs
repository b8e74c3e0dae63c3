use serde::Serialize;
use tracing::{error, info};

use super::llm::{ChatModel, ChatPrompt};
use super::signal::{parse_verdict, Signal, SignalHistory, PARSE_FAILED_REASON};
use crate::types::{BriefInput, TokenContext};

const BRIEF_ITEMS: usize = 5;

/// LLM-backed analyst: classifies tokens and writes market briefs.
///
/// Neither entry point returns an error. Classification degrades to a SKIP
/// signal with confidence 0; brief generation degrades to an apology text.
pub struct Analyst {
    model: Box<dyn ChatModel>,
    history: SignalHistory,
}

impl Analyst {
    pub fn new(model: Box<dyn ChatModel>, history_limit: usize) -> Self {
        Self {
            model,
            history: SignalHistory::new(history_limit),
        }
    }

    pub async fn analyze_token(&self, context: &TokenContext) -> Signal {
        let snapshot = &context.snapshot;
        info!("Analyzing {} ({}) with LLM...", snapshot.name, snapshot.address);

        let prompt = match self.token_prompt(context) {
            Ok(prompt) => prompt,
            Err(e) => {
                error!("Failed to serialize token context: {}", e);
                return Signal::degraded(format!("Analysis error: {}", e), &snapshot.address, &snapshot.name);
            }
        };

        let response = match self.model.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("Analyst.analyze_token error: {}", e);
                return Signal::degraded(format!("Analysis error: {}", e), &snapshot.address, &snapshot.name);
            }
        };

        match parse_verdict(&response) {
            Ok(verdict) => {
                let signal = Signal::from_verdict(verdict, &snapshot.address, &snapshot.name);
                info!(
                    "Signal for {}: {} (confidence {}/10)",
                    signal.token_name, signal.kind, signal.confidence
                );
                self.history.push(signal.clone()).await;
                signal
            }
            Err(e) => {
                error!("Failed to parse analyst response as JSON: {}", e);
                error!("Raw response: {}", response);
                Signal::degraded(PARSE_FAILED_REASON, &snapshot.address, &snapshot.name)
            }
        }
    }

    pub async fn generate_market_brief(&self, input: &BriefInput) -> String {
        info!("Generating market brief...");
        let prompt = self.brief_prompt(input);

        match self.model.complete(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                error!("Analyst.generate_market_brief error: {}", e);
                format!("⚠️ Market brief generation failed: {}", e)
            }
        }
    }

    pub async fn recent_signals(&self, n: usize) -> Vec<Signal> {
        self.history.recent(n).await
    }

    pub async fn signal_count(&self) -> usize {
        self.history.len().await
    }

    fn token_prompt(&self, context: &TokenContext) -> serde_json::Result<ChatPrompt> {
        let token_data = serde_json::to_string_pretty(context)?;

        let user = format!(
            "You are TrustClaw, an elite Solana alpha hunter AI. Analyze this token and give a trading signal.\n\n\
            TOKEN DATA:\n{}\n\n\
            Evaluate on these criteria:\n\
            1. LIQUIDITY: Is there enough liquidity (>$5k)? Low liquidity = rug risk\n\
            2. VOLUME: Is 24h volume healthy relative to market cap?\n\
            3. MOMENTUM: Price action - is it pumping organically or artificially?\n\
            4. AGE: How old is the token? New (<1h) = higher risk but higher reward\n\
            5. SOCIAL: Any social signals or hype around it?\n\
            6. RUG RISK: Contract renounced? Liquidity locked? Top holders concentrated?\n\n\
            Respond in this EXACT JSON format:\n\
            {{\n\
            \x20   \"signal\": \"BUY\" | \"WATCH\" | \"SKIP\" | \"DANGER\",\n\
            \x20   \"confidence\": 1-10,\n\
            \x20   \"risk_level\": \"LOW\" | \"MEDIUM\" | \"HIGH\" | \"EXTREME\",\n\
            \x20   \"reasoning\": \"2-3 sentence explanation\",\n\
            \x20   \"entry_price\": \"suggested entry or 'market'\",\n\
            \x20   \"target\": \"price target or percentage\",\n\
            \x20   \"stop_loss\": \"suggested stop loss\",\n\
            \x20   \"time_horizon\": \"scalp (mins) | swing (hours) | hold (days)\"\n\
            }}\n\n\
            Be BRUTALLY honest. Most tokens are scams. Only signal BUY for genuinely interesting opportunities.",
            token_data
        );

        Ok(ChatPrompt {
            system: "You are a crypto trading analyst. Respond only in valid JSON.".to_string(),
            user,
            temperature: 0.3,
            max_tokens: 500,
        })
    }

    fn brief_prompt(&self, input: &BriefInput) -> ChatPrompt {
        let user = format!(
            "You are TrustClaw, a Solana alpha hunting AI. Generate a concise market brief from this data.\n\n\
            SCANNER DATA:\n\
            - New tokens found: {}\n\
            - Pumping tokens: {}\n\
            - Whale activity: {}\n\
            - Social signals: {}\n\
            - Trending tokens: {}\n\
            - Watchlist: {}\n\
            - Recent AI signals: {}\n\n\
            Generate a Telegram-friendly brief (use emojis, keep it scannable):\n\
            1. Top 3 opportunities right now (with reasoning)\n\
            2. Any danger signals / rugs detected\n\
            3. Overall market sentiment (bullish/bearish/neutral)\n\
            4. Actionable next steps\n\n\
            Keep it under 2000 characters. Be direct and actionable.",
            input.new_tokens_count,
            first_as_json(&input.pumps),
            first_as_json(&input.whale_activity),
            first_as_json(&input.sentiment.posts),
            first_as_json(&input.trending),
            first_as_json(&input.watchlist),
            first_as_json(&input.recent_signals),
        );

        ChatPrompt {
            system: "You are a concise crypto market analyst. Use emojis. Be direct.".to_string(),
            user,
            temperature: 0.5,
            max_tokens: 1000,
        }
    }
}

fn first_as_json<T: Serialize>(items: &[T]) -> String {
    let head = &items[..items.len().min(BRIEF_ITEMS)];
    serde_json::to_string(head).unwrap_or_else(|_| "[]".to_string())
}
