use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use trustclaw::analyst::{Analyst, ChatModel, ChatPrompt};
use trustclaw::config::Config;
use trustclaw::monitoring::format::format_market_brief;
use trustclaw::monitoring::Notifier;
use trustclaw::scanners::{DexScanner, SentimentScanner, WhaleScanner};
use trustclaw::types::BriefInput;
use trustclaw::{AlphaHunter, ClawError, Result};

// Nothing listens on the discard port, so every scanner call fails fast.
const UNREACHABLE: &str = "http://127.0.0.1:9";

struct ScriptedModel {
    reply: std::result::Result<&'static str, &'static str>,
    prompts: Arc<Mutex<Vec<ChatPrompt>>>,
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        self.prompts.lock().await.push(prompt.clone());
        match self.reply {
            Ok(text) => Ok(text.to_string()),
            Err(e) => Err(ClawError::llm_error(e)),
        }
    }
}

#[derive(Default)]
struct Outbox {
    messages: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for Outbox {
    async fn send_message(&self, text: &str) -> Result<()> {
        self.messages.lock().await.push(text.to_string());
        Ok(())
    }
}

fn offline_hunter(model: ScriptedModel, outbox: Arc<Outbox>) -> AlphaHunter {
    let config = Config {
        watchlist: vec!["WatchMint111".to_string()],
        ..Config::default()
    };
    let dex = DexScanner::with_base_url(UNREACHABLE, 100).unwrap();
    let whale = WhaleScanner::with_base_url(UNREACHABLE, None, vec![], config.whale_min_usd).unwrap();
    let sentiment = SentimentScanner::with_sources(UNREACHABLE, vec![format!("{}/news", UNREACHABLE)], 100).unwrap();
    let analyst = Analyst::new(Box::new(model), config.signal_history_limit);
    AlphaHunter::from_parts(config, dex, whale, sentiment, analyst, outbox)
}

#[tokio::test]
async fn empty_market_still_produces_a_brief() {
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let model = ScriptedModel {
        reply: Ok("🟡 Quiet market. Nothing worth buying."),
        prompts: Arc::clone(&prompts),
    };
    let analyst = Analyst::new(Box::new(model), 10);

    let brief = analyst.generate_market_brief(&BriefInput::default()).await;
    assert!(!brief.is_empty());

    let message = format_market_brief(&brief, Utc::now());
    assert!(message.contains("TRUSTCLAW MARKET BRIEF"));
    assert!(message.contains("Quiet market"));

    let prompts = prompts.lock().await;
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].user.contains("New tokens found: 0"));
    assert_eq!(prompts[0].max_tokens, 1000);
}

#[tokio::test]
async fn brief_cycle_survives_every_source_failing() {
    let outbox = Arc::new(Outbox::default());
    let model = ScriptedModel {
        reply: Ok("Nothing moving today"),
        prompts: Arc::new(Mutex::new(Vec::new())),
    };
    let hunter = offline_hunter(model, Arc::clone(&outbox));

    let brief = hunter.run_brief_once().await;
    assert_eq!(brief, "Nothing moving today");
    assert_eq!(hunter.briefs_sent(), 1);

    let messages = outbox.messages.lock().await;
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("🐺 <b>TRUSTCLAW MARKET BRIEF</b>"));
    assert!(messages[0].ends_with("Nothing moving today"));
}

#[tokio::test]
async fn failed_model_is_reported_in_the_brief() {
    let outbox = Arc::new(Outbox::default());
    let model = ScriptedModel {
        reply: Err("quota exceeded"),
        prompts: Arc::new(Mutex::new(Vec::new())),
    };
    let hunter = offline_hunter(model, Arc::clone(&outbox));

    let brief = hunter.run_brief_once().await;
    assert!(brief.starts_with("⚠️ Market brief generation failed:"));
    assert!(brief.contains("quota exceeded"));
    assert_eq!(outbox.messages.lock().await.len(), 1);
}

#[tokio::test]
async fn analyze_unknown_address_yields_nothing_offline() {
    let model = ScriptedModel {
        reply: Ok("{}"),
        prompts: Arc::new(Mutex::new(Vec::new())),
    };
    let hunter = offline_hunter(model, Arc::new(Outbox::default()));
    assert!(hunter.analyze_address("Mint111").await.is_none());
    assert_eq!(hunter.scan_new_tokens().await, 0);
    assert_eq!(hunter.scan_pumps().await, 0);
}
