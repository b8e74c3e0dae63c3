use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, warn};

use super::format::truncate_message;
use crate::error::{ClawError, Result};
use crate::scanners::HTTP_TIMEOUT;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Delivery channel for formatted alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<()>;
}

pub struct TelegramNotifier {
    bot_token: Option<String>,
    chat_id: Option<String>,
    api_url: String,
    client: Client,
    warned_unconfigured: AtomicBool,
}

impl TelegramNotifier {
    pub fn new(bot_token: Option<String>, chat_id: Option<String>) -> Result<Self> {
        Self::with_api_url(TELEGRAM_API_URL, bot_token, chat_id)
    }

    pub fn with_api_url(api_url: &str, bot_token: Option<String>, chat_id: Option<String>) -> Result<Self> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            bot_token,
            chat_id,
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
            warned_unconfigured: AtomicBool::new(false),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<()> {
        let (bot_token, chat_id) = match (&self.bot_token, &self.chat_id) {
            (Some(token), Some(chat)) => (token, chat),
            _ => {
                if !self.warned_unconfigured.swap(true, Ordering::Relaxed) {
                    warn!("Telegram not configured - alerts are disabled");
                }
                return Ok(());
            }
        };

        let url = format!("{}/bot{}/sendMessage", self.api_url, bot_token);
        let response = self
            .client
            .post(&url)
            .json(&json!({
                "chat_id": chat_id,
                "text": truncate_message(text),
                "parse_mode": "HTML",
                "disable_web_page_preview": true,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Telegram send error ({}): {}", status, body);
            return Err(ClawError::notify_error(format!("Telegram API {}: {}", status, body)));
        }

        debug!("Telegram message delivered");
        Ok(())
    }
}
