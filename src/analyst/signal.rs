use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use tokio::sync::Mutex;

use crate::scanners::models::flexible_f64;

pub const PARSE_FAILED_REASON: &str = "Analysis failed - could not parse LLM response";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Watch,
    Skip,
    Danger,
}

impl SignalKind {
    /// BUY and WATCH are worth a Telegram alert.
    pub fn is_actionable(&self) -> bool {
        matches!(self, SignalKind::Buy | SignalKind::Watch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Buy => "BUY",
            SignalKind::Watch => "WATCH",
            SignalKind::Skip => "SKIP",
            SignalKind::Danger => "DANGER",
        }
    }
}

impl FromStr for SignalKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(SignalKind::Buy),
            "WATCH" => Ok(SignalKind::Watch),
            "SKIP" => Ok(SignalKind::Skip),
            "DANGER" => Ok(SignalKind::Danger),
            other => Err(format!("unknown signal '{}'", other)),
        }
    }
}

impl<'de> Deserialize<'de> for SignalKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Extreme => "EXTREME",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(RiskLevel::Low),
            "MEDIUM" => Ok(RiskLevel::Medium),
            "HIGH" => Ok(RiskLevel::High),
            "EXTREME" => Ok(RiskLevel::Extreme),
            other => Err(format!("unknown risk level '{}'", other)),
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognised risk label is dropped rather than failing the verdict.
fn lenient_risk<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|r| r.parse().ok()))
}

/// Advisory fields come back as strings or bare numbers.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}

/// The JSON object the model is asked to return.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelVerdict {
    pub signal: SignalKind,
    #[serde(default, deserialize_with = "flexible_f64")]
    pub confidence: Option<f64>,
    #[serde(default, deserialize_with = "lenient_risk")]
    pub risk_level: Option<RiskLevel>,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub entry_price: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub stop_loss: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub time_horizon: Option<String>,
}

/// Classification of one token.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    #[serde(rename = "signal")]
    pub kind: SignalKind,
    /// 1-10, or 0 when classification failed.
    pub confidence: u8,
    pub risk_level: Option<RiskLevel>,
    pub reasoning: String,
    pub entry_price: Option<String>,
    pub target: Option<String>,
    pub stop_loss: Option<String>,
    pub time_horizon: Option<String>,
    pub token_address: String,
    pub token_name: String,
    pub analyzed_at: DateTime<Utc>,
}

impl Signal {
    pub fn from_verdict(verdict: ModelVerdict, token_address: &str, token_name: &str) -> Self {
        let confidence = verdict
            .confidence
            .filter(|c| c.is_finite())
            .map(|c| c.round().clamp(1.0, 10.0) as u8)
            .unwrap_or(1);

        Self {
            kind: verdict.signal,
            confidence,
            risk_level: verdict.risk_level,
            reasoning: verdict.reasoning,
            entry_price: verdict.entry_price,
            target: verdict.target,
            stop_loss: verdict.stop_loss,
            time_horizon: verdict.time_horizon,
            token_address: token_address.to_string(),
            token_name: token_name.to_string(),
            analyzed_at: Utc::now(),
        }
    }

    /// The SKIP sentinel returned whenever classification fails.
    pub fn degraded(reasoning: impl Into<String>, token_address: &str, token_name: &str) -> Self {
        Self {
            kind: SignalKind::Skip,
            confidence: 0,
            risk_level: None,
            reasoning: reasoning.into(),
            entry_price: None,
            target: None,
            stop_loss: None,
            time_horizon: None,
            token_address: token_address.to_string(),
            token_name: token_name.to_string(),
            analyzed_at: Utc::now(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.kind == SignalKind::Skip && self.confidence == 0
    }
}

/// Strips a ```json / ``` fence if the model wrapped its answer in one.
pub fn extract_json_block(text: &str) -> &str {
    if let Some((_, rest)) = text.split_once("```json") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    if let Some((_, rest)) = text.split_once("```") {
        return rest.split("```").next().unwrap_or(rest).trim();
    }
    text.trim()
}

pub fn parse_verdict(text: &str) -> serde_json::Result<ModelVerdict> {
    serde_json::from_str(extract_json_block(text))
}

/// Most recent signals, oldest evicted first.
pub struct SignalHistory {
    limit: usize,
    entries: Mutex<VecDeque<Signal>>,
}

impl SignalHistory {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            limit,
            entries: Mutex::new(VecDeque::with_capacity(limit.min(1024))),
        }
    }

    pub async fn push(&self, signal: Signal) {
        let mut entries = self.entries.lock().await;
        if entries.len() == self.limit {
            entries.pop_front();
        }
        entries.push_back(signal);
    }

    /// Up to `n` signals, newest first.
    pub async fn recent(&self, n: usize) -> Vec<Signal> {
        self.entries.lock().await.iter().rev().take(n).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
