use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClawError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Indexer error: {0}")]
    Indexer(String),

    #[error("Sentiment error: {0}")]
    Sentiment(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging error: {0}")]
    Logging(String),
}

impl ClawError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn llm_error(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    pub fn notify_error(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }

    pub fn market_data_error(msg: impl Into<String>) -> Self {
        Self::MarketData(msg.into())
    }

    pub fn indexer_error(msg: impl Into<String>) -> Self {
        Self::Indexer(msg.into())
    }

    pub fn sentiment_error(msg: impl Into<String>) -> Self {
        Self::Sentiment(msg.into())
    }

    pub fn logging_error(msg: impl Into<String>) -> Self {
        Self::Logging(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ClawError>;
