pub mod agent;
pub mod llm;
pub mod signal;

pub use agent::Analyst;
pub use llm::{ChatModel, ChatPrompt, OpenAiCompatibleClient};
pub use signal::{RiskLevel, Signal, SignalKind};
