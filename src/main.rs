use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use trustclaw::analyst::{Analyst, OpenAiCompatibleClient};
use trustclaw::config::{self, Config};
use trustclaw::logging;
use trustclaw::monitoring::format::format_signal;
use trustclaw::monitoring::TelegramNotifier;
use trustclaw::shutdown::termination_signal;
use trustclaw::AlphaHunter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every scanner loop until interrupted
    Start,
    /// Generate one market brief
    Brief {
        /// Also deliver the brief to Telegram
        #[arg(long)]
        send: bool,
    },
    /// Score and classify a single token
    Analyze {
        /// Token mint address
        address: String,
    },
    /// Validate configuration without touching the network
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_dir = std::env::var("LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(logging::DEFAULT_LOG_DIR));
    let _log_guard = logging::init(&log_dir, cli.verbose).context("initializing logging failed")?;

    let config = config::load_config().await?;

    match cli.command {
        Some(Commands::Start) => run_trustclaw(config).await?,
        Some(Commands::Brief { send }) => {
            let hunter = build_hunter(config)?;
            let brief = if send {
                hunter.run_brief_once().await
            } else {
                hunter.generate_brief().await
            };
            println!("{}", brief);
        }
        Some(Commands::Analyze { address }) => {
            let hunter = build_hunter(config)?;
            match hunter.analyze_address(&address).await {
                Some((context, signal)) => {
                    println!("{} ({}) score {}/100", context.snapshot.name, context.snapshot.symbol, context.score);
                    println!("{}", format_signal(&signal));
                }
                None => warn!("No Solana market data found for {}", address),
            }
        }
        Some(Commands::Check) => check_config(&config)?,
        None => {
            info!("No command specified. Use --help for available commands.");
        }
    }

    Ok(())
}

fn build_hunter(config: Config) -> Result<AlphaHunter> {
    let credentials = config
        .llm_credentials()
        .context("AI analysis needs GROQ_API_KEY or OPENAI_API_KEY")?;
    let base_url = credentials.base_url.clone();
    let client = OpenAiCompatibleClient::new(credentials).context("building LLM client failed")?;
    info!("Using model {} at {}", client.model(), base_url);

    let analyst = Analyst::new(Box::new(client), config.signal_history_limit);
    let notifier = TelegramNotifier::new(config.telegram_bot_token.clone(), config.telegram_chat_id.clone())
        .context("building Telegram client failed")?;

    AlphaHunter::new(config, analyst, Arc::new(notifier)).context("building scanners failed")
}

async fn run_trustclaw(config: Config) -> Result<()> {
    let hunter = Arc::new(build_hunter(config)?);

    let signal = termination_signal().context("installing signal handlers failed")?;
    hunter.shutdown_on(signal);

    hunter.run().await?;
    Ok(())
}

fn check_config(config: &Config) -> Result<()> {
    let credentials = config
        .llm_credentials()
        .context("AI analysis needs GROQ_API_KEY or OPENAI_API_KEY")?;
    info!("LLM: {} via {}", credentials.model, credentials.base_url);
    config.log_feature_status();
    info!(
        "Intervals: new tokens {}s, pumps {}s, whales {}s, sentiment {}s, brief {}s",
        config.new_token_interval().as_secs(),
        config.pump_interval().as_secs(),
        config.whale_interval().as_secs(),
        config.sentiment_interval().as_secs(),
        config.full_analysis_interval().as_secs(),
    );
    info!("Configuration OK");
    Ok(())
}
