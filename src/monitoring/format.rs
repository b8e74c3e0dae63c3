use chrono::{DateTime, Utc};

use crate::analyst::{RiskLevel, Signal, SignalKind};
use crate::config::TARGET_CHAIN;
use crate::types::{MarketSnapshot, WhaleSwap};

/// Telegram rejects bodies above 4096 characters.
pub const MAX_MESSAGE_CHARS: usize = 4000;
pub const TRUNCATION_SUFFIX: &str = "\n\n... (truncated)";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Longest entity `escape_html` emits (`&quot;`).
const MAX_ENTITY_LEN: usize = 6;

/// Backs a cut off to before a trailing entity or tag it would split.
fn trim_partial_markup(cut: &str) -> &str {
    let mut end = cut.len();
    if let Some(amp) = cut.rfind('&') {
        let closed = cut[amp..].contains(';');
        if !closed && end - amp < MAX_ENTITY_LEN {
            end = amp;
        }
    }
    let head = &cut[..end];
    if let Some(lt) = head.rfind('<') {
        if !head[lt..].contains('>') {
            end = lt;
        }
    }
    &cut[..end]
}

/// Caps a rendered message at [`MAX_MESSAGE_CHARS`] without leaving a split
/// HTML entity or tag before the suffix.
pub fn truncate_message(text: &str) -> String {
    let cut_at = match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((index, _)) => index,
        None => return text.to_string(),
    };
    let mut truncated = trim_partial_markup(&text[..cut_at]).to_string();
    truncated.push_str(TRUNCATION_SUFFIX);
    truncated
}

/// Whole dollars with thousands separators, e.g. `1,234,567`.
fn thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn signal_emoji(kind: SignalKind) -> &'static str {
    match kind {
        SignalKind::Buy => "🚀",
        SignalKind::Watch => "👀",
        SignalKind::Skip => "⏭️",
        SignalKind::Danger => "☠️",
    }
}

fn risk_emoji(risk: Option<RiskLevel>) -> &'static str {
    match risk {
        Some(RiskLevel::Low) => "🟢",
        Some(RiskLevel::Medium) => "🟡",
        Some(RiskLevel::High) => "🟠",
        Some(RiskLevel::Extreme) => "🔴",
        None => "⚪",
    }
}

fn or_na(value: &Option<String>) -> String {
    value.as_deref().map(escape_html).unwrap_or_else(|| "N/A".to_string())
}

pub fn format_new_token(snapshot: &MarketSnapshot) -> String {
    let address = escape_html(&snapshot.address);
    format!(
        "🟢 <b>NEW TOKEN DETECTED</b>\n\n\
        <b>{}</b> (${})\n\
        <code>{}</code>\n\n\
        🔗 <a href=\"{}\">DexScreener</a> | \
        <a href=\"https://solscan.io/token/{}\">Solscan</a> | \
        <a href=\"https://birdeye.so/token/{}?chain={}\">Birdeye</a>\n\n\
        <i>Analyzing...</i>",
        escape_html(&snapshot.name),
        escape_html(&snapshot.symbol),
        address,
        escape_html(&snapshot.url),
        address,
        address,
        TARGET_CHAIN,
    )
}

pub fn format_signal(signal: &Signal) -> String {
    let risk = signal.risk_level.map(|r| r.as_str()).unwrap_or("UNKNOWN");
    format!(
        "{} <b>SIGNAL: {}</b> | Confidence: {}/10\n\n\
        <b>{}</b>\n\
        {} Risk: {}\n\n\
        <b>Analysis:</b> {}\n\n\
        🎯 Target: {}\n\
        🛑 Stop: {}\n\
        ⏰ Horizon: {}\n",
        signal_emoji(signal.kind),
        signal.kind,
        signal.confidence,
        escape_html(&signal.token_name),
        risk_emoji(signal.risk_level),
        risk,
        escape_html(&signal.reasoning),
        or_na(&signal.target),
        or_na(&signal.stop_loss),
        or_na(&signal.time_horizon),
    )
}

pub fn format_whale_move(swap: &WhaleSwap) -> String {
    format!(
        "🐳 <b>WHALE ALERT</b>\n\n\
        Wallet: <code>{}</code>\n\
        Amount: ~{} SOL (~${})\n\n\
        🔗 <a href=\"{}\">View Transaction</a>",
        escape_html(&swap.wallet),
        swap.sol_amount,
        thousands(swap.usd_estimate),
        escape_html(&swap.url),
    )
}

pub fn format_pump(snapshot: &MarketSnapshot) -> String {
    let direction = if snapshot.h1_change > 0.0 { "📈" } else { "📉" };
    format!(
        "{} <b>PUMP DETECTED</b>\n\n\
        <b>{}</b> (${})\n\
        1H: {:+.1}% | 6H: {:+.1}%\n\
        Volume: ${} | Liq: ${}\n\n\
        🔗 <a href=\"{}\">DexScreener</a>",
        direction,
        escape_html(&snapshot.name),
        escape_html(&snapshot.symbol),
        snapshot.h1_change,
        snapshot.h6_change,
        thousands(snapshot.volume_24h),
        thousands(snapshot.liquidity_usd),
        escape_html(&snapshot.url),
    )
}

/// The brief body is model output and goes out escaped.
pub fn format_market_brief(brief: &str, now: DateTime<Utc>) -> String {
    format!(
        "🐺 <b>TRUSTCLAW MARKET BRIEF</b>\n<i>{}</i>\n\n{}",
        now.format("%Y-%m-%d %H:%M UTC"),
        escape_html(brief),
    )
}

pub fn format_startup(whales_enabled: bool) -> String {
    let whale_status = if whales_enabled { "✅ Whale Monitor: Active" } else { "⚪ Whale Monitor: Disabled" };
    format!(
        "🐺 <b>TrustClaw v{} ONLINE</b>\n\n\
        ✅ DEX Scanner: Active\n\
        {}\n\
        ✅ Sentiment Scanner: Active\n\
        ✅ AI Analyst: Active\n\n\
        Scanning Solana for alpha... 🚀",
        env!("CARGO_PKG_VERSION"),
        whale_status,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn snapshot() -> MarketSnapshot {
        MarketSnapshot {
            address: "Mint111".to_string(),
            name: "Claw <Dog>".to_string(),
            symbol: "CLAW".to_string(),
            volume_24h: 1_234_567.4,
            liquidity_usd: 5_000.0,
            h1_change: 120.04,
            h6_change: -3.0,
            url: "https://dexscreener.com/solana/Mint111".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a < b && c > \"d\""), "a &lt; b &amp;&amp; c &gt; &quot;d&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_truncate_message() {
        let short = "hello";
        assert_eq!(truncate_message(short), short);

        let exact = "é".repeat(MAX_MESSAGE_CHARS);
        assert_eq!(truncate_message(&exact), exact);

        let long = "x".repeat(MAX_MESSAGE_CHARS + 500);
        let truncated = truncate_message(&long);
        assert!(truncated.ends_with(TRUNCATION_SUFFIX));
        assert_eq!(
            truncated.chars().count(),
            MAX_MESSAGE_CHARS + TRUNCATION_SUFFIX.chars().count()
        );
    }

    #[test]
    fn test_truncation_never_splits_an_entity() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 0).unwrap();
        let header = format_market_brief("", now).chars().count();

        // the escaped `&amp;` run starts two characters before the cut
        let brief = format!("{}&&&&", "a".repeat(MAX_MESSAGE_CHARS - header - 2));
        let message = truncate_message(&format_market_brief(&brief, now));

        let body = message.strip_suffix(TRUNCATION_SUFFIX).unwrap();
        assert!(body.ends_with("aa"), "tail: {:?}", &body[body.len() - 12..]);
        assert!(body.chars().count() <= MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_truncation_keeps_complete_entities_and_tags() {
        for shift in 0..8 {
            let text = format!("{}{}", "x".repeat(MAX_MESSAGE_CHARS - shift), "&lt;<b>bold</b>&quot;".repeat(4));
            let body = truncate_message(&text);
            let body = body.strip_suffix(TRUNCATION_SUFFIX).unwrap();

            if let Some(amp) = body.rfind('&') {
                assert!(body[amp..].contains(';'), "split entity at shift {}", shift);
            }
            if let Some(lt) = body.rfind('<') {
                assert!(body[lt..].contains('>'), "split tag at shift {}", shift);
            }
        }
    }

    #[test]
    fn test_trim_partial_markup_leaves_plain_ampersands_far_back() {
        assert_eq!(trim_partial_markup("fish & chips forever"), "fish & chips forever");
        assert_eq!(trim_partial_markup("a &am"), "a ");
        assert_eq!(trim_partial_markup("a <a hr"), "a ");
        assert_eq!(trim_partial_markup("a &amp;"), "a &amp;");
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0.0), "0");
        assert_eq!(thousands(999.6), "1,000");
        assert_eq!(thousands(1_234_567.4), "1,234,567");
        assert_eq!(thousands(-12_345.0), "-12,345");
    }

    #[test]
    fn test_format_pump() {
        let msg = format_pump(&snapshot());
        assert!(msg.starts_with("📈 <b>PUMP DETECTED</b>"));
        assert!(msg.contains("1H: +120.0% | 6H: -3.0%"));
        assert!(msg.contains("Volume: $1,234,567 | Liq: $5,000"));
        assert!(msg.contains("Claw &lt;Dog&gt;"));
    }

    #[test]
    fn test_format_new_token_links() {
        let msg = format_new_token(&snapshot());
        assert!(msg.contains("<code>Mint111</code>"));
        assert!(msg.contains("https://solscan.io/token/Mint111"));
        assert!(msg.contains("https://birdeye.so/token/Mint111?chain=solana"));
    }

    #[test]
    fn test_format_signal() {
        let mut signal = Signal::degraded("rug <script>", "Mint111", "Claw");
        signal.kind = SignalKind::Buy;
        signal.confidence = 8;
        signal.risk_level = Some(RiskLevel::High);
        signal.target = Some("2x".to_string());

        let msg = format_signal(&signal);
        assert!(msg.starts_with("🚀 <b>SIGNAL: BUY</b> | Confidence: 8/10"));
        assert!(msg.contains("🟠 Risk: HIGH"));
        assert!(msg.contains("rug &lt;script&gt;"));
        assert!(msg.contains("🎯 Target: 2x"));
        assert!(msg.contains("🛑 Stop: N/A"));
    }

    #[test]
    fn test_format_market_brief_header() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 5, 0).unwrap();
        let msg = format_market_brief("Quiet market", now);
        assert!(msg.contains("<i>2026-03-01 09:05 UTC</i>"));
        assert!(msg.ends_with("Quiet market"));
    }

    #[test]
    fn test_format_startup_reflects_whales() {
        assert!(format_startup(true).contains("Whale Monitor: Active"));
        assert!(format_startup(false).contains("Whale Monitor: Disabled"));
    }
}
