use chrono::Utc;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{debug, error, info};

use super::models::RedditListing;
use super::HTTP_TIMEOUT;
use crate::deduplication::SeenSet;
use crate::error::{ClawError, Result};
use crate::types::{SentimentReport, SocialPost};

pub const REDDIT_BASE_URL: &str = "https://www.reddit.com";
pub const SUBREDDITS: [&str; 3] = ["solana", "CryptoMoonShots", "defi"];
pub const NEWS_URLS: &[&str] = &["https://solana.com/news"];

const REDDIT_USER_AGENT: &str = "TrustClaw/1.0 (Solana Alpha Scanner)";
const REDDIT_LIMIT: usize = 25;
const MAX_HEADLINES: usize = 10;
const MIN_HEADLINE_LEN: usize = 10;
const POST_TEXT_CHARS: usize = 500;

const KEYWORDS: &[&str] = &[
    "gem", "launch", "pump", "moon", "airdrop", "100x", "solana", "sol", "raydium", "jupiter",
    "pump.fun", "new token", "presale", "listing", "dex",
];

/// True when the title mentions anything actionable.
pub fn matches_keywords(title: &str) -> bool {
    let title = title.to_lowercase();
    KEYWORDS.iter().any(|kw| title.contains(kw))
}

/// Up to ten `h1`-`h3` headlines longer than ten characters.
pub fn extract_headlines(html: &str, source_url: &str) -> Result<Vec<SocialPost>> {
    let selector = Selector::parse("h1, h2, h3")
        .map_err(|e| ClawError::sentiment_error(format!("bad headline selector: {:?}", e)))?;
    let document = Html::parse_document(html);

    let headlines = document
        .select(&selector)
        .take(MAX_HEADLINES)
        .map(|el| {
            el.text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|text| text.chars().count() > MIN_HEADLINE_LEN)
        .map(|title| SocialPost {
            source: source_url.to_string(),
            title,
            text: String::new(),
            score: 0,
            comments: 0,
            url: source_url.to_string(),
            created: 0,
        })
        .collect();

    Ok(headlines)
}

/// Crawls Reddit and Solana news for social signals.
pub struct SentimentScanner {
    client: Client,
    reddit_base_url: String,
    news_urls: Vec<String>,
    seen_posts: SeenSet,
}

impl SentimentScanner {
    pub fn new(seen_capacity: usize) -> Result<Self> {
        let news_urls = NEWS_URLS.iter().map(|url| url.to_string()).collect();
        Self::with_sources(REDDIT_BASE_URL, news_urls, seen_capacity)
    }

    pub fn with_sources(reddit_base_url: &str, news_urls: Vec<String>, seen_capacity: usize) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(REDDIT_USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            reddit_base_url: reddit_base_url.trim_end_matches('/').to_string(),
            news_urls,
            seen_posts: SeenSet::new("social-posts", seen_capacity),
        })
    }

    async fn fetch_reddit(&self, subreddit: &str, limit: usize) -> Result<Vec<SocialPost>> {
        let url = format!("{}/r/{}/new/.json", self.reddit_base_url, subreddit);
        let limit = limit.to_string();
        let listing: RedditListing = self
            .client
            .get(&url)
            .query(&[("limit", limit.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(self.collect_posts(subreddit, listing).await)
    }

    /// Unseen posts whose title matches a keyword. Every post id is marked,
    /// matching or not.
    async fn collect_posts(&self, subreddit: &str, listing: RedditListing) -> Vec<SocialPost> {
        let mut posts = Vec::new();
        for child in listing.data.children {
            let post = child.data;
            if !self.seen_posts.check_and_mark(&post.id).await {
                continue;
            }
            if !matches_keywords(&post.title) {
                continue;
            }
            posts.push(SocialPost {
                source: format!("r/{}", subreddit),
                text: post.selftext.chars().take(POST_TEXT_CHARS).collect(),
                title: post.title,
                score: post.score,
                comments: post.num_comments,
                url: format!("https://reddit.com{}", post.permalink),
                created: post.created_utc as i64,
            });
        }
        posts
    }

    pub async fn scan_reddit(&self, subreddit: &str) -> Vec<SocialPost> {
        match self.fetch_reddit(subreddit, REDDIT_LIMIT).await {
            Ok(posts) => posts,
            Err(e) => {
                error!("SentimentScanner.scan_reddit error for r/{}: {}", subreddit, e);
                Vec::new()
            }
        }
    }

    async fn fetch_news(&self, url: &str) -> Result<Vec<SocialPost>> {
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            debug!("News page {} returned {}", url, response.status());
            return Ok(Vec::new());
        }
        let html = response.text().await?;
        extract_headlines(&html, url)
    }

    pub async fn scan_solana_news(&self) -> Vec<SocialPost> {
        let mut news = Vec::new();
        for url in &self.news_urls {
            match self.fetch_news(url).await {
                Ok(items) => news.extend(items),
                Err(e) => error!("SentimentScanner.scan_solana_news error for {}: {}", url, e),
            }
        }
        news
    }

    /// Runs every source concurrently and merges the results, best scored
    /// post first.
    pub async fn scan_all(&self) -> SentimentReport {
        let (solana, moonshots, defi, news) = futures::join!(
            self.scan_reddit(SUBREDDITS[0]),
            self.scan_reddit(SUBREDDITS[1]),
            self.scan_reddit(SUBREDDITS[2]),
            self.scan_solana_news(),
        );

        let mut posts: Vec<SocialPost> = solana
            .into_iter()
            .chain(moonshots)
            .chain(defi)
            .chain(news)
            .collect();
        posts.sort_by(|a, b| b.score.cmp(&a.score));

        info!("Sentiment scan collected {} posts", posts.len());
        SentimentReport {
            total_signals: posts.len(),
            posts,
            scanned_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"{
        "data": {"children": [
            {"data": {"id": "p1", "title": "New GEM launching on Raydium", "selftext": "details", "score": 42, "num_comments": 7, "permalink": "/r/solana/comments/p1/", "created_utc": 1700000000.0}},
            {"data": {"id": "p2", "title": "My cat is cute", "selftext": "", "score": 900, "num_comments": 1, "permalink": "/r/solana/comments/p2/", "created_utc": 1700000001.0}},
            {"data": {"id": "p3", "title": "Airdrop checker thread", "score": 3, "permalink": "/r/solana/comments/p3/"}}
        ]}
    }"#;

    #[test]
    fn test_keywords_are_case_insensitive() {
        assert!(matches_keywords("Next 100X on PUMP.FUN"));
        assert!(matches_keywords("Jupiter LFG"));
        assert!(!matches_keywords("Weekly dog pictures"));
    }

    #[tokio::test]
    async fn test_collect_posts_filters_and_dedups() {
        let scanner = SentimentScanner::new(100).unwrap();
        let listing: RedditListing = serde_json::from_str(LISTING).unwrap();

        let posts = scanner.collect_posts("solana", listing.clone()).await;
        let ids: Vec<&str> = posts.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            ids,
            vec!["https://reddit.com/r/solana/comments/p1/", "https://reddit.com/r/solana/comments/p3/"]
        );
        assert_eq!(posts[0].source, "r/solana");
        assert_eq!(posts[0].score, 42);
        assert_eq!(posts[0].comments, 7);
        assert_eq!(posts[0].created, 1_700_000_000);

        // second pass: everything (including the non-matching post) is already seen
        assert!(scanner.collect_posts("solana", listing).await.is_empty());
    }

    #[tokio::test]
    async fn test_post_text_is_truncated() {
        let scanner = SentimentScanner::new(100).unwrap();
        let long = "x".repeat(2_000);
        let raw = format!(
            r#"{{"data": {{"children": [{{"data": {{"id": "long", "title": "sol update", "selftext": "{}"}}}}]}}}}"#,
            long
        );
        let listing: RedditListing = serde_json::from_str(&raw).unwrap();
        let posts = scanner.collect_posts("solana", listing).await;
        assert_eq!(posts[0].text.chars().count(), POST_TEXT_CHARS);
    }

    #[test]
    fn test_extract_headlines() {
        let html = r#"
            <html><body>
                <h1>Solana Breakpoint 2026 announced</h1>
                <h2>Short</h2>
                <h3>  Firedancer   <em>hits</em> mainnet  </h3>
                <p>Not a headline at all, even though it is long</p>
            </body></html>
        "#;

        let items = extract_headlines(html, "https://solana.com/news").unwrap();
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Solana Breakpoint 2026 announced", "Firedancer hits mainnet"]);
        assert!(items.iter().all(|i| i.source == "https://solana.com/news"));
    }

    #[test]
    fn test_headline_limit() {
        let html: String = (0..15).map(|i| format!("<h2>Headline number {:02}</h2>", i)).collect();
        assert_eq!(extract_headlines(&html, "src").unwrap().len(), MAX_HEADLINES);
    }
}
