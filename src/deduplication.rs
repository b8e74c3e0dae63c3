use lru::LruCache;
use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::debug;

/// Number of most recent signatures retained per whale wallet. Older
/// transactions can re-alert once this many newer ones have cycled them out.
pub const WHALE_SIGNATURE_WINDOW: usize = 5;

/// Bounded set of identifiers that have already been processed.
///
/// Once `capacity` ids are held the least recently inserted one is evicted.
/// Check-then-mark callers that may race should use [`SeenSet::check_and_mark`].
pub struct SeenSet {
    name: &'static str,
    ids: Mutex<LruCache<String, ()>>,
}

impl SeenSet {
    pub fn new(name: &'static str, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            name,
            ids: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub async fn seen(&self, id: &str) -> bool {
        self.ids.lock().await.contains(id)
    }

    pub async fn mark(&self, id: &str) {
        self.ids.lock().await.put(id.to_string(), ());
    }

    /// Marks `id` and returns `true` if it had not been seen before.
    pub async fn check_and_mark(&self, id: &str) -> bool {
        let mut ids = self.ids.lock().await;
        if ids.contains(id) {
            return false;
        }
        if let Some((evicted, _)) = ids.push(id.to_string(), ()) {
            debug!("{} cache full, evicted {}", self.name, evicted);
        }
        true
    }

    pub async fn len(&self) -> usize {
        self.ids.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.ids.lock().await.is_empty()
    }
}

/// Per-wallet window of the signatures returned by the latest fetch.
#[derive(Default)]
pub struct SignatureWindow {
    windows: Mutex<HashMap<String, HashSet<String>>>,
}

impl SignatureWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seen(&self, wallet: &str, signature: &str) -> bool {
        self.windows
            .lock()
            .await
            .get(wallet)
            .map(|sigs| sigs.contains(signature))
            .unwrap_or(false)
    }

    /// Copy of the wallet's current window.
    pub async fn window(&self, wallet: &str) -> HashSet<String> {
        self.windows
            .lock()
            .await
            .get(wallet)
            .cloned()
            .unwrap_or_default()
    }

    /// Replaces the wallet's window with the first [`WHALE_SIGNATURE_WINDOW`]
    /// signatures of the latest fetch. An empty fetch leaves it untouched.
    pub async fn mark<I, S>(&self, wallet: &str, signatures: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let latest: HashSet<String> = signatures
            .into_iter()
            .take(WHALE_SIGNATURE_WINDOW)
            .map(Into::into)
            .collect();

        if latest.is_empty() {
            return;
        }
        self.windows.lock().await.insert(wallet.to_string(), latest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_seen_is_stable_until_marked() {
        let set = SeenSet::new("pairs", 100);

        assert!(!set.seen("tokenA").await);
        assert!(!set.seen("tokenA").await);

        set.mark("tokenA").await;
        assert!(set.seen("tokenA").await);
        assert!(set.seen("tokenA").await);
        assert!(!set.seen("tokenB").await);
        assert_eq!(set.len().await, 1);
    }

    #[tokio::test]
    async fn test_check_and_mark_only_admits_once() {
        let set = SeenSet::new("posts", 100);
        assert!(set.check_and_mark("post1").await);
        assert!(!set.check_and_mark("post1").await);
        assert!(set.check_and_mark("post2").await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_oldest() {
        let set = SeenSet::new("pairs", 2);
        set.check_and_mark("a").await;
        set.check_and_mark("b").await;
        set.check_and_mark("c").await;

        assert!(!set.seen("a").await);
        assert!(set.seen("b").await);
        assert!(set.seen("c").await);
        assert_eq!(set.len().await, 2);
    }

    #[tokio::test]
    async fn test_zero_capacity_still_holds_one() {
        let set = SeenSet::new("pairs", 0);
        assert!(set.is_empty().await);
        set.mark("a").await;
        assert!(set.seen("a").await);
    }

    #[tokio::test]
    async fn test_signature_window_keeps_latest_five() {
        let window = SignatureWindow::new();
        let sigs: Vec<String> = (1..=8).map(|i| format!("sig{}", i)).collect();
        window.mark("whale", sigs.iter().cloned()).await;

        for sig in &sigs[..5] {
            assert!(window.seen("whale", sig).await);
        }
        assert!(!window.seen("whale", "sig6").await);
        assert!(!window.seen("other", "sig1").await);
    }

    #[tokio::test]
    async fn test_signature_window_is_replaced_not_extended() {
        let window = SignatureWindow::new();
        window.mark("whale", ["old1", "old2"]).await;
        window.mark("whale", ["new1", "new2", "new3", "new4", "new5"]).await;

        // old signatures cycled out can surface again
        assert!(!window.seen("whale", "old1").await);
        assert_eq!(window.window("whale").await.len(), 5);

        window.mark("whale", Vec::<String>::new()).await;
        assert!(window.seen("whale", "new1").await);
    }
}
