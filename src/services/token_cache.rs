//! Short-lived cache of M-Pesa access tokens, keyed by consumer key.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Access tokens reused until `ttl` has passed.
///
/// A zero `ttl` disables caching: every lookup misses and nothing is stored.
#[derive(Debug)]
pub struct TokenCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedToken>>,
}

impl TokenCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<String> {
        if self.ttl.is_zero() {
            return None;
        }

        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|cached| cached.expires_at > Instant::now())
            .map(|cached| cached.token.clone())
    }

    pub async fn insert(&self, key: &str, token: &str) {
        if self.ttl.is_zero() {
            return;
        }

        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CachedToken {
                token: token.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
    }

    /// Forget the token for `key`, e.g. after the provider rejected it.
    pub async fn remove(&self, key: &str) {
        self.entries.write().await.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_fresh_tokens() {
        let cache = TokenCache::new(Duration::from_secs(60));
        cache.insert("ck", "tok123").await;

        assert_eq!(cache.get("ck").await.as_deref(), Some("tok123"));
        assert_eq!(cache.get("other").await, None);
    }

    #[tokio::test]
    async fn zero_ttl_disables_caching() {
        let cache = TokenCache::new(Duration::ZERO);
        cache.insert("ck", "tok123").await;

        assert_eq!(cache.get("ck").await, None);
    }

    #[tokio::test]
    async fn expired_tokens_are_not_returned() {
        let cache = TokenCache::new(Duration::from_millis(20));
        cache.insert("ck", "tok123").await;
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(cache.get("ck").await, None);
    }

    #[tokio::test]
    async fn removed_tokens_are_gone() {
        let cache = TokenCache::new(Duration::from_secs(60));
        cache.insert("ck", "tok123").await;
        cache.insert("other", "tok456").await;
        cache.remove("ck").await;

        assert_eq!(cache.get("ck").await, None);
        assert_eq!(cache.get("other").await.as_deref(), Some("tok456"));
    }

    #[tokio::test]
    async fn insert_replaces_previous_token() {
        let cache = TokenCache::new(Duration::from_secs(60));
        cache.insert("ck", "old").await;
        cache.insert("ck", "new").await;

        assert_eq!(cache.get("ck").await.as_deref(), Some("new"));
    }
}
