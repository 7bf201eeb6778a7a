//! Cache de pages rendues, avec durée de vie fixe et taille bornée.

use moka::future::Cache;
use std::time::Duration;

use crate::consts::INDEX_CACHE_MAX_BYTES;

pub struct PageCache {
    /// `None` quand la durée de vie est nulle: le cache est désactivé
    pages: Option<Cache<String, String>>,
}

impl PageCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, INDEX_CACHE_MAX_BYTES)
    }

    /// `max_bytes` borne la somme des tailles des clés et des pages
    pub fn with_capacity(ttl: Duration, max_bytes: u64) -> Self {
        let pages = (!ttl.is_zero()).then(|| {
            Cache::builder()
                .max_capacity(max_bytes)
                .weigher(|key: &String, body: &String| {
                    u32::try_from(key.len() + body.len()).unwrap_or(u32::MAX)
                })
                .time_to_live(ttl)
                .build()
        });

        Self { pages }
    }

    /// Page encore fraîche pour cette clé, s'il y en a une
    pub async fn get(&self, key: &str) -> Option<String> {
        self.pages.as_ref()?.get(key).await
    }

    pub async fn insert(&self, key: String, body: String) {
        if let Some(pages) = &self.pages {
            pages.insert(key, body).await;
        }
    }

    pub fn clear(&self) {
        if let Some(pages) = &self.pages {
            pages.invalidate_all();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hit_then_clear() {
        let cache = PageCache::new(Duration::from_secs(20));
        assert_eq!(cache.get("/").await, None);

        cache.insert("/".to_string(), "<p>old</p>".to_string()).await;
        assert_eq!(cache.get("/").await.as_deref(), Some("<p>old</p>"));
        assert_eq!(cache.get("/?page=2").await, None);

        cache.clear();
        assert_eq!(cache.get("/").await, None);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = PageCache::new(Duration::from_millis(10));
        cache.insert("/".to_string(), "body".to_string()).await;
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(cache.get("/").await, None);
    }

    #[tokio::test]
    async fn test_zero_ttl_disables_cache() {
        let cache = PageCache::new(Duration::ZERO);
        cache.insert("/".to_string(), "body".to_string()).await;
        assert_eq!(cache.get("/").await, None);
    }

    #[tokio::test]
    async fn test_distinct_query_strings_stay_bounded() {
        let max_bytes = 64 * 1024;
        let cache = PageCache::with_capacity(Duration::from_secs(20), max_bytes);
        let body = "x".repeat(1024);

        for i in 0..1_000 {
            cache.insert(format!("|/?page=1&junk={i}"), body.clone()).await;
        }

        let pages = cache.pages.as_ref().unwrap();
        pages.run_pending_tasks().await;
        assert!(pages.weighted_size() <= max_bytes);
        assert!(pages.entry_count() < 1_000);
    }
}
