use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;

pub struct MokaCacheWrapper {
    inner: Cache<String, String>,
}

impl MokaCacheWrapper {
    pub fn new() -> Result<Self, String> {
        let config = AppConfig::get();
        Ok(Self::with_settings(
            config.session.memory.max_capacity,
            config.session.ttl,
        ))
    }

    /// 按给定容量与全局 TTL 创建，ttl 为 0 时条目不过期
    pub fn with_settings(max_capacity: u64, ttl: u64) -> Self {
        let mut builder = Cache::builder().max_capacity(max_capacity);
        if ttl > 0 {
            builder = builder.time_to_live(std::time::Duration::from_secs(ttl));
        }

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}, ttl: {}s",
            max_capacity, ttl
        );
        Self {
            inner: builder.build(),
        }
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        if let Some(value) = self.inner.get(key).await {
            debug!("Successfully retrieved key: {}", key);
            CacheResult::Found(value)
        } else {
            debug!("Key not found in cache: {}", key);
            CacheResult::NotFound
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        // Moka 在创建时设置全局 TTL，单条 ttl 会被忽略
        self.inner.insert(key, value).await;

        if ttl != 0 {
            debug!("Moka cache ignores per-item TTL, using global TTL configuration");
        }
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache = MokaCacheWrapper::with_settings(16, 0);
        assert_eq!(cache.get_raw("session:a").await, CacheResult::NotFound);

        cache
            .insert_raw("session:a".to_string(), "{}".to_string(), 0)
            .await;
        assert_eq!(
            cache.get_raw("session:a").await,
            CacheResult::Found("{}".to_string())
        );

        cache.remove("session:a").await;
        assert_eq!(cache.get_raw("session:a").await, CacheResult::NotFound);
    }
}
