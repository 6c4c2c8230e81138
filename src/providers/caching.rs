use crate::core::cache::Cache;
use crate::core::rates::{RateProvider, RateTable};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Serves rate tables from `cache` while they are fresh, fetching on a miss.
///
/// Only successful fetches are stored; failures reach the caller every time.
pub struct CachingRateProvider<T: RateProvider> {
    inner: T,
    cache: Arc<dyn Cache<String, RateTable>>,
    ttl: Duration,
}

impl<T: RateProvider> CachingRateProvider<T> {
    pub fn new(inner: T, cache: Arc<dyn Cache<String, RateTable>>, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl<T: RateProvider> RateProvider for CachingRateProvider<T> {
    async fn fetch_rates(&self, base: &str) -> Result<RateTable> {
        let key = base.to_uppercase();
        if let Some(table) = self.cache.get(&key).await {
            debug!("Using cached rates for {} from {}", key, table.fetched_at);
            return Ok(table);
        }

        let table = self.inner.fetch_rates(base).await?;
        self.cache.put(key, table.clone(), Some(self.ttl)).await;
        Ok(table)
    }
}
