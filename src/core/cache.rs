use async_trait::async_trait;
use std::time::Duration;

/// Key/value cache with optional per-entry expiry.
///
/// Implementations swallow their own storage errors: a failed read is a miss
/// and a failed write is logged and dropped.
#[async_trait]
pub trait Cache<K, V>: Send + Sync
where
    K: Send + Sync,
    V: Send + Sync,
{
    async fn get(&self, key: &K) -> Option<V>;

    async fn put(&self, key: K, value: V, ttl: Option<Duration>);

    async fn remove(&self, key: &K);

    async fn clear(&self);
}
