use crate::core::cache::Cache;
use crate::core::model::{Subscription, SubscriptionRecord, User, Vendor};
use crate::core::repository::Repository;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

struct Expiring<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Expiring<V> {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// Process-local cache; expired entries are evicted when read.
pub struct MemoryCache<K, V> {
    entries: Arc<Mutex<HashMap<K, Expiring<V>>>>,
}

impl<K, V> MemoryCache<K, V> {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<K, V> Default for MemoryCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for MemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync + std::fmt::Debug + 'static,
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                debug!("Cache entry expired for key: {:?}", key);
                entries.remove(key);
                None
            }
            Some(entry) => {
                debug!("Cache HIT for key: {:?}", key);
                Some(entry.value.clone())
            }
            None => {
                debug!("Cache MISS for key: {:?}", key);
                None
            }
        }
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        debug!("Cache PUT for key: {:?}", key);
        let entry = Expiring {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.entries.lock().await.insert(key, entry);
    }

    async fn remove(&self, key: &K) {
        self.entries.lock().await.remove(key);
    }

    async fn clear(&self) {
        self.entries.lock().await.clear();
    }
}

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    vendors: HashMap<Uuid, Vendor>,
    subscriptions: HashMap<Uuid, SubscriptionRecord>,
}

impl Tables {
    fn join(&self, record: &SubscriptionRecord) -> Result<Subscription> {
        let vendor = self
            .vendors
            .get(&record.vendor_id)
            .cloned()
            .ok_or_else(|| anyhow!("Vendor {} missing for subscription {}", record.vendor_id, record.id))?;
        Ok(Subscription::from_record(record.clone(), vendor))
    }
}

/// Repository kept entirely in memory, for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(id).cloned())
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        self.tables
            .lock()
            .await
            .users
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn find_vendor_by_name(&self, user_id: &str, name: &str) -> Result<Option<Vendor>> {
        let name = name.to_lowercase();
        let tables = self.tables.lock().await;
        Ok(tables
            .vendors
            .values()
            .find(|v| v.user_id == user_id && v.name.to_lowercase() == name)
            .cloned())
    }

    async fn save_vendor(&self, vendor: &Vendor) -> Result<()> {
        self.tables
            .lock()
            .await
            .vendors
            .insert(vendor.id, vendor.clone());
        Ok(())
    }

    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
        let tables = self.tables.lock().await;
        tables
            .subscriptions
            .get(&id)
            .map(|record| tables.join(record))
            .transpose()
    }

    async fn list_subscriptions(&self, user_id: &str) -> Result<Vec<Subscription>> {
        let tables = self.tables.lock().await;
        tables
            .subscriptions
            .values()
            .filter(|record| record.user_id == user_id)
            .map(|record| tables.join(record))
            .collect()
    }

    async fn save_subscription(&self, record: &SubscriptionRecord) -> Result<()> {
        self.tables
            .lock()
            .await
            .subscriptions
            .insert(record.id, record.clone());
        Ok(())
    }

    async fn delete_subscription(&self, id: Uuid) -> Result<bool> {
        Ok(self.tables.lock().await.subscriptions.remove(&id).is_some())
    }
}
