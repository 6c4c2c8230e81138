use crate::core::cache::Cache;
use crate::core::model::{Subscription, SubscriptionRecord, User, Vendor};
use crate::core::repository::Repository;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use fjall::PartitionHandle;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::time::{Duration, SystemTime};
use tracing::debug;
use uuid::Uuid;

#[derive(Serialize, Deserialize)]
struct CacheEntry<V> {
    value: V,
    expires_at: Option<SystemTime>,
}

/// Cache persisted in a fjall partition, surviving process restarts.
pub struct DiskCache<K, V> {
    partition: PartitionHandle,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V> DiskCache<K, V> {
    pub fn new(partition: PartitionHandle) -> Self {
        Self {
            partition,
            _marker: PhantomData,
        }
    }
}

impl<K, V> DiskCache<K, V>
where
    K: Serialize + Debug,
    V: Serialize + DeserializeOwned,
{
    fn read(&self, key: &K) -> Result<Option<V>> {
        let raw_key = serde_json::to_vec(key)?;
        let Some(raw) = self.partition.get(&raw_key)? else {
            debug!("Cache MISS for key: {:?}", key);
            return Ok(None);
        };

        let entry: CacheEntry<V> = serde_json::from_slice(&raw)?;
        if entry
            .expires_at
            .is_some_and(|expires_at| SystemTime::now() > expires_at)
        {
            debug!("Cache entry expired for key: {:?}", key);
            self.partition.remove(raw_key)?;
            return Ok(None);
        }
        debug!("Cache HIT for key: {:?}", key);
        Ok(Some(entry.value))
    }

    fn write(&self, key: &K, value: V, ttl: Option<Duration>) -> Result<()> {
        let entry = CacheEntry {
            value,
            expires_at: ttl.map(|ttl| SystemTime::now() + ttl),
        };
        self.partition
            .insert(serde_json::to_vec(key)?, serde_json::to_vec(&entry)?)?;
        debug!("Cache PUT for key: {:?}", key);
        Ok(())
    }
}

#[async_trait]
impl<K, V> Cache<K, V> for DiskCache<K, V>
where
    K: Serialize + Debug + Send + Sync + 'static,
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn get(&self, key: &K) -> Option<V> {
        self.read(key).unwrap_or_else(|e| {
            debug!("DiskCache get error for {:?}: {}", key, e);
            None
        })
    }

    async fn put(&self, key: K, value: V, ttl: Option<Duration>) {
        if let Err(e) = self.write(&key, value, ttl) {
            debug!("DiskCache put error for {:?}: {}", key, e);
        }
    }

    async fn remove(&self, key: &K) {
        let res: Result<()> = serde_json::to_vec(key)
            .map_err(anyhow::Error::from)
            .and_then(|raw| Ok(self.partition.remove(raw)?));
        if let Err(e) = res {
            debug!("DiskCache remove error for {:?}: {}", key, e);
        }
    }

    async fn clear(&self) {
        let res: Result<()> = (|| {
            for item in self.partition.keys() {
                self.partition.remove(item?)?;
            }
            Ok(())
        })();
        if let Err(e) = res {
            debug!("DiskCache clear error: {}", e);
        }
    }
}

fn get_json<T: DeserializeOwned>(partition: &PartitionHandle, key: &str) -> Result<Option<T>> {
    partition
        .get(key)?
        .map(|raw| serde_json::from_slice(&raw).map_err(anyhow::Error::from))
        .transpose()
}

fn put_json<T: Serialize>(partition: &PartitionHandle, key: &str, value: &T) -> Result<()> {
    partition.insert(key, serde_json::to_vec(value)?)?;
    Ok(())
}

/// Repository over three fjall partitions holding JSON encoded records.
pub struct DiskRepository {
    users: PartitionHandle,
    vendors: PartitionHandle,
    subscriptions: PartitionHandle,
}

impl DiskRepository {
    pub fn new(
        users: PartitionHandle,
        vendors: PartitionHandle,
        subscriptions: PartitionHandle,
    ) -> Self {
        Self {
            users,
            vendors,
            subscriptions,
        }
    }

    fn join(&self, record: SubscriptionRecord) -> Result<Subscription> {
        let vendor: Vendor = get_json(&self.vendors, &record.vendor_id.to_string())?
            .ok_or_else(|| {
                anyhow!(
                    "Vendor {} missing for subscription {}",
                    record.vendor_id,
                    record.id
                )
            })?;
        Ok(Subscription::from_record(record, vendor))
    }
}

#[async_trait]
impl Repository for DiskRepository {
    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        get_json(&self.users, id).with_context(|| format!("Failed to read user {id}"))
    }

    async fn save_user(&self, user: &User) -> Result<()> {
        put_json(&self.users, &user.id, user)
            .with_context(|| format!("Failed to save user {}", user.id))
    }

    async fn find_vendor_by_name(&self, user_id: &str, name: &str) -> Result<Option<Vendor>> {
        let name = name.to_lowercase();
        for item in self.vendors.values() {
            let vendor: Vendor = serde_json::from_slice(&item?)?;
            if vendor.user_id == user_id && vendor.name.to_lowercase() == name {
                return Ok(Some(vendor));
            }
        }
        Ok(None)
    }

    async fn save_vendor(&self, vendor: &Vendor) -> Result<()> {
        put_json(&self.vendors, &vendor.id.to_string(), vendor)
            .with_context(|| format!("Failed to save vendor {}", vendor.name))
    }

    async fn get_subscription(&self, id: Uuid) -> Result<Option<Subscription>> {
        let record: Option<SubscriptionRecord> = get_json(&self.subscriptions, &id.to_string())
            .with_context(|| format!("Failed to read subscription {id}"))?;
        record.map(|record| self.join(record)).transpose()
    }

    async fn list_subscriptions(&self, user_id: &str) -> Result<Vec<Subscription>> {
        let mut subscriptions = Vec::new();
        for item in self.subscriptions.values() {
            let record: SubscriptionRecord = serde_json::from_slice(&item?)?;
            if record.user_id == user_id {
                subscriptions.push(self.join(record)?);
            }
        }
        debug!(
            "Loaded {} subscriptions for user {}",
            subscriptions.len(),
            user_id
        );
        Ok(subscriptions)
    }

    async fn save_subscription(&self, record: &SubscriptionRecord) -> Result<()> {
        put_json(&self.subscriptions, &record.id.to_string(), record)
            .with_context(|| format!("Failed to save subscription {}", record.id))
    }

    async fn delete_subscription(&self, id: Uuid) -> Result<bool> {
        let key = id.to_string();
        let existed = self.subscriptions.contains_key(&key)?;
        if existed {
            self.subscriptions.remove(key)?;
        }
        Ok(existed)
    }
}
