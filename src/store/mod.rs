pub mod disk;
pub mod memory;

use anyhow::{Context, Result};
use disk::{DiskCache, DiskRepository};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;

/// Embedded keyspace holding the application's records and caches.
pub struct Storage {
    keyspace: Keyspace,
}

impl Storage {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create data directory: {}", path.display()))?;
        let keyspace = fjall::Config::new(path)
            .open()
            .with_context(|| format!("Failed to open keyspace at {}", path.display()))?;
        Ok(Self { keyspace })
    }

    fn partition(&self, name: &str) -> Result<PartitionHandle> {
        self.keyspace
            .open_partition(name, PartitionCreateOptions::default())
            .with_context(|| format!("Failed to open partition {name}"))
    }

    pub fn repository(&self) -> Result<DiskRepository> {
        Ok(DiskRepository::new(
            self.partition("users")?,
            self.partition("vendors")?,
            self.partition("subscriptions")?,
        ))
    }

    /// Persistent cache in a partition named `cache_<name>`.
    pub fn cache<K, V>(&self, name: &str) -> Result<DiskCache<K, V>> {
        Ok(DiskCache::new(self.partition(&format!("cache_{name}"))?))
    }

    /// Flushes the journal so writes survive the process exiting.
    pub fn persist(&self) -> Result<()> {
        self.keyspace
            .persist(PersistMode::SyncAll)
            .context("Failed to persist keyspace")
    }
}
