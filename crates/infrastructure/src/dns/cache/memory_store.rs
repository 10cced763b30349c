use async_trait::async_trait;
use cascade_dns_application::ports::{CacheMaintenancePort, CacheStore, CacheSweepOutcome};
use cascade_dns_domain::DomainError;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct StoredValue {
    value: String,
    expires_at: Instant,
}

impl StoredValue {
    #[inline]
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStoreStats {
    pub entries: usize,
    pub writes: u64,
    pub expirations: u64,
    pub evictions: u64,
}

/// In-process key/value store with per-entry expiry.
///
/// Expired entries are never returned. They are removed when read, when
/// space is needed, or by [`MemoryCacheStore::sweep_expired`].
pub struct MemoryCacheStore {
    entries: DashMap<String, StoredValue, FxBuildHasher>,
    max_entries: usize,
    writes: AtomicU64,
    expirations: AtomicU64,
    evictions: AtomicU64,
}

impl MemoryCacheStore {
    pub fn new(max_entries: usize) -> Self {
        info!(max_entries, "Initializing in-memory answer cache");
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
            max_entries: max_entries.max(1),
            writes: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every expired entry and returns how many were dropped.
    pub fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, stored| !stored.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            self.expirations.fetch_add(removed as u64, Ordering::Relaxed);
            debug!(
                removed,
                cache_size = self.entries.len(),
                "Expired cache entries swept"
            );
        }
        removed
    }

    pub fn stats(&self) -> CacheStoreStats {
        CacheStoreStats {
            entries: self.entries.len(),
            writes: self.writes.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    fn lookup(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        {
            let stored = self.entries.get(key)?;
            if !stored.is_expired(now) {
                return Some(stored.value.clone());
            }
        }

        if self
            .entries
            .remove_if(key, |_, stored| stored.is_expired(now))
            .is_some()
        {
            self.expirations.fetch_add(1, Ordering::Relaxed);
        }
        None
    }

    fn make_room(&self, key: &str) {
        if self.entries.len() < self.max_entries || self.entries.contains_key(key) {
            return;
        }

        if self.sweep_expired() > 0 && self.entries.len() < self.max_entries {
            return;
        }

        let soonest = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());

        if let Some(victim) = soonest {
            if self.entries.remove(&victim).is_some() {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(key = %victim, "Evicted cache entry closest to expiry");
            }
        }
    }

    fn insert(&self, key: &str, value: &str, ttl: Duration) {
        self.make_room(key);
        self.entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        self.writes.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DomainError> {
        Ok(self.lookup(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        self.insert(key, value, ttl);
        Ok(())
    }
}

#[async_trait]
impl CacheMaintenancePort for MemoryCacheStore {
    async fn run_sweep_cycle(&self) -> Result<CacheSweepOutcome, DomainError> {
        let entries_removed = self.sweep_expired();
        Ok(CacheSweepOutcome {
            entries_removed,
            cache_size: self.len(),
        })
    }
}
