use dashmap::DashMap;
use dns_reputation_domain::config::EngineConfig;
use dns_reputation_domain::{Domain, LookupResult};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// A cached lookup outcome. Immutable once inserted; a later `set` for the
/// same domain replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: LookupResult,
    pub inserted_at: Instant,
}

impl CacheEntry {
    #[inline]
    fn is_fresh(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

/// Shared domain → reputation outcome cache with a fixed TTL.
///
/// Expiry is lazy: an expired entry is dropped by the `get` that finds it,
/// there is no background sweep. Concurrent writers to one key never
/// corrupt it; whichever `set` lands last wins.
pub struct ReputationCache {
    entries: DashMap<Domain, CacheEntry, FxBuildHasher>,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ReputationCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
            ttl,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.cache_ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached outcome for `domain`, or `None` if absent or expired.
    pub fn get(&self, domain: &Domain) -> Option<LookupResult> {
        if let Some(entry) = self.entries.get(domain) {
            if entry.is_fresh(self.ttl) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.result.clone());
            }
            // Expired: release the shard guard before removing
            drop(entry);
            self.entries
                .remove_if(domain, |_, entry| !entry.is_fresh(self.ttl));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Store `result` for `domain`, stamped with the current time.
    pub fn set(&self, domain: Domain, result: LookupResult) {
        self.entries.insert(
            domain,
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(self.ttl));
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
