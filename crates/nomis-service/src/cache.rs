//! In-memory stats cache with per-entry expiry.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use nomis_core::WalletStats;
use nomis_core::traits::{CacheKey, StatsCache};
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    stats: WalletStats,
    expires_at: Instant,
}

/// Concurrent [`StatsCache`] keyed by wallet and chain. Expiry is checked on read.
#[derive(Debug, Default)]
pub struct MemoryStatsCache {
    entries: DashMap<CacheKey, Entry>,
}

impl MemoryStatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, e| e.expires_at > now);
        before - self.entries.len()
    }
}

impl StatsCache for MemoryStatsCache {
    fn get(&self, key: &CacheKey) -> Option<WalletStats> {
        let now = Instant::now();
        let hit = self
            .entries
            .get(key)
            .map(|e| (e.expires_at > now, e.stats.clone()));

        match hit {
            Some((true, stats)) => {
                debug!(key = %key, "cache: hit");
                Some(stats)
            }
            Some((false, _)) => {
                self.entries.remove_if(key, |_, e| e.expires_at <= now);
                debug!(key = %key, "cache: expired");
                None
            }
            None => None,
        }
    }

    fn set(&self, key: CacheKey, stats: WalletStats, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.entries.insert(key, Entry { stats, expires_at });
    }
}
