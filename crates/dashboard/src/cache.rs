//! Short-TTL cache for the dashboard snapshot.
//!
//! Cache-aside: readers take a fresh copy when one exists, otherwise the
//! caller recomputes and puts the result back. Writers that change stock
//! call [`StatsCache::invalidate`].

use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::stats::DashboardStats;

const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct CachedEntry {
    stats: DashboardStats,
    cached_at: Instant,
}

#[derive(Debug)]
pub struct StatsCache {
    ttl: Duration,
    inner: RwLock<Option<CachedEntry>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(None),
        }
    }

    /// Return the cached snapshot if it is younger than the TTL.
    pub fn get(&self) -> Option<DashboardStats> {
        let guard = self.inner.read().ok()?;
        let entry = guard.as_ref()?;
        if entry.cached_at.elapsed() >= self.ttl {
            return None;
        }
        Some(entry.stats.clone())
    }

    /// Store a freshly computed snapshot; returns the previous one (if any)
    /// so callers can detect content changes for broadcasting.
    pub fn put(&self, stats: DashboardStats) -> Option<DashboardStats> {
        let mut guard = match self.inner.write() {
            Ok(g) => g,
            Err(_) => return None,
        };
        let previous = guard.take().map(|e| e.stats);
        *guard = Some(CachedEntry {
            stats,
            cached_at: Instant::now(),
        });
        previous
    }

    pub fn invalidate(&self) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = None;
        }
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::compute_stats;
    use chrono::Utc;

    fn stats() -> DashboardStats {
        compute_stats(&[], &[], Utc::now())
    }

    #[test]
    fn fresh_entry_is_served() {
        let cache = StatsCache::new();
        assert!(cache.get().is_none());

        cache.put(stats());
        assert!(cache.get().is_some());
    }

    #[test]
    fn zero_ttl_means_always_stale() {
        let cache = StatsCache::with_ttl(Duration::ZERO);
        cache.put(stats());
        assert!(cache.get().is_none());
    }

    #[test]
    fn invalidate_drops_the_entry() {
        let cache = StatsCache::new();
        cache.put(stats());
        cache.invalidate();
        assert!(cache.get().is_none());
    }

    #[test]
    fn put_returns_the_previous_snapshot() {
        let cache = StatsCache::new();
        assert!(cache.put(stats()).is_none());
        assert!(cache.put(stats()).is_some());
    }
}
