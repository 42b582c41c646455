//! Kernel value cache
//!
//! LRU cache for pairwise kernel values, used by the pairwise density solver
//! when it evaluates the kernel on demand instead of materializing the full
//! Gram matrix. Kernel matrices are symmetric, so entries are keyed with the
//! smaller index first.

use lru::LruCache;
use std::num::NonZeroUsize;

/// LRU cache for kernel values keyed by sample index pairs
pub struct KernelCache {
    entries: LruCache<(usize, usize), f64>,
    hits: u64,
    misses: u64,
}

/// Normalize an index pair so that the smaller index comes first
#[inline]
fn key(i: usize, j: usize) -> (usize, usize) {
    if i <= j {
        (i, j)
    } else {
        (j, i)
    }
}

impl KernelCache {
    /// Create a cache holding up to `capacity` kernel values
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            entries: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Create a cache sized from a memory budget in bytes
    ///
    /// Assumes roughly 32 bytes per entry (two indices, the value, and map
    /// overhead).
    pub fn with_memory_limit(memory_bytes: usize) -> Self {
        Self::with_capacity((memory_bytes / 32).max(1))
    }

    /// Look up the kernel value for a pair of sample indices
    pub fn get(&mut self, i: usize, j: usize) -> Option<f64> {
        match self.entries.get(&key(i, j)) {
            Some(&value) => {
                self.hits += 1;
                Some(value)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store the kernel value for a pair of sample indices
    pub fn put(&mut self, i: usize, j: usize, value: f64) {
        self.entries.put(key(i, j), value);
    }

    /// Fraction of lookups served from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Snapshot of cache counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            capacity: self.entries.cap().get(),
            len: self.entries.len(),
        }
    }

    /// Drop all entries and reset the counters
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

/// Cache statistics
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub capacity: usize,
    pub len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_lookup() {
        let mut cache = KernelCache::with_capacity(8);
        cache.put(3, 1, 0.25);
        assert_eq!(cache.get(1, 3), Some(0.25));
        assert_eq!(cache.get(3, 1), Some(0.25));
    }

    #[test]
    fn test_miss_then_hit_counting() {
        let mut cache = KernelCache::with_capacity(8);
        assert_eq!(cache.get(0, 1), None);
        cache.put(0, 1, 2.0);
        assert_eq!(cache.get(0, 1), Some(2.0));

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(cache.hit_rate(), 0.5);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = KernelCache::with_capacity(2);
        cache.put(0, 0, 1.0);
        cache.put(1, 1, 2.0);
        cache.put(2, 2, 3.0);
        assert_eq!(cache.get(0, 0), None);
        assert_eq!(cache.get(2, 2), Some(3.0));
    }

    #[test]
    fn test_memory_limit_sizing() {
        let cache = KernelCache::with_memory_limit(1024);
        assert_eq!(cache.stats().capacity, 32);

        // degenerate budgets still hold at least one entry
        let tiny = KernelCache::with_memory_limit(1);
        assert_eq!(tiny.stats().capacity, 1);
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut cache = KernelCache::with_capacity(4);
        cache.put(0, 1, 1.0);
        cache.get(0, 1);
        cache.clear();
        assert_eq!(cache.get(0, 1), None);
        assert_eq!(cache.stats().hits, 0);
        assert_eq!(cache.stats().len, 0);
    }
}
