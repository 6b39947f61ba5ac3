//! Cache store port and in-memory implementation.
//!
//! The match cache speaks to an external store through the [`CacheStore`]
//! trait: opaque byte payloads, per-entry TTL, and a contract where every
//! failure mode is just a miss. [`MemoryStore`] is the in-process
//! implementation used by default and in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Byte-oriented cache store.
///
/// Implementations must tolerate concurrent access from many requests.
/// A stale or missing entry is never an error, only a miss; a failed
/// write is silently dropped.
pub trait CacheStore: Send + Sync + 'static {
    /// Returns the payload for a key, or `None` on miss/expiry/failure.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores a payload under a key with a time-to-live. Best effort.
    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);
}

/// Configuration for [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of entries; zero disables the store entirely.
    pub max_entries: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { max_entries: 10_000 }
    }
}

impl StoreConfig {
    /// Disables caching.
    #[must_use]
    pub const fn disabled() -> Self {
        Self { max_entries: 0 }
    }
}

/// Store statistics, readable in tests and diagnostics endpoints.
#[derive(Debug, Clone, Default)]
pub struct StoreStats {
    /// Number of hits.
    pub hits: u64,
    /// Number of misses.
    pub misses: u64,
    /// Current entry count.
    pub size: usize,
    /// Number of evictions (expiry or capacity).
    pub evictions: u64,
}

struct Entry {
    value: Vec<u8>,
    created_at: Instant,
    ttl: Duration,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.ttl
    }
}

/// In-process TTL cache store.
#[derive(Default)]
pub struct MemoryStore {
    config: StoreConfig,
    entries: RwLock<HashMap<String, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl MemoryStore {
    /// Creates a store with the given configuration.
    #[must_use]
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Returns store statistics.
    pub fn stats(&self) -> StoreStats {
        let entries = self.entries.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        StoreStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            size: entries.len(),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Removes every entry.
    pub fn clear(&self) {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.clear();
    }

    fn evict_expired(&self, entries: &mut HashMap<String, Entry>) {
        let before = entries.len();
        entries.retain(|_, e| !e.is_expired());
        let evicted = before - entries.len();
        if evicted > 0 {
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
        }
    }

    fn find_oldest(entries: &HashMap<String, Entry>) -> Option<String> {
        entries
            .iter()
            .min_by_key(|(_, e)| e.created_at)
            .map(|(k, _)| k.clone())
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        if self.config.max_entries == 0 {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        let entries = self
            .entries
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(entry) = entries.get(key) {
            if !entry.is_expired() {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        if self.config.max_entries == 0 || ttl.is_zero() {
            return;
        }

        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if entries.len() >= self.config.max_entries {
            self.evict_expired(&mut entries);
        }
        while entries.len() >= self.config.max_entries {
            if let Some(oldest) = Self::find_oldest(&entries) {
                entries.remove(&oldest);
                self.evictions.fetch_add(1, Ordering::Relaxed);
            } else {
                break;
            }
        }

        entries.insert(
            key.to_string(),
            Entry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(60);

    #[test]
    fn hit_after_set() {
        let store = MemoryStore::new(StoreConfig::default());
        assert!(store.get("k").is_none());

        store.set("k", b"payload".to_vec(), TTL);
        assert_eq!(store.get("k"), Some(b"payload".to_vec()));
    }

    #[test]
    fn stats_count_hits_and_misses() {
        let store = MemoryStore::new(StoreConfig::default());
        store.get("k"); // miss
        store.set("k", b"v".to_vec(), TTL);
        store.get("k"); // hit
        store.get("k"); // hit

        let stats = store.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn disabled_store_never_stores() {
        let store = MemoryStore::new(StoreConfig::disabled());
        store.set("k", b"v".to_vec(), TTL);
        assert!(store.get("k").is_none());
    }

    #[test]
    fn zero_ttl_is_dropped() {
        let store = MemoryStore::new(StoreConfig::default());
        store.set("k", b"v".to_vec(), Duration::ZERO);
        assert!(store.get("k").is_none());
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let store = MemoryStore::new(StoreConfig::default());
        store.set("k", b"v".to_vec(), Duration::from_nanos(1));
        std::thread::sleep(Duration::from_millis(2));
        assert!(store.get("k").is_none());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let store = MemoryStore::new(StoreConfig { max_entries: 2 });
        store.set("a", b"1".to_vec(), TTL);
        std::thread::sleep(Duration::from_millis(2));
        store.set("b", b"2".to_vec(), TTL);
        std::thread::sleep(Duration::from_millis(2));
        store.set("c", b"3".to_vec(), TTL);

        assert!(store.get("a").is_none());
        assert!(store.get("b").is_some());
        assert!(store.get("c").is_some());
        assert!(store.stats().evictions >= 1);
    }

    #[test]
    fn clear_empties_the_store() {
        let store = MemoryStore::new(StoreConfig::default());
        store.set("k", b"v".to_vec(), TTL);
        store.clear();
        assert!(store.get("k").is_none());
    }
}
