//! TTL result cache keyed by canonical parameter JSON
//!
//! Entries expire a fixed time after insertion. When full, the oldest
//! inserted entry is evicted. Every entry carries dependency tags, and a
//! reverse index from tag to keys lets invalidation touch only the matching
//! entries.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::model::CalculationResult;

pub const DEFAULT_CAPACITY: usize = 1000;
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Canonical cache key: `"<name>:<json>"`.
///
/// Parameters pass through `serde_json::Value`, whose object map keeps keys
/// sorted, so the key does not depend on field declaration order.
pub fn cache_key<P: Serialize>(name: &str, params: &P) -> Result<String> {
    let value = serde_json::to_value(params)
        .map_err(|e| EngineError::computation("cache key", e))?;
    let json =
        serde_json::to_string(&value).map_err(|e| EngineError::computation("cache key", e))?;
    Ok(format!("{name}:{json}"))
}

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub result: CalculationResult,
    pub created_at: Instant,
    pub expires_at: Instant,
    pub dependency_tags: Vec<String>,
    pub compute_duration: Duration,
    /// Position in insertion order
    seq: u64,
}

/// Counters since the cache was created
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub ttl: Duration,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub invalidations: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
    invalidations: u64,
}

#[derive(Debug, Default)]
struct Store {
    entries: FxHashMap<String, CacheEntry>,
    insertion_order: BTreeMap<u64, String>,
    tag_index: FxHashMap<String, FxHashSet<String>>,
    next_seq: u64,
    counters: Counters,
}

impl Store {
    fn remove(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.insertion_order.remove(&entry.seq);
        for tag in &entry.dependency_tags {
            if let Some(keys) = self.tag_index.get_mut(tag) {
                keys.remove(key);
                if keys.is_empty() {
                    self.tag_index.remove(tag);
                }
            }
        }
        Some(entry)
    }

    fn evict_oldest(&mut self) {
        let Some(key) = self.insertion_order.values().next().cloned() else {
            return;
        };
        if self.remove(&key).is_some() {
            self.counters.evictions += 1;
            tracing::debug!(key = %key, "evicted oldest cache entry");
        }
    }
}

/// Thread-safe TTL cache of calculator results
#[derive(Debug)]
pub struct ResultCache {
    store: Mutex<Store>,
    capacity: usize,
    ttl: Duration,
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}

impl ResultCache {
    #[must_use]
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            store: Mutex::new(Store::default()),
            capacity,
            ttl,
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.store.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<CalculationResult> {
        self.get_at(key, Instant::now())
    }

    /// Lookup as of `now`; an entry past its expiry is purged and reported as a miss
    pub fn get_at(&self, key: &str, now: Instant) -> Option<CalculationResult> {
        let mut store = self.store.lock();
        let expired = match store.entries.get(key) {
            None => {
                store.counters.misses += 1;
                tracing::debug!(key, "cache miss");
                return None;
            }
            Some(entry) => now > entry.expires_at,
        };

        if expired {
            store.remove(key);
            store.counters.expirations += 1;
            store.counters.misses += 1;
            tracing::debug!(key, "cache entry expired");
            return None;
        }

        store.counters.hits += 1;
        tracing::debug!(key, "cache hit");
        store.entries.get(key).map(|e| e.result.clone())
    }

    pub fn put(
        &self,
        key: String,
        result: CalculationResult,
        dependency_tags: Vec<String>,
        compute_duration: Duration,
    ) {
        self.put_at(key, result, dependency_tags, compute_duration, Instant::now());
    }

    /// Insert as of `now`. Re-putting a key replaces it and moves it to the
    /// back of the eviction order.
    pub fn put_at(
        &self,
        key: String,
        result: CalculationResult,
        dependency_tags: Vec<String>,
        compute_duration: Duration,
        now: Instant,
    ) {
        if self.capacity == 0 {
            return;
        }
        let mut store = self.store.lock();
        if store.remove(&key).is_none() && store.entries.len() >= self.capacity {
            store.evict_oldest();
        }

        let seq = store.next_seq;
        store.next_seq += 1;
        store.insertion_order.insert(seq, key.clone());
        for tag in &dependency_tags {
            store
                .tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }
        store.entries.insert(
            key.clone(),
            CacheEntry {
                key,
                result,
                created_at: now,
                expires_at: now + self.ttl,
                dependency_tags,
                compute_duration,
                seq,
            },
        );
    }

    /// Drop everything (`None`) or every entry sharing a tag with `tags`.
    /// Returns the number of entries removed.
    pub fn invalidate(&self, tags: Option<&[&str]>) -> usize {
        let mut store = self.store.lock();
        let removed = match tags {
            None => {
                let count = store.entries.len();
                store.entries.clear();
                store.insertion_order.clear();
                store.tag_index.clear();
                count
            }
            Some(tags) => {
                let keys: FxHashSet<String> = tags
                    .iter()
                    .filter_map(|tag| store.tag_index.get(*tag))
                    .flatten()
                    .cloned()
                    .collect();
                keys.iter().filter(|k| store.remove(k).is_some()).count()
            }
        };
        store.counters.invalidations += removed as u64;
        tracing::debug!(?tags, removed, "cache invalidated");
        removed
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let store = self.store.lock();
        let c = &store.counters;
        let lookups = c.hits + c.misses;
        CacheStats {
            entries: store.entries.len(),
            capacity: self.capacity,
            ttl: self.ttl,
            hits: c.hits,
            misses: c.misses,
            evictions: c.evictions,
            expirations: c.expirations,
            invalidations: c.invalidations,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                c.hits as f64 / lookups as f64
            },
        }
    }
}
