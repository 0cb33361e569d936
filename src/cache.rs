// src/cache.rs
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::domain::directory::{City, State};
use crate::seo::CityStats;

#[derive(Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
}

/// Real states plus DC fit with room to spare.
const STATE_KEYS: usize = 64;
const CITY_KEYS: usize = 2048;

/// String-keyed cache with a fixed time-to-live and a bound on entries,
/// safe to share across workers.
pub struct TtlCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().ok()?;
        let expired = entries.get(key)?.created_at.elapsed() >= self.ttl;
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Stores `value`. A new key arriving at capacity first drops expired
    /// entries, then the oldest one.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        if let Ok(mut entries) = self.entries.lock() {
            if !entries.contains_key(&key) && entries.len() >= self.max_entries {
                let ttl = self.ttl;
                entries.retain(|_, e| e.created_at.elapsed() < ttl);
                if entries.len() >= self.max_entries {
                    let oldest = entries
                        .iter()
                        .min_by_key(|(_, e)| e.created_at)
                        .map(|(k, _)| k.clone());
                    if let Some(oldest) = oldest {
                        entries.remove(&oldest);
                    }
                }
            }
            entries.insert(
                key,
                CacheEntry {
                    value,
                    created_at: Instant::now(),
                },
            );
        }
    }

    /// Returns the cached value or computes, stores and returns a fresh one.
    /// Errors are passed through and never cached.
    pub fn get_or_try_insert<E, F>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        self.get_or_try_insert_if(key, compute, |_| true)
    }

    /// Like `get_or_try_insert`, but only stores values `keep` accepts.
    /// Lookups keyed by request input use this to leave misses uncached.
    pub fn get_or_try_insert_if<E, F, K>(&self, key: &str, compute: F, keep: K) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
        K: FnOnce(&V) -> bool,
    {
        if let Some(hit) = self.get(key) {
            return Ok(hit);
        }
        let value = compute()?;
        if keep(&value) {
            self.put(key, value.clone());
        }
        Ok(value)
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

/// Rollup caches handed to request handlers through `AppState`.
pub struct DirectoryCache {
    pub states: TtlCache<Vec<State>>,
    pub cities_by_state: TtlCache<Vec<City>>,
    pub city_stats: TtlCache<Option<CityStats>>,
}

impl DirectoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            states: TtlCache::new(1, ttl),
            cities_by_state: TtlCache::new(STATE_KEYS, ttl),
            city_stats: TtlCache::new(CITY_KEYS, ttl),
        }
    }

    /// Drops every rollup; called after any listing write.
    pub fn invalidate(&self) {
        self.states.clear();
        self.cities_by_state.clear();
        self.city_stats.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn caches_until_ttl_elapses() {
        let cache: TtlCache<i32> = TtlCache::new(16, Duration::from_secs(60));
        let calls = Cell::new(0);
        let compute = || -> Result<i32, ()> {
            calls.set(calls.get() + 1);
            Ok(7)
        };

        assert_eq!(cache.get_or_try_insert("k", compute), Ok(7));
        assert_eq!(cache.get_or_try_insert("k", compute), Ok(7));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn zero_ttl_never_hits() {
        let cache: TtlCache<i32> = TtlCache::new(16, Duration::ZERO);
        cache.put("k", 1);
        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn errors_are_not_cached() {
        let cache: TtlCache<i32> = TtlCache::new(16, Duration::from_secs(60));
        assert_eq!(cache.get_or_try_insert("k", || Err::<i32, &str>("boom")), Err("boom"));
        assert_eq!(cache.get("k"), None);
    }

    #[test]
    fn capacity_evicts_oldest_entry() {
        let cache: TtlCache<i32> = TtlCache::new(2, Duration::from_secs(60));
        cache.put("a", 1);
        std::thread::sleep(Duration::from_millis(2));
        cache.put("b", 2);
        cache.put("c", 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.get("c"), Some(3));
    }

    #[test]
    fn rejected_values_are_not_stored() {
        let cache: TtlCache<Option<i32>> = TtlCache::new(16, Duration::from_secs(60));
        for i in 0..100 {
            let key = format!("nowhere-{i}");
            let v = cache.get_or_try_insert_if(&key, || Ok::<_, ()>(None), Option::is_some);
            assert_eq!(v, Ok(None));
        }
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn distinct_keys_stay_within_capacity() {
        let cache: TtlCache<i32> = TtlCache::new(8, Duration::from_secs(60));
        for i in 0..500 {
            cache.put(format!("k{i}"), i);
        }
        assert_eq!(cache.len(), 8);
    }

    #[test]
    fn invalidate_clears_all_rollups() {
        let cache = DirectoryCache::new(Duration::from_secs(60));
        cache.states.put("all", Vec::new());
        cache.city_stats.put("denver-co", None);
        cache.invalidate();
        assert_eq!(cache.states.len(), 0);
        assert_eq!(cache.city_stats.len(), 0);
    }
}
