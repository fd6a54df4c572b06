//! Memoization of query results.

use crate::model::ValidationModes;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

/// Everything that can change the outcome of a query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    /// The expression exactly as the caller passed it
    pub expression: String,
    pub modes: ValidationModes,
    pub expand_dual: bool,
}

impl QueryKey {
    pub fn new(expression: &str, modes: &ValidationModes, expand_dual: bool) -> Self {
        Self {
            expression: expression.to_string(),
            modes: modes.clone(),
            expand_dual,
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Total number of cache lookups.
    pub total_lookups: usize,
    /// Number of cache hits.
    pub cache_hits: usize,
    /// Number of cache misses.
    pub cache_misses: usize,
    /// Hit rate (0.0 - 1.0).
    pub hit_rate: f64,
    /// Current cache size.
    pub cache_size: usize,
}

/// Unbounded result cache keyed by [`QueryKey`].
///
/// Only successful results are stored. Entries live until
/// [`QueryCache::clear`] is called.
#[derive(Debug)]
pub struct QueryCache<V> {
    entries: RwLock<HashMap<QueryKey, V>>,
    lookups: AtomicUsize,
    hits: AtomicUsize,
}

impl<V> Default for QueryCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            lookups: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        }
    }
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cached result for `key`.
    pub fn get(&self, key: &QueryKey) -> Option<V> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let value = entries.get(key).cloned();
        if value.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        value
    }

    /// Store `value` unless another caller stored one first, and return the
    /// entry that ends up in the cache.
    pub fn insert(&self, key: QueryKey, value: V) -> V {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.entry(key).or_insert(value).clone()
    }

    /// Return the cached result or compute, store and return a new one.
    ///
    /// Errors from `compute` are passed through and leave the cache as it was.
    pub fn get_or_try_insert<E>(
        &self,
        key: QueryKey,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = compute()?;
        Ok(self.insert(key, value))
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total = self.lookups.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);
        CacheStats {
            total_lookups: total,
            cache_hits: hits,
            cache_misses: total.saturating_sub(hits),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
            cache_size: self.len(),
        }
    }

    /// Clear the cache.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
        self.lookups.store(0, Ordering::Relaxed);
        self.hits.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValidationMode;

    #[test]
    fn test_keys_differ_by_every_field() {
        let none = ValidationModes::none();
        let relaxed = ValidationModes::from(ValidationMode::Relaxed);
        let base = QueryKey::new("MIT", &none, true);
        assert_ne!(base, QueryKey::new("MIT ", &none, true));
        assert_ne!(base, QueryKey::new("MIT", &relaxed, true));
        assert_ne!(base, QueryKey::new("MIT", &none, false));
        assert_eq!(base, QueryKey::new("MIT", &ValidationModes::none(), true));
    }

    #[test]
    fn test_hits_and_misses() {
        let cache: QueryCache<String> = QueryCache::new();
        let key = QueryKey::new("MIT", &ValidationModes::none(), true);

        let first: Result<String, ()> = cache.get_or_try_insert(key.clone(), || Ok("a".into()));
        assert_eq!(first.unwrap(), "a");
        let second: Result<String, ()> = cache.get_or_try_insert(key, || Ok("b".into()));
        assert_eq!(second.unwrap(), "a");

        let stats = cache.stats();
        assert_eq!(stats.total_lookups, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.cache_size, 1);
        assert!((stats.hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache: QueryCache<String> = QueryCache::new();
        let key = QueryKey::new("bad", &ValidationModes::none(), true);
        let failed: Result<String, &str> = cache.get_or_try_insert(key.clone(), || Err("boom"));
        assert!(failed.is_err());
        assert!(cache.is_empty());
        let retried: Result<String, &str> = cache.get_or_try_insert(key, || Ok("ok".into()));
        assert_eq!(retried.unwrap(), "ok");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let cache: QueryCache<u32> = QueryCache::new();
        cache.insert(QueryKey::new("a", &ValidationModes::none(), true), 1);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
