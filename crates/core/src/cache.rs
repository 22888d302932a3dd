//! A small key-value cache with optional per-entry expiry.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Minimal cache interface so the in-memory map can be swapped out.
pub trait Cache<K, V> {
    /// The live value for `key`. Expired entries read as missing.
    fn get(&self, key: &K) -> Option<V>;

    /// Store `value`; `ttl: None` never expires.
    fn set(&mut self, key: K, value: V, ttl: Option<Duration>);

    fn remove(&mut self, key: &K) -> Option<V>;

    fn clear(&mut self);
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| now < at)
    }
}

/// In-memory cache; expiry is checked on read.
#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: HashMap<K, Entry<V>>,
}

impl<K, V> Default for TtlCache<K, V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_at(&self, key: &K, now: Instant) -> Option<V> {
        self.entries
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.value.clone())
    }

    pub fn set_at(&mut self, key: K, value: V, ttl: Option<Duration>, now: Instant) {
        let expires_at = ttl.and_then(|ttl| now.checked_add(ttl));
        self.entries.insert(key, Entry { value, expires_at });
    }

    /// Drop every expired entry. Returns how many were dropped.
    pub fn purge_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before - self.entries.len()
    }

    /// Entries stored, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash, V: Clone> Cache<K, V> for TtlCache<K, V> {
    fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    fn set(&mut self, key: K, value: V, ttl: Option<Duration>) {
        self.set_at(key, value, ttl, Instant::now());
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.remove(key).map(|entry| entry.value)
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_expires_at_read_time() {
        let start = Instant::now();
        let mut cache = TtlCache::new();
        cache.set_at("k", 1, Some(Duration::from_secs(300)), start);

        assert_eq!(cache.get_at(&"k", start + Duration::from_secs(299)), Some(1));
        assert_eq!(cache.get_at(&"k", start + Duration::from_secs(300)), None);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.purge_expired(start + Duration::from_secs(301)), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_no_ttl_never_expires() {
        let start = Instant::now();
        let mut cache = TtlCache::new();
        cache.set_at("meta", "v", None, start);
        assert_eq!(cache.get_at(&"meta", start + Duration::from_secs(86_400 * 365)), Some("v"));
    }

    #[test]
    fn test_set_replaces_and_remove() {
        let mut cache: TtlCache<String, u32> = TtlCache::new();
        cache.set("a".into(), 1, None);
        cache.set("a".into(), 2, None);
        assert_eq!(cache.get(&"a".to_string()), Some(2));
        assert_eq!(cache.remove(&"a".to_string()), Some(2));
        assert_eq!(cache.get(&"a".to_string()), None);
    }

    #[test]
    fn test_trait_object() {
        let mut cache: Box<dyn Cache<u32, &str>> = Box::new(TtlCache::new());
        cache.set(1, "one", Some(Duration::from_secs(60)));
        assert_eq!(cache.get(&1), Some("one"));
        cache.clear();
        assert_eq!(cache.get(&1), None);
    }
}
