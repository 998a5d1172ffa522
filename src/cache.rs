//! Small TTL cache to avoid hammering the odds API

use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, (Instant, V)>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Cached value if it is younger than the TTL
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|(stored_at, _)| stored_at.elapsed() < self.ttl)
            .map(|(_, value)| value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        self.entries.write().insert(key, (Instant::now(), value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_within_ttl() {
        let cache = TtlCache::new(Duration::from_secs(300));
        cache.insert("all_matches", vec![1, 2, 3]);
        assert_eq!(cache.get(&"all_matches"), Some(vec![1, 2, 3]));
        assert_eq!(cache.get(&"other"), None);
    }

    #[test]
    fn test_cache_expires() {
        let cache = TtlCache::new(Duration::ZERO);
        cache.insert("all_matches", 1);
        assert_eq!(cache.get(&"all_matches"), None);
    }

    #[test]
    fn test_cache_insert_replaces() {
        let cache = TtlCache::new(Duration::from_secs(60));
        cache.insert("k", 1);
        cache.insert("k", 2);
        assert_eq!(cache.get(&"k"), Some(2));
    }
}
