//! Fixed-capacity image cache with insertion-order (FIFO) eviction
//!
//! Reads do not refresh an entry; the oldest insert is always evicted first.

use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
pub struct PreloadCache<V> {
    capacity: usize,
    order: VecDeque<String>,
    values: HashMap<String, V>,
}

impl<V> PreloadCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            values: HashMap::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.values.get(key)
    }

    /// Insert a value, returning the key evicted to make room
    ///
    /// Replacing an existing key keeps its original queue position.
    pub fn insert(&mut self, key: impl Into<String>, value: V) -> Option<String> {
        if self.capacity == 0 {
            return None;
        }
        let key = key.into();
        if let Some(slot) = self.values.get_mut(&key) {
            *slot = value;
            return None;
        }

        let evicted = if self.values.len() >= self.capacity {
            self.order.pop_front().inspect(|old| {
                self.values.remove(old);
            })
        } else {
            None
        };

        self.order.push_back(key.clone());
        self.values.insert(key, value);
        evicted
    }

    /// Keys from oldest to newest insert
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.values.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_eviction() {
        let mut cache = PreloadCache::new(2);
        assert_eq!(cache.insert("A", 1), None);
        assert_eq!(cache.insert("B", 2), None);
        assert_eq!(cache.insert("C", 3), Some("A".to_string()));

        assert_eq!(cache.keys().collect::<Vec<_>>(), vec!["B", "C"]);
        assert!(!cache.contains("A"));
        assert_eq!(cache.get("C"), Some(&3));
    }

    #[test]
    fn test_access_does_not_refresh_order() {
        let mut cache = PreloadCache::new(2);
        cache.insert("A", 1);
        cache.insert("B", 2);
        let _ = cache.get("A");
        cache.insert("C", 3);
        assert!(!cache.contains("A"));
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut cache = PreloadCache::new(2);
        cache.insert("A", 1);
        cache.insert("B", 2);
        assert_eq!(cache.insert("A", 10), None);
        assert_eq!(cache.get("A"), Some(&10));

        assert_eq!(cache.insert("C", 3), Some("A".to_string()));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut cache = PreloadCache::new(0);
        assert_eq!(cache.insert("A", 1), None);
        assert!(cache.is_empty());
    }
}
