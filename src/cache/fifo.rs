//! Insertion Order Module
//!
//! Tracks the order keys were first inserted, for FIFO eviction.

use std::collections::VecDeque;

// == Insertion Order ==
/// Remembers the order in which keys entered the cache.
///
/// Keys are stored in a VecDeque where:
/// - Front = Oldest insertion
/// - Back = Newest insertion
///
/// Reads never reorder keys, and re-inserting a tracked key keeps its slot.
#[derive(Debug, Default)]
pub struct InsertionOrder {
    order: VecDeque<String>,
}

impl InsertionOrder {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }

    // == Record ==
    /// Appends a key that was just inserted.
    ///
    /// Keys already tracked keep their original position.
    pub fn record(&mut self, key: &str) {
        if !self.contains(key) {
            self.order.push_back(key.to_string());
        }
    }

    /// Forgets a key.
    pub fn remove(&mut self, key: &str) {
        self.order.retain(|k| k != key);
    }

    // == Pop Oldest ==
    /// Removes and returns the oldest-inserted key.
    pub fn pop_oldest(&mut self) -> Option<String> {
        self.order.pop_front()
    }

    /// Returns the oldest-inserted key without removing it.
    pub fn peek_oldest(&self) -> Option<&String> {
        self.order.front()
    }

    pub fn clear(&mut self) {
        self.order.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.order.iter().any(|k| k == key)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let order = InsertionOrder::new();
        assert!(order.is_empty());
        assert_eq!(order.peek_oldest(), None);
    }

    #[test]
    fn test_pop_follows_insertion_order() {
        let mut order = InsertionOrder::new();
        order.record("a");
        order.record("b");
        order.record("c");

        assert_eq!(order.pop_oldest(), Some("a".to_string()));
        assert_eq!(order.pop_oldest(), Some("b".to_string()));
        assert_eq!(order.pop_oldest(), Some("c".to_string()));
        assert_eq!(order.pop_oldest(), None);
    }

    #[test]
    fn test_rerecord_keeps_original_slot() {
        let mut order = InsertionOrder::new();
        order.record("a");
        order.record("b");

        // Overwrite of "a" must not make it younger than "b"
        order.record("a");

        assert_eq!(order.len(), 2);
        assert_eq!(order.peek_oldest(), Some(&"a".to_string()));
    }

    #[test]
    fn test_remove_middle_key() {
        let mut order = InsertionOrder::new();
        order.record("a");
        order.record("b");
        order.record("c");

        order.remove("b");

        assert_eq!(order.len(), 2);
        assert!(!order.contains("b"));
        assert_eq!(order.pop_oldest(), Some("a".to_string()));
        assert_eq!(order.pop_oldest(), Some("c".to_string()));
    }

    #[test]
    fn test_remove_nonexistent_key() {
        let mut order = InsertionOrder::new();
        order.record("a");

        order.remove("missing");

        assert_eq!(order.len(), 1);
        assert!(order.contains("a"));
    }

    #[test]
    fn test_clear() {
        let mut order = InsertionOrder::new();
        order.record("a");
        order.record("b");

        order.clear();
        assert!(order.is_empty());
    }
}
