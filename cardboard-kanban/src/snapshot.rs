//! Drag-start snapshots
//!
//! A snapshot is an immutable copy of the ordered item-id sequences of the
//! containers a gesture might touch, captured when the drag starts. It is
//! both the rollback target for cancel/failure and the committed-position
//! baseline the commit diff runs against.

use std::collections::HashMap;
use std::hash::Hash;

/// Ordered item-id sequences for a set of containers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot<K, I> {
    containers: Vec<(K, Vec<I>)>,
}

impl<K: Eq + Hash + Clone, I: Eq + Hash + Clone> Snapshot<K, I> {
    /// Build a snapshot from `(container, ordered ids)` pairs
    pub fn new(containers: Vec<(K, Vec<I>)>) -> Self {
        Self { containers }
    }

    /// Containers captured by this snapshot
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.containers.iter().map(|(key, _)| key)
    }

    /// Whether the container was captured
    pub fn contains(&self, key: &K) -> bool {
        self.containers.iter().any(|(k, _)| k == key)
    }

    /// The captured id order of one container
    pub fn ids(&self, key: &K) -> Option<&[I]> {
        self.containers
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, ids)| ids.as_slice())
    }

    /// The committed `id -> position` baseline of one container
    pub fn baseline(&self, key: &K) -> HashMap<I, usize> {
        self.ids(key)
            .map(|ids| {
                ids.iter()
                    .enumerate()
                    .map(|(index, id)| (id.clone(), index))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Locate an item across the captured containers
    pub fn find(&self, id: &I) -> Option<(&K, usize)> {
        self.containers.iter().find_map(|(key, ids)| {
            ids.iter()
                .position(|candidate| candidate == id)
                .map(|index| (key, index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> Snapshot<&'static str, &'static str> {
        Snapshot::new(vec![("a", vec!["x", "y", "z"]), ("b", vec!["w"])])
    }

    #[test]
    fn test_ids_and_contains() {
        let snapshot = setup();
        assert!(snapshot.contains(&"a"));
        assert!(!snapshot.contains(&"c"));
        assert_eq!(snapshot.ids(&"b"), Some(["w"].as_slice()));
    }

    #[test]
    fn test_baseline_positions() {
        let snapshot = setup();
        let baseline = snapshot.baseline(&"a");
        assert_eq!(baseline["y"], 1);
        assert_eq!(baseline.len(), 3);
        assert!(snapshot.baseline(&"missing").is_empty());
    }

    #[test]
    fn test_find_across_containers() {
        let snapshot = setup();
        assert_eq!(snapshot.find(&"w"), Some((&"b", 0)));
        assert_eq!(snapshot.find(&"z"), Some((&"a", 2)));
        assert_eq!(snapshot.find(&"q"), None);
    }
}
