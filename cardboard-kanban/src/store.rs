//! Optimistic per-container cache
//!
//! The store is the only owner of mutable board state on the client. All
//! reorder logic runs synchronously through [`patch`]/[`patch_pair`]; the
//! only suspension points in the system are remote-gateway calls, whose
//! results come back through [`reconcile`]/[`reconcile_item`]. Local
//! mutations stamp their emission time so out-of-order remote completions
//! can never clobber newer local state.
//!
//! [`patch`]: OptimisticStore::patch
//! [`patch_pair`]: OptimisticStore::patch_pair
//! [`reconcile`]: OptimisticStore::reconcile
//! [`reconcile_item`]: OptimisticStore::reconcile_item

use crate::container::OrderedContainer;
use crate::reconcile::{merge_item, merge_sequence, Merge};
use crate::snapshot::Snapshot;
use cardboard_common::Sequenced;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use tokio::sync::watch;

/// Cache of ordered sequences, keyed by container.
///
/// The engine composes two of these: lists keyed by board, cards keyed by
/// list. Constructed and owned by the board view's lifecycle and injected
/// into whatever needs it - never global.
pub struct OptimisticStore<K, T: Sequenced> {
    containers: HashMap<K, OrderedContainer<T>>,
    stamps: HashMap<K, DateTime<Utc>>,
    watchers: HashMap<K, watch::Sender<Vec<T>>>,
}

impl<K, T> OptimisticStore<K, T>
where
    K: Eq + Hash + Clone,
    T: Sequenced + Clone + PartialEq,
{
    pub fn new() -> Self {
        Self {
            containers: HashMap::new(),
            stamps: HashMap::new(),
            watchers: HashMap::new(),
        }
    }

    /// Whether the container is cached
    pub fn contains(&self, key: &K) -> bool {
        self.containers.contains_key(key)
    }

    /// All cached container keys
    pub fn keys(&self) -> Vec<K> {
        self.containers.keys().cloned().collect()
    }

    /// Current (possibly optimistic) view of a container; empty if unknown
    pub fn read(&self, key: &K) -> Vec<T> {
        self.containers
            .get(key)
            .map(|container| container.items().to_vec())
            .unwrap_or_default()
    }

    /// Emission time of the container's latest local mutation
    pub fn stamp(&self, key: &K) -> Option<DateTime<Utc>> {
        self.stamps.get(key).copied()
    }

    /// Locate the container currently holding the item
    pub fn find_item(&self, id: &T::Id) -> Option<(K, usize)> {
        self.containers.iter().find_map(|(key, container)| {
            container.index_of(id).map(|index| (key.clone(), index))
        })
    }

    /// Install an authoritative sequence, replacing any cached state and
    /// clearing the local-mutation stamp. Used by the initial load.
    pub fn install(&mut self, key: K, items: Vec<T>) {
        self.containers
            .insert(key.clone(), OrderedContainer::from_remote(items));
        self.stamps.remove(&key);
        self.notify(&key);
    }

    /// Drop a container entirely (it no longer exists remotely)
    pub fn remove(&mut self, key: &K) {
        self.containers.remove(key);
        self.stamps.remove(key);
        if let Some(sender) = self.watchers.get(key) {
            sender.send_replace(Vec::new());
        }
    }

    /// Forget the local-mutation stamp so the next authoritative result wins
    pub fn invalidate(&mut self, key: &K) {
        self.stamps.remove(key);
    }

    /// Apply a synchronous local transform, stamping the emission time and
    /// notifying subscribers. Returns `None` when the container is unknown.
    pub fn patch<R>(&mut self, key: &K, mutator: impl FnOnce(&mut OrderedContainer<T>) -> R) -> Option<R> {
        let container = self.containers.get_mut(key)?;
        let result = mutator(container);
        self.stamps.insert(key.clone(), Utc::now());
        self.notify(key);
        Some(result)
    }

    /// Apply one transform across two distinct containers (a cross-container
    /// move), stamping and notifying both.
    pub fn patch_pair<R>(
        &mut self,
        first: &K,
        second: &K,
        mutator: impl FnOnce(&mut OrderedContainer<T>, &mut OrderedContainer<T>) -> R,
    ) -> Option<R> {
        if first == second {
            return None;
        }
        let mut a = self.containers.remove(first)?;
        let Some(mut b) = self.containers.remove(second) else {
            self.containers.insert(first.clone(), a);
            return None;
        };

        let result = mutator(&mut a, &mut b);

        self.containers.insert(first.clone(), a);
        self.containers.insert(second.clone(), b);
        let now = Utc::now();
        self.stamps.insert(first.clone(), now);
        self.stamps.insert(second.clone(), now);
        self.notify(first);
        self.notify(second);
        Some(result)
    }

    /// Capture the ordered id sequences of the given containers
    pub fn snapshot(&self, keys: &[K]) -> Snapshot<K, T::Id> {
        Snapshot::new(
            keys.iter()
                .filter_map(|key| {
                    self.containers
                        .get(key)
                        .map(|container| (key.clone(), container.ids()))
                })
                .collect(),
        )
    }

    /// Restore the named containers to the snapshot's id order.
    ///
    /// Conservation rules for items that moved since the capture:
    /// - an id the snapshot names but the rolled-back containers no longer
    ///   hold is skipped (the item lives elsewhere now);
    /// - an item currently held that the snapshot does not name is
    ///   re-appended to the container it came from.
    ///
    /// Containers outside `keys` are untouched. Rolled-back containers are
    /// stamped as local mutations so stale in-flight responses cannot undo
    /// the restore.
    pub fn rollback(&mut self, snapshot: &Snapshot<K, T::Id>, keys: &[K]) {
        let mut unique: Vec<K> = Vec::new();
        for key in keys {
            if snapshot.contains(key) && self.containers.contains_key(key) && !unique.contains(key)
            {
                unique.push(key.clone());
            }
        }
        if unique.is_empty() {
            return;
        }

        let mut pool: HashMap<T::Id, (usize, T)> = HashMap::new();
        let mut before: Vec<Vec<T>> = Vec::with_capacity(unique.len());
        for (origin, key) in unique.iter().enumerate() {
            let container = self.containers.remove(key).unwrap_or_default();
            before.push(container.items().to_vec());
            for item in container.into_items() {
                pool.insert(item.id().clone(), (origin, item));
            }
        }

        let mut rebuilt: Vec<Vec<T>> = unique
            .iter()
            .map(|key| {
                snapshot
                    .ids(key)
                    .map(|ids| {
                        ids.iter()
                            .filter_map(|id| pool.remove(id).map(|(_, item)| item))
                            .collect()
                    })
                    .unwrap_or_default()
            })
            .collect();

        // Unlisted leftovers return to the container they were drained from.
        let mut leftovers: Vec<(usize, T)> = pool.into_values().collect();
        leftovers.sort_by_key(|(origin, item)| (*origin, item.position()));
        for (origin, item) in leftovers {
            rebuilt[origin].push(item);
        }

        let now = Utc::now();
        for (index, key) in unique.iter().enumerate() {
            let container = OrderedContainer::from_ordered(std::mem::take(&mut rebuilt[index]));
            let changed = container.items() != before[index].as_slice();
            self.containers.insert(key.clone(), container);
            self.stamps.insert(key.clone(), now);
            if changed {
                self.notify(key);
            }
        }
    }

    /// Merge a full authoritative sequence; returns true when it was taken.
    /// Creates the container when it is not cached yet.
    pub fn reconcile(&mut self, key: &K, authoritative: Vec<T>, emitted_at: DateTime<Utc>) -> bool {
        match merge_sequence(self.stamp(key), authoritative, emitted_at) {
            Merge::Replaced(items) => {
                self.containers
                    .insert(key.clone(), OrderedContainer::from_ordered(items));
                self.notify(key);
                true
            }
            Merge::KeptLocal => {
                tracing::debug!("stale sequence response dropped for container");
                false
            }
        }
    }

    /// Merge a single authoritative item; returns true when it was taken
    pub fn reconcile_item(&mut self, key: &K, item: T, emitted_at: DateTime<Utc>) -> bool {
        let Some(container) = self.containers.get(key) else {
            return false;
        };
        match merge_item(container.items(), self.stamp(key), item, emitted_at) {
            Merge::Replaced(items) => {
                self.containers
                    .insert(key.clone(), OrderedContainer::from_ordered(items));
                self.notify(key);
                true
            }
            Merge::KeptLocal => false,
        }
    }

    /// Live view of a container for the UI layer. The receiver observes
    /// every completed mutation; intermediate states within one `patch` are
    /// never visible.
    pub fn subscribe(&mut self, key: &K) -> watch::Receiver<Vec<T>> {
        let current = self.read(key);
        self.watchers
            .entry(key.clone())
            .or_insert_with(|| watch::channel(current).0)
            .subscribe()
    }

    fn notify(&self, key: &K) {
        if let Some(sender) = self.watchers.get(key) {
            sender.send_replace(self.read(key));
        }
    }
}

impl<K, T> Default for OptimisticStore<K, T>
where
    K: Eq + Hash + Clone,
    T: Sequenced + Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cardboard_common::{Card, CardId, ListId};

    fn list(n: &str) -> ListId {
        ListId::from_string(n)
    }

    fn setup() -> OptimisticStore<ListId, Card> {
        let mut store = OptimisticStore::new();
        let a: Vec<Card> = ["c1", "c2", "c3"]
            .iter()
            .enumerate()
            .map(|(i, t)| Card::new(list("a"), *t, i))
            .collect();
        let b = vec![Card::new(list("b"), "c4", 0)];
        store.install(list("a"), a);
        store.install(list("b"), b);
        store
    }

    fn titles(cards: &[Card]) -> Vec<&str> {
        cards.iter().map(|c| c.title.as_str()).collect()
    }

    #[test]
    fn test_read_unknown_is_empty() {
        let store = setup();
        assert!(store.read(&list("zzz")).is_empty());
    }

    #[test]
    fn test_patch_stamps_and_mutates() {
        let mut store = setup();
        assert!(store.stamp(&list("a")).is_none());

        let moved = store
            .patch(&list("a"), |c| c.move_within(2, 0))
            .unwrap();
        assert!(moved);
        assert_eq!(titles(&store.read(&list("a"))), vec!["c3", "c1", "c2"]);
        assert!(store.stamp(&list("a")).is_some());
        assert!(store.stamp(&list("b")).is_none());
    }

    #[test]
    fn test_patch_unknown_container() {
        let mut store = setup();
        assert!(store.patch(&list("zzz"), |_| ()).is_none());
    }

    #[test]
    fn test_patch_pair_moves_across() {
        let mut store = setup();
        store
            .patch_pair(&list("a"), &list("b"), |a, b| {
                a.move_across(1, b, 0)
            })
            .unwrap();

        assert_eq!(titles(&store.read(&list("a"))), vec!["c1", "c3"]);
        assert_eq!(titles(&store.read(&list("b"))), vec!["c2", "c4"]);
        // Both containers stamped.
        assert!(store.stamp(&list("a")).is_some());
        assert!(store.stamp(&list("b")).is_some());
    }

    #[test]
    fn test_subscribe_observes_patches() {
        let mut store = setup();
        let mut rx = store.subscribe(&list("a"));
        assert_eq!(titles(&rx.borrow_and_update()), vec!["c1", "c2", "c3"]);

        store.patch(&list("a"), |c| c.move_within(0, 2));
        assert!(rx.has_changed().unwrap());
        assert_eq!(titles(&rx.borrow_and_update()), vec!["c2", "c3", "c1"]);
    }

    #[test]
    fn test_rollback_restores_single_container() {
        let mut store = setup();
        let snapshot = store.snapshot(&[list("a"), list("b")]);

        store.patch(&list("a"), |c| c.move_within(0, 2));
        store.patch(&list("b"), |c| c.move_within(0, 0));

        store.rollback(&snapshot, &[list("a")]);
        assert_eq!(titles(&store.read(&list("a"))), vec!["c1", "c2", "c3"]);
        // Stamped so stale responses cannot undo the restore.
        assert!(store.stamp(&list("a")).is_some());
    }

    #[test]
    fn test_rollback_pair_conserves_moved_item() {
        let mut store = setup();
        let snapshot = store.snapshot(&[list("a"), list("b")]);

        store.patch_pair(&list("a"), &list("b"), |a, b| a.move_across(1, b, 0));
        store.rollback(&snapshot, &[list("a"), list("b")]);

        assert_eq!(titles(&store.read(&list("a"))), vec!["c1", "c2", "c3"]);
        assert_eq!(titles(&store.read(&list("b"))), vec!["c4"]);
    }

    #[test]
    fn test_rollback_single_side_skips_departed_item() {
        let mut store = setup();
        let snapshot = store.snapshot(&[list("a"), list("b")]);

        // c2 moved to b; roll back only a. c2 must not be duplicated.
        store.patch_pair(&list("a"), &list("b"), |a, b| a.move_across(1, b, 0));
        store.rollback(&snapshot, &[list("a")]);

        assert_eq!(titles(&store.read(&list("a"))), vec!["c1", "c3"]);
        assert_eq!(titles(&store.read(&list("b"))), vec!["c2", "c4"]);

        let total: usize = store.read(&list("a")).len() + store.read(&list("b")).len();
        assert_eq!(total, 4);
    }

    #[test]
    fn test_rollback_keeps_unlisted_arrival() {
        let mut store = setup();
        let snapshot = store.snapshot(&[list("a")]);

        // A card arrives in a after the capture; rollback must not lose it.
        let newcomer = Card::new(list("a"), "c9", 0);
        let newcomer_id = newcomer.id.clone();
        store.patch(&list("a"), |c| c.insert_at(newcomer, 0));
        store.rollback(&snapshot, &[list("a")]);

        let cards = store.read(&list("a"));
        assert_eq!(titles(&cards), vec!["c1", "c2", "c3", "c9"]);
        assert!(cards.iter().any(|c| c.id == newcomer_id));
    }

    #[test]
    fn test_reconcile_stale_rejected() {
        let mut store = setup();
        store.patch(&list("a"), |c| c.move_within(0, 1));
        let local = store.read(&list("a"));

        let stale = vec![Card::new(list("a"), "server", 0)];
        let emitted = Utc::now() - chrono::Duration::seconds(5);
        assert!(!store.reconcile(&list("a"), stale, emitted));
        assert_eq!(store.read(&list("a")), local);
    }

    #[test]
    fn test_reconcile_fresh_replaces() {
        let mut store = setup();
        let fresh = vec![Card::new(list("a"), "server", 0)];
        assert!(store.reconcile(&list("a"), fresh, Utc::now()));
        assert_eq!(titles(&store.read(&list("a"))), vec!["server"]);
    }

    #[test]
    fn test_reconcile_idempotent() {
        let mut store = setup();
        let authoritative = store.read(&list("a"));
        let t = Utc::now();

        assert!(store.reconcile(&list("a"), authoritative.clone(), t));
        let once = store.read(&list("a"));
        assert!(store.reconcile(&list("a"), authoritative, t));
        assert_eq!(store.read(&list("a")), once);
    }

    #[test]
    fn test_reconcile_item_updates_in_place() {
        let mut store = setup();
        let mut response = store.read(&list("a"))[1].clone();
        response.title = "c2-confirmed".into();

        assert!(store.reconcile_item(&list("a"), response, Utc::now()));
        assert_eq!(
            titles(&store.read(&list("a"))),
            vec!["c1", "c2-confirmed", "c3"]
        );
    }

    #[test]
    fn test_find_item() {
        let store = setup();
        let c4 = store.read(&list("b"))[0].id.clone();
        assert_eq!(store.find_item(&c4), Some((list("b"), 0)));
        assert_eq!(store.find_item(&CardId::from_string("ghost")), None);
    }

    #[test]
    fn test_remove_notifies_empty() {
        let mut store = setup();
        let mut rx = store.subscribe(&list("b"));
        rx.borrow_and_update();

        store.remove(&list("b"));
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_empty());
        assert!(!store.contains(&list("b")));
    }
}
