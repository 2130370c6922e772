//! Position diffing
//!
//! Dense `0..n-1` allocation means a single move can renumber many items;
//! the diff keeps the remote traffic minimal by naming only the items whose
//! committed position actually changed.

use cardboard_common::Sequenced;
use std::collections::HashMap;

/// Capture the committed `id -> position` baseline of a sequence
pub fn committed_positions<T: Sequenced>(items: &[T]) -> HashMap<T::Id, usize> {
    items
        .iter()
        .map(|item| (item.id().clone(), item.position()))
        .collect()
}

/// Baseline from an id sequence whose order is the position order
pub fn baseline_from_ids<I: Clone + Eq + std::hash::Hash>(ids: &[I]) -> HashMap<I, usize> {
    ids.iter()
        .enumerate()
        .map(|(index, id)| (id.clone(), index))
        .collect()
}

/// Items whose position differs from the committed baseline, in position
/// order. Items absent from the baseline (newly arrived in this container)
/// are included.
pub fn position_diff<T: Sequenced>(
    committed: &HashMap<T::Id, usize>,
    current: &[T],
) -> Vec<(T::Id, usize)> {
    current
        .iter()
        .filter(|item| committed.get(item.id()) != Some(&item.position()))
        .map(|item| (item.id().clone(), item.position()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::OrderedContainer;
    use cardboard_common::{Card, ListId};

    fn setup(titles: &[&str]) -> OrderedContainer<Card> {
        let list = ListId::from_string("l1");
        let mut container = OrderedContainer::new();
        for title in titles {
            container.push(Card::new(list.clone(), *title, 0));
        }
        container
    }

    #[test]
    fn test_no_change_yields_empty_diff() {
        let container = setup(&["a", "b", "c"]);
        let committed = committed_positions(container.items());
        assert!(position_diff(&committed, container.items()).is_empty());
    }

    #[test]
    fn test_move_to_front_changes_everything() {
        let mut container = setup(&["a", "b", "c"]);
        let committed = committed_positions(container.items());

        container.move_within(2, 0);

        let diff = position_diff(&committed, container.items());
        assert_eq!(diff.len(), 3);
        // Position order: the moved item lands first.
        assert_eq!(diff[0].1, 0);
        assert_eq!(diff[1].1, 1);
        assert_eq!(diff[2].1, 2);
    }

    #[test]
    fn test_tail_removal_diffs_only_shifted() {
        let mut container = setup(&["a", "b", "c"]);
        let committed = committed_positions(container.items());

        // Remove the middle item; only the tail shifts.
        container.remove_at(1);

        let diff = position_diff(&committed, container.items());
        assert_eq!(diff.len(), 1);
        let c = container.items()[1].id.clone();
        assert_eq!(diff[0], (c, 1));
    }

    #[test]
    fn test_new_arrival_is_included() {
        let mut container = setup(&["a"]);
        let committed = committed_positions(container.items());

        let newcomer = Card::new(ListId::from_string("l1"), "b", 0);
        let newcomer_id = newcomer.id.clone();
        container.insert_at(newcomer, 0);

        let diff = position_diff(&committed, container.items());
        assert_eq!(diff.len(), 2);
        assert_eq!(diff[0], (newcomer_id, 0));
    }

    #[test]
    fn test_baseline_from_ids() {
        let ids = vec!["x", "y", "z"];
        let baseline = baseline_from_ids(&ids);
        assert_eq!(baseline["y"], 1);
        assert_eq!(baseline.len(), 3);
    }
}
