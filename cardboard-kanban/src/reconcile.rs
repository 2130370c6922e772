//! Reconciliation of authoritative remote state into local state
//!
//! Responses may arrive in any order, so merging is decided by *emission*
//! time: an authoritative result only replaces local state when no local
//! mutation stamped later than the response's emission is already applied.
//! These are pure functions; the store applies their outcome and the tests
//! drive them without any network or UI in sight.

use crate::container::OrderedContainer;
use cardboard_common::Sequenced;
use chrono::{DateTime, Utc};

/// Outcome of a merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Merge<T> {
    /// The authoritative result wins; this is the new local state
    Replaced(T),
    /// A newer local mutation is already applied; the response is stale
    KeptLocal,
}

impl<T> Merge<T> {
    /// True when the authoritative result was taken
    pub fn replaced(&self) -> bool {
        matches!(self, Self::Replaced(_))
    }
}

/// Merge a full authoritative sequence.
///
/// The authoritative items are normalized on the way in: sorted by position
/// ascending with creation-time tie-breaking, then densely renumbered, so a
/// remote that returns gaps or duplicates still yields a valid sequence.
pub fn merge_sequence<T: Sequenced>(
    local_stamp: Option<DateTime<Utc>>,
    authoritative: Vec<T>,
    emitted_at: DateTime<Utc>,
) -> Merge<Vec<T>> {
    if is_stale(local_stamp, emitted_at) {
        return Merge::KeptLocal;
    }
    Merge::Replaced(OrderedContainer::from_remote(authoritative).into_items())
}

/// Merge a single authoritative item into a local sequence.
///
/// The item's data replaces the local copy but keeps the local slot: a
/// mutation response confirms one item, it does not reorder the container.
/// An item the local sequence no longer holds (moved away or deleted in the
/// meantime) leaves local state untouched.
pub fn merge_item<T: Sequenced + Clone>(
    local: &[T],
    local_stamp: Option<DateTime<Utc>>,
    item: T,
    emitted_at: DateTime<Utc>,
) -> Merge<Vec<T>> {
    if is_stale(local_stamp, emitted_at) {
        return Merge::KeptLocal;
    }
    let Some(index) = local.iter().position(|candidate| candidate.id() == item.id()) else {
        return Merge::KeptLocal;
    };

    let mut merged: Vec<T> = local.to_vec();
    merged[index] = item;
    for (position, entry) in merged.iter_mut().enumerate() {
        entry.set_position(position);
    }
    Merge::Replaced(merged)
}

fn is_stale(local_stamp: Option<DateTime<Utc>>, emitted_at: DateTime<Utc>) -> bool {
    local_stamp.map(|stamp| stamp > emitted_at).unwrap_or(false)
}
