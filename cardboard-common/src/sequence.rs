//! The `Sequenced` trait - what the ordering machinery requires of an item

use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::hash::Hash;

/// An item that lives at an integer position inside an ordered container.
///
/// Implemented by [`List`](crate::List) (positioned within its board) and
/// [`Card`](crate::Card) (positioned within its list). The container, store
/// and reconciler are generic over this trait rather than over the concrete
/// record types.
pub trait Sequenced {
    /// The item's id type
    type Id: Clone + Eq + Hash + Ord + Display;

    /// Stable identity of the item
    fn id(&self) -> &Self::Id;

    /// Current position within the owning container
    fn position(&self) -> usize;

    /// Assign a new position (used by dense renumbering)
    fn set_position(&mut self, position: usize);

    /// Creation time; breaks position ties when normalizing remote state
    fn created_at(&self) -> DateTime<Utc>;
}
