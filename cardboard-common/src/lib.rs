//! # Cardboard Common
//!
//! Foundational types shared across the cardboard workspace: strongly-typed
//! ids, the `List` and `Card` domain records, drag-target variants, and the
//! [`Sequenced`] trait that the ordering machinery is generic over.
//!
//! This crate has no I/O and no async surface; it is the base dependency of
//! `cardboard-remote` and `cardboard-kanban`.

mod card;
mod ids;
mod list;
mod sequence;
mod target;
pub use card::Card;
pub use ids::{BoardId, CardId, ListId};
pub use list::List;
pub use sequence::Sequenced;
pub use target::{ContainerId, DragTarget};
