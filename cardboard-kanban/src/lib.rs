//! Reorder and optimistic-concurrency engine for cardboard boards
//!
//! This crate keeps a locally-mutated, speculative view of a Kanban board
//! consistent with an asynchronous, independently-failing, out-of-order
//! remote source of truth while a user is actively dragging.
//!
//! ## Overview
//!
//! - **Dense positions** - within a container, positions are always exactly
//!   `0..n-1`; every structural operation renumbers the full sequence
//! - **Optimistic previews** - hover previews mutate local state only;
//!   nothing touches the network until the drop
//! - **Minimal remote traffic** - on commit, only items whose committed
//!   position actually changed get a call
//! - **Emission-time reconciliation** - responses merge by when their
//!   mutation was emitted, so out-of-order completions never clobber newer
//!   local state
//! - **Contained failure** - a failed call rolls back exactly the
//!   container(s) it targeted; vanished targets are refetched instead
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use cardboard_common::{BoardId, ContainerId, DragTarget};
//! use cardboard_kanban::BoardEngine;
//! use cardboard_remote::InMemoryGateway;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Arc::new(InMemoryGateway::new());
//! let mut engine = BoardEngine::new(BoardId::from_string("board"), gateway);
//! engine.load().await?;
//!
//! let list = engine.lists()[0].id.clone();
//! let card = engine.cards(&list)[0].id.clone();
//!
//! engine.begin_drag(DragTarget::card(card, list.clone()))?;
//! engine.hover(&ContainerId::cards(list.clone()), 2)?;
//! let report = engine.commit_drag(&ContainerId::cards(list), 2).await?;
//! assert!(report.is_clean());
//! # Ok(())
//! # }
//! ```

pub mod allocator;
pub mod container;
pub mod drag;
mod engine;
mod error;
pub mod reconcile;
pub mod snapshot;
pub mod store;
pub mod throttle;

pub use container::OrderedContainer;
pub use drag::{CommitFailure, CommitOutcome, CommitReport, DragSession};
pub use engine::BoardEngine;
pub use error::{EngineError, Result};
pub use snapshot::Snapshot;
pub use store::OptimisticStore;
pub use throttle::HoverThrottle;

// Re-export the boundary types engine callers always need
pub use cardboard_common::{BoardId, Card, CardId, ContainerId, DragTarget, List, ListId};
pub use cardboard_remote::{RemoteError, RemoteGateway};
