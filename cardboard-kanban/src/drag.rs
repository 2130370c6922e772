//! Drag gesture state
//!
//! One reorder gesture is a state machine: `Idle -> Dragging -> Idle`. The
//! engine holds `Option<DragSession>` - `None` is Idle, `Some` is Dragging -
//! and every transition goes through
//! [`BoardEngine`](crate::engine::BoardEngine). The session itself carries
//! only data: what is dragged, where it started, and the snapshot captured
//! at pick-up. Timing concerns (hover debounce) live upstream in
//! [`HoverThrottle`](crate::throttle::HoverThrottle), so the machine can be
//! driven by synthetic event sequences in tests.

use crate::snapshot::Snapshot;
use cardboard_common::{BoardId, CardId, ContainerId, DragTarget, ListId};
use cardboard_remote::RemoteError;

/// An in-flight drag gesture.
#[derive(Debug, Clone)]
pub enum DragSession {
    /// A list being reordered within the board
    List {
        list_id: ListId,
        origin_index: usize,
        snapshot: Snapshot<BoardId, ListId>,
    },
    /// A card being moved within or across lists
    Card {
        card_id: CardId,
        origin_list: ListId,
        origin_index: usize,
        snapshot: Snapshot<ListId, CardId>,
    },
}

impl DragSession {
    /// The target this session is dragging
    pub fn target(&self) -> DragTarget {
        match self {
            Self::List { list_id, .. } => DragTarget::list(list_id.clone()),
            Self::Card {
                card_id,
                origin_list,
                ..
            } => DragTarget::card(card_id.clone(), origin_list.clone()),
        }
    }
}

/// How a commit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The drop matched the drag-start position; nothing was issued
    NoOp,
    /// The structural change was applied and persisted
    Committed,
}

/// One remote call that failed during a commit.
///
/// Failures are recoverable by construction: the affected container was
/// rolled back (or refetched, for vanished targets) before this report was
/// returned, so the board view stays consistent either way.
#[derive(Debug, Clone)]
pub struct CommitFailure {
    /// The container(s) the failed call was trying to mutate - two for a
    /// cross-list `move_card`, one otherwise
    pub containers: Vec<ContainerId>,
    /// What the gateway reported
    pub error: RemoteError,
    /// True when the container was refetched instead of rolled back
    pub refetched: bool,
}

/// Result of [`commit_drag`](crate::engine::BoardEngine::commit_drag).
#[derive(Debug, Clone)]
pub struct CommitReport {
    pub outcome: CommitOutcome,
    /// Remote calls issued (only items whose position actually changed)
    pub issued: usize,
    /// Per-call failures; empty on a clean commit
    pub failures: Vec<CommitFailure>,
}

impl CommitReport {
    pub(crate) fn noop() -> Self {
        Self {
            outcome: CommitOutcome::NoOp,
            issued: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn committed(issued: usize, failures: Vec<CommitFailure>) -> Self {
        Self {
            outcome: CommitOutcome::Committed,
            issued,
            failures,
        }
    }

    /// True when every issued call succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
