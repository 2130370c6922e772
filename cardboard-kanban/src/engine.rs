//! The board engine facade
//!
//! `BoardEngine` wires the optimistic stores, the drag state machine and the
//! remote gateway together. It is constructed per board view with an
//! injected gateway and owns all mutable board state for its lifetime.
//!
//! Pointer events drive `begin_drag`/`hover`/`commit_drag`/`cancel_drag`.
//! Everything up to the drop is synchronous and local; `commit_drag` is the
//! only reorder path that touches the gateway, and it issues calls only for
//! items whose committed position actually changed.

use crate::allocator::position_diff;
use crate::drag::{CommitFailure, CommitReport, DragSession};
use crate::error::{EngineError, Result};
use crate::store::OptimisticStore;
use cardboard_common::{BoardId, Card, CardId, ContainerId, DragTarget, List, ListId};
use cardboard_remote::RemoteGateway;
use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::watch;

/// Position-management and optimistic-concurrency engine for one board.
pub struct BoardEngine {
    board_id: BoardId,
    gateway: Arc<dyn RemoteGateway>,
    lists: OptimisticStore<BoardId, List>,
    cards: OptimisticStore<ListId, Card>,
    session: Option<DragSession>,
}

/// One planned card mutation for a commit.
#[derive(Clone)]
enum CardCall {
    Move {
        card_id: CardId,
        target: ListId,
        position: usize,
        affected: [ListId; 2],
    },
    Update {
        card_id: CardId,
        position: usize,
        affected: ListId,
    },
}

impl CardCall {
    fn affected(&self) -> Vec<ListId> {
        match self {
            Self::Move { affected, .. } => affected.to_vec(),
            Self::Update { affected, .. } => vec![affected.clone()],
        }
    }
}

impl BoardEngine {
    /// Create an engine for the board, with the gateway injected
    pub fn new(board_id: BoardId, gateway: Arc<dyn RemoteGateway>) -> Self {
        let mut lists = OptimisticStore::new();
        lists.install(board_id.clone(), Vec::new());
        Self {
            board_id,
            gateway,
            lists,
            cards: OptimisticStore::new(),
            session: None,
        }
    }

    pub fn board_id(&self) -> &BoardId {
        &self.board_id
    }

    /// The drag target currently in flight, if any
    pub fn dragging(&self) -> Option<DragTarget> {
        self.session.as_ref().map(|session| session.target())
    }

    /// Current optimistic list sequence
    pub fn lists(&self) -> Vec<List> {
        self.lists.read(&self.board_id)
    }

    /// Current optimistic card sequence of one list
    pub fn cards(&self, list_id: &ListId) -> Vec<Card> {
        self.cards.read(list_id)
    }

    /// Live list sequence for the UI layer
    pub fn subscribe_lists(&mut self) -> watch::Receiver<Vec<List>> {
        self.lists.subscribe(&self.board_id)
    }

    /// Live card sequence of one list for the UI layer
    pub fn subscribe_cards(&mut self, list_id: &ListId) -> watch::Receiver<Vec<Card>> {
        self.cards.subscribe(list_id)
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Fetch the board's lists and cards and install them as authoritative.
    /// Not allowed mid-gesture.
    pub async fn load(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Err(EngineError::DragInProgress);
        }

        let lists = self.gateway.get_lists(&self.board_id).await?;

        let fetches = lists.iter().map(|list| {
            let gateway = Arc::clone(&self.gateway);
            let list_id = list.id.clone();
            async move {
                let cards = gateway.get_cards(&list_id).await;
                (list_id, cards)
            }
        });
        let fetched = join_all(fetches).await;

        // Prune card containers whose list vanished remotely.
        let live: Vec<ListId> = lists.iter().map(|l| l.id.clone()).collect();
        for key in self.cards.keys() {
            if !live.contains(&key) {
                self.cards.remove(&key);
            }
        }

        self.lists.install(self.board_id.clone(), lists);

        let mut first_error = None;
        for (list_id, result) in fetched {
            match result {
                Ok(cards) => self.cards.install(list_id, cards),
                Err(error) => {
                    tracing::warn!(list = %list_id, "card fetch failed: {error}");
                    first_error.get_or_insert(error);
                }
            }
        }
        match first_error {
            Some(error) => Err(error.into()),
            None => Ok(()),
        }
    }

    /// Refetch everything; an alias for [`load`](Self::load) kept for callers
    /// that want to express intent.
    pub async fn refresh(&mut self) -> Result<()> {
        self.load().await
    }

    // =========================================================================
    // CRUD passthroughs (append-only, per the remote contract)
    // =========================================================================

    /// Create a list; the server appends it at `position = current length`
    pub async fn create_list(&mut self, name: &str, color: Option<&str>) -> Result<List> {
        let list = self.gateway.create_list(&self.board_id, name, color).await?;
        let appended = list.clone();
        self.lists.patch(&self.board_id, |c| c.push(appended));
        self.cards.install(list.id.clone(), Vec::new());
        Ok(list)
    }

    /// Create a card in a list; the server appends it
    pub async fn create_card(&mut self, list_id: &ListId, title: &str) -> Result<Card> {
        if !self.cards.contains(list_id) {
            return Err(EngineError::UnknownContainer {
                container: ContainerId::cards(list_id.clone()),
            });
        }
        let card = self.gateway.create_card(list_id, title).await?;
        let appended = card.clone();
        self.cards.patch(list_id, |c| c.push(appended));
        Ok(card)
    }

    // =========================================================================
    // Drag lifecycle
    // =========================================================================

    /// `Idle -> Dragging`: capture a snapshot of every container the gesture
    /// might touch.
    pub fn begin_drag(&mut self, target: DragTarget) -> Result<()> {
        if self.session.is_some() {
            return Err(EngineError::DragInProgress);
        }

        let session = match target {
            DragTarget::List { list_id } => {
                let (_, origin_index) = self
                    .lists
                    .find_item(&list_id)
                    .ok_or_else(|| EngineError::list_not_found(list_id.as_str()))?;
                DragSession::List {
                    list_id,
                    origin_index,
                    snapshot: self.lists.snapshot(&[self.board_id.clone()]),
                }
            }
            DragTarget::Card {
                card_id,
                source_list_id,
            } => {
                let (origin_list, origin_index) = self
                    .cards
                    .find_item(&card_id)
                    .ok_or_else(|| EngineError::card_not_found(card_id.as_str()))?;
                if origin_list != source_list_id {
                    tracing::debug!(
                        card = %card_id,
                        "drag payload names {source_list_id} but card is in {origin_list}"
                    );
                }
                // A card can be dropped into any list, so capture them all.
                let keys = self.cards.keys();
                DragSession::Card {
                    card_id,
                    origin_list,
                    origin_index,
                    snapshot: self.cards.snapshot(&keys),
                }
            }
        };

        self.session = Some(session);
        Ok(())
    }

    /// Preview the drag target position. Purely local and synchronous; safe
    /// to call on every (rate-limited) pointer-over event.
    pub fn hover(&mut self, container: &ContainerId, index: usize) -> Result<()> {
        let session = self.session.as_ref().ok_or(EngineError::NoActiveDrag)?;

        match session {
            DragSession::List { list_id, .. } => {
                self.ensure_lists_container(container)?;
                let list_id = list_id.clone();
                let (_, current) = self
                    .lists
                    .find_item(&list_id)
                    .ok_or_else(|| EngineError::list_not_found(list_id.as_str()))?;
                self.lists
                    .patch(&self.board_id, |c| c.move_within(current, index));
                Ok(())
            }
            DragSession::Card { card_id, .. } => {
                let hover_list = Self::cards_container(container)?.clone();
                if !self.cards.contains(&hover_list) {
                    return Err(EngineError::UnknownContainer {
                        container: container.clone(),
                    });
                }
                let card_id = card_id.clone();
                let (current_list, current_index) = self
                    .cards
                    .find_item(&card_id)
                    .ok_or_else(|| EngineError::card_not_found(card_id.as_str()))?;

                if current_list == hover_list {
                    self.cards
                        .patch(&hover_list, |c| c.move_within(current_index, index));
                } else {
                    self.cards.patch_pair(&current_list, &hover_list, |src, dst| {
                        src.move_across(current_index, dst, index)
                    });
                }
                Ok(())
            }
        }
    }

    /// `Dragging -> Idle` without side effects: restore the drag-start
    /// snapshot, discarding all preview mutations. Issues no remote calls.
    pub fn cancel_drag(&mut self) -> Result<()> {
        let session = self.session.take().ok_or(EngineError::NoActiveDrag)?;
        match session {
            DragSession::List { snapshot, .. } => {
                self.lists.rollback(&snapshot, &[self.board_id.clone()]);
            }
            DragSession::Card { snapshot, .. } => {
                let keys: Vec<ListId> = snapshot.keys().cloned().collect();
                self.cards.rollback(&snapshot, &keys);
            }
        }
        Ok(())
    }

    /// `Dragging -> Idle` with commit: apply the structural change, diff the
    /// affected containers against the drag-start baseline, and persist only
    /// the items whose position changed. A drop on the drag-start position
    /// discards the gesture with zero side effects.
    pub async fn commit_drag(
        &mut self,
        container: &ContainerId,
        index: usize,
    ) -> Result<CommitReport> {
        let session = self.session.take().ok_or(EngineError::NoActiveDrag)?;

        match session {
            DragSession::List {
                list_id,
                origin_index,
                snapshot,
            } => {
                if let Err(error) = self.ensure_lists_container(container) {
                    self.session = Some(DragSession::List {
                        list_id,
                        origin_index,
                        snapshot,
                    });
                    return Err(error);
                }

                // Rebuild deterministically from the snapshot, then apply
                // the single move. Hover previews cannot skew the diff.
                self.lists.rollback(&snapshot, &[self.board_id.clone()]);
                let len = self.lists.read(&self.board_id).len();
                let target = index.min(len.saturating_sub(1));
                if target == origin_index {
                    return Ok(CommitReport::noop());
                }
                self.lists
                    .patch(&self.board_id, |c| c.move_within(origin_index, target));

                let baseline = snapshot.baseline(&self.board_id);
                let current = self.lists.read(&self.board_id);
                let changed = position_diff(&baseline, &current);
                self.issue_list_updates(snapshot, changed).await
            }
            DragSession::Card {
                card_id,
                origin_list,
                origin_index,
                snapshot,
            } => {
                let target_list = match Self::cards_container(container) {
                    Ok(list_id) if self.cards.contains(list_id) => list_id.clone(),
                    Ok(_) => {
                        let error = EngineError::UnknownContainer {
                            container: container.clone(),
                        };
                        self.session = Some(DragSession::Card {
                            card_id,
                            origin_list,
                            origin_index,
                            snapshot,
                        });
                        return Err(error);
                    }
                    Err(error) => {
                        self.session = Some(DragSession::Card {
                            card_id,
                            origin_list,
                            origin_index,
                            snapshot,
                        });
                        return Err(error);
                    }
                };

                let keys: Vec<ListId> = snapshot.keys().cloned().collect();
                self.cards.rollback(&snapshot, &keys);

                let mut calls: Vec<CardCall> = Vec::new();
                if target_list == origin_list {
                    let len = self.cards.read(&origin_list).len();
                    let target = index.min(len.saturating_sub(1));
                    if target == origin_index {
                        return Ok(CommitReport::noop());
                    }
                    self.cards
                        .patch(&origin_list, |c| c.move_within(origin_index, target));

                    let baseline = snapshot.baseline(&origin_list);
                    let current = self.cards.read(&origin_list);
                    for (id, position) in position_diff(&baseline, &current) {
                        calls.push(CardCall::Update {
                            card_id: id,
                            position,
                            affected: origin_list.clone(),
                        });
                    }
                } else {
                    let target = index.min(self.cards.read(&target_list).len());
                    self.cards
                        .patch_pair(&origin_list, &target_list, |src, dst| {
                            src.move_across(origin_index, dst, target)
                        });

                    // One reparent+reposition call for the dragged card; the
                    // server shifts destination siblings on insert. Source
                    // siblings that slid down get explicit updates.
                    calls.push(CardCall::Move {
                        card_id: card_id.clone(),
                        target: target_list.clone(),
                        position: target,
                        affected: [origin_list.clone(), target_list.clone()],
                    });
                    let baseline = snapshot.baseline(&origin_list);
                    let current = self.cards.read(&origin_list);
                    for (id, position) in position_diff(&baseline, &current) {
                        calls.push(CardCall::Update {
                            card_id: id,
                            position,
                            affected: origin_list.clone(),
                        });
                    }
                }

                self.issue_card_calls(snapshot, calls).await
            }
        }
    }

    // =========================================================================
    // Commit plumbing
    // =========================================================================

    async fn issue_list_updates(
        &mut self,
        snapshot: crate::snapshot::Snapshot<BoardId, ListId>,
        changed: Vec<(ListId, usize)>,
    ) -> Result<CommitReport> {
        let emitted_at = Utc::now();
        let issued = changed.len();

        let futures = changed.into_iter().map(|(list_id, position)| {
            let gateway = Arc::clone(&self.gateway);
            async move {
                let result = gateway.update_list_position(&list_id, position).await;
                (list_id, result)
            }
        });
        let results = join_all(futures).await;

        let mut failures = Vec::new();
        let mut rollback = false;
        let mut refetch = false;
        for (list_id, result) in results {
            match result {
                Ok(list) => {
                    self.lists.reconcile_item(&self.board_id, list, emitted_at);
                }
                Err(error) => {
                    tracing::warn!(list = %list_id, "list position update failed: {error}");
                    let refetched = error.is_gone();
                    refetch |= refetched;
                    rollback |= !refetched;
                    failures.push(CommitFailure {
                        containers: vec![ContainerId::lists(self.board_id.clone())],
                        error,
                        refetched,
                    });
                }
            }
        }

        if refetch {
            // A list vanished: the snapshot is no longer a valid restore
            // target, so take the server's word instead.
            match self.gateway.get_lists(&self.board_id).await {
                Ok(lists) => {
                    self.lists.invalidate(&self.board_id);
                    self.lists.reconcile(&self.board_id, lists, Utc::now());
                }
                Err(error) => {
                    tracing::warn!("list refetch failed: {error}");
                    failures.push(CommitFailure {
                        containers: vec![ContainerId::lists(self.board_id.clone())],
                        error,
                        refetched: false,
                    });
                }
            }
        } else if rollback {
            self.lists.rollback(&snapshot, &[self.board_id.clone()]);
        }

        Ok(CommitReport::committed(issued, failures))
    }

    async fn issue_card_calls(
        &mut self,
        snapshot: crate::snapshot::Snapshot<ListId, CardId>,
        calls: Vec<CardCall>,
    ) -> Result<CommitReport> {
        let emitted_at = Utc::now();
        let issued = calls.len();

        let futures = calls.into_iter().map(|call| {
            let gateway = Arc::clone(&self.gateway);
            async move {
                let result = match &call {
                    CardCall::Move {
                        card_id,
                        target,
                        position,
                        ..
                    } => gateway.move_card(card_id, target, *position).await,
                    CardCall::Update {
                        card_id, position, ..
                    } => gateway.update_card_position(card_id, *position).await,
                };
                (call, result)
            }
        });
        let results = join_all(futures).await;

        let mut failures = Vec::new();
        let mut rollback_keys: Vec<ListId> = Vec::new();
        let mut refetch_keys: Vec<ListId> = Vec::new();
        for (call, result) in results {
            match result {
                Ok(card) => {
                    if let Some((key, _)) = self.cards.find_item(&card.id) {
                        self.cards.reconcile_item(&key, card, emitted_at);
                    }
                }
                Err(error) => {
                    let affected = call.affected();
                    tracing::warn!("card position call failed: {error}");
                    let refetched = error.is_gone();
                    for key in &affected {
                        let bucket = if refetched {
                            &mut refetch_keys
                        } else {
                            &mut rollback_keys
                        };
                        if !bucket.contains(key) {
                            bucket.push(key.clone());
                        }
                    }
                    failures.push(CommitFailure {
                        containers: affected.into_iter().map(ContainerId::cards).collect(),
                        error,
                        refetched,
                    });
                }
            }
        }

        // Authoritative refetch supersedes rollback for the same container.
        rollback_keys.retain(|key| !refetch_keys.contains(key));
        if !rollback_keys.is_empty() {
            self.cards.rollback(&snapshot, &rollback_keys);
        }
        for key in refetch_keys {
            match self.gateway.get_cards(&key).await {
                Ok(cards) => {
                    self.cards.invalidate(&key);
                    self.cards.reconcile(&key, cards, Utc::now());
                }
                Err(error) if error.is_gone() => {
                    // The list itself is gone; drop it from the board.
                    self.cards.remove(&key);
                    self.lists.patch(&self.board_id, |c| {
                        c.remove_by_id(&key);
                    });
                }
                Err(error) => {
                    tracing::warn!(list = %key, "card refetch failed: {error}");
                    failures.push(CommitFailure {
                        containers: vec![ContainerId::cards(key.clone())],
                        error,
                        refetched: false,
                    });
                }
            }
        }

        Ok(CommitReport::committed(issued, failures))
    }

    // =========================================================================
    // Target validation
    // =========================================================================

    fn ensure_lists_container(&self, container: &ContainerId) -> Result<()> {
        match container {
            ContainerId::Lists { board_id } if board_id == &self.board_id => Ok(()),
            ContainerId::Lists { .. } => Err(EngineError::UnknownContainer {
                container: container.clone(),
            }),
            ContainerId::Cards { .. } => Err(EngineError::InvalidTarget {
                container: container.clone(),
            }),
        }
    }

    fn cards_container(container: &ContainerId) -> Result<&ListId> {
        match container {
            ContainerId::Cards { list_id } => Ok(list_id),
            ContainerId::Lists { .. } => Err(EngineError::InvalidTarget {
                container: container.clone(),
            }),
        }
    }
}
