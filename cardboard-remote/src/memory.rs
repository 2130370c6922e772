//! In-memory gateway fake
//!
//! A deterministic stand-in for the persistence collaborator: seeded state,
//! a recorded call log for asserting exactly which mutations were issued,
//! and queued fault injection for exercising failure paths.

use crate::error::{RemoteError, Result};
use crate::gateway::RemoteGateway;
use async_trait::async_trait;
use cardboard_common::{BoardId, Card, CardId, List, ListId, Sequenced};
use tokio::sync::Mutex;

/// One recorded gateway invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    GetLists {
        board_id: BoardId,
    },
    GetCards {
        list_id: ListId,
    },
    CreateList {
        board_id: BoardId,
        name: String,
    },
    CreateCard {
        list_id: ListId,
        title: String,
    },
    UpdateListPosition {
        list_id: ListId,
        position: usize,
    },
    UpdateCardPosition {
        card_id: CardId,
        position: usize,
    },
    MoveCard {
        card_id: CardId,
        target_list_id: ListId,
        position: usize,
    },
}

impl GatewayCall {
    /// True for calls that mutate server state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::GetLists { .. } | Self::GetCards { .. })
    }
}

/// A queued failure: consumed by the next matching call.
struct Fault {
    op: &'static str,
    id: Option<String>,
    error: RemoteError,
}

#[derive(Default)]
struct State {
    lists: Vec<List>,
    cards: Vec<Card>,
    calls: Vec<GatewayCall>,
    faults: Vec<Fault>,
}

impl State {
    /// Pop a queued fault matching this operation and primary id, if any
    fn take_fault(&mut self, op: &'static str, id: &str) -> Option<RemoteError> {
        let index = self
            .faults
            .iter()
            .position(|f| f.op == op && f.id.as_deref().map(|want| want == id).unwrap_or(true))?;
        Some(self.faults.remove(index).error)
    }
}

/// In-memory [`RemoteGateway`] implementation for tests.
pub struct InMemoryGateway {
    state: Mutex<State>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Seed a list into server state
    pub async fn seed_list(&self, list: List) {
        self.state.lock().await.lists.push(list);
    }

    /// Seed a card into server state
    pub async fn seed_card(&self, card: Card) {
        self.state.lock().await.cards.push(card);
    }

    /// Delete a list and its cards server-side (simulates a concurrent
    /// soft-delete by another client)
    pub async fn delete_list(&self, list_id: &ListId) {
        let mut state = self.state.lock().await;
        state.lists.retain(|l| &l.id != list_id);
        state.cards.retain(|c| &c.list_id != list_id);
    }

    /// Delete a card server-side
    pub async fn delete_card(&self, card_id: &CardId) {
        let mut state = self.state.lock().await;
        state.cards.retain(|c| &c.id != card_id);
    }

    /// Queue a failure for the next call of `op`, regardless of target
    pub async fn fail_next(&self, op: &'static str, error: RemoteError) {
        self.state.lock().await.faults.push(Fault {
            op,
            id: None,
            error,
        });
    }

    /// Queue a failure for the next call of `op` whose primary id matches
    pub async fn fail_next_for(&self, op: &'static str, id: impl Into<String>, error: RemoteError) {
        self.state.lock().await.faults.push(Fault {
            op,
            id: Some(id.into()),
            error,
        });
    }

    /// All calls recorded so far, in issue order
    pub async fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().await.calls.clone()
    }

    /// Mutation calls only
    pub async fn mutation_calls(&self) -> Vec<GatewayCall> {
        self.state
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.is_mutation())
            .cloned()
            .collect()
    }

    /// Drop the recorded call log
    pub async fn clear_calls(&self) {
        self.state.lock().await.calls.clear();
    }

    /// Inspect server-side lists without recording a call
    pub async fn server_lists(&self, board_id: &BoardId) -> Vec<List> {
        let state = self.state.lock().await;
        sorted_by_contract(
            state
                .lists
                .iter()
                .filter(|l| &l.board_id == board_id)
                .cloned()
                .collect(),
        )
    }

    /// Inspect server-side cards without recording a call
    pub async fn server_cards(&self, list_id: &ListId) -> Vec<Card> {
        let state = self.state.lock().await;
        sorted_by_contract(
            state
                .cards
                .iter()
                .filter(|c| &c.list_id == list_id)
                .cloned()
                .collect(),
        )
    }
}

impl Default for InMemoryGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Position ascending, creation time ascending on ties
fn sorted_by_contract<T: Sequenced>(mut items: Vec<T>) -> Vec<T> {
    items.sort_by(|a, b| {
        a.position()
            .cmp(&b.position())
            .then(a.created_at().cmp(&b.created_at()))
    });
    items
}

#[async_trait]
impl RemoteGateway for InMemoryGateway {
    async fn get_lists(&self, board_id: &BoardId) -> Result<Vec<List>> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::GetLists {
            board_id: board_id.clone(),
        });
        if let Some(error) = state.take_fault("get_lists", board_id.as_str()) {
            return Err(error);
        }

        Ok(sorted_by_contract(
            state
                .lists
                .iter()
                .filter(|l| &l.board_id == board_id)
                .cloned()
                .collect(),
        ))
    }

    async fn get_cards(&self, list_id: &ListId) -> Result<Vec<Card>> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::GetCards {
            list_id: list_id.clone(),
        });
        if let Some(error) = state.take_fault("get_cards", list_id.as_str()) {
            return Err(error);
        }
        if !state.lists.iter().any(|l| &l.id == list_id) {
            return Err(RemoteError::not_found("list", list_id.as_str()));
        }

        Ok(sorted_by_contract(
            state
                .cards
                .iter()
                .filter(|c| &c.list_id == list_id)
                .cloned()
                .collect(),
        ))
    }

    async fn create_list(
        &self,
        board_id: &BoardId,
        name: &str,
        color: Option<&str>,
    ) -> Result<List> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::CreateList {
            board_id: board_id.clone(),
            name: name.to_string(),
        });
        if let Some(error) = state.take_fault("create_list", board_id.as_str()) {
            return Err(error);
        }

        let position = state.lists.iter().filter(|l| &l.board_id == board_id).count();
        let mut list = List::new(board_id.clone(), name, position);
        if let Some(color) = color {
            list = list.with_color(color);
        }
        state.lists.push(list.clone());
        Ok(list)
    }

    async fn create_card(&self, list_id: &ListId, title: &str) -> Result<Card> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::CreateCard {
            list_id: list_id.clone(),
            title: title.to_string(),
        });
        if let Some(error) = state.take_fault("create_card", list_id.as_str()) {
            return Err(error);
        }
        if !state.lists.iter().any(|l| &l.id == list_id) {
            return Err(RemoteError::not_found("list", list_id.as_str()));
        }

        let position = state.cards.iter().filter(|c| &c.list_id == list_id).count();
        let card = Card::new(list_id.clone(), title, position);
        state.cards.push(card.clone());
        Ok(card)
    }

    async fn update_list_position(&self, list_id: &ListId, position: usize) -> Result<List> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::UpdateListPosition {
            list_id: list_id.clone(),
            position,
        });
        if let Some(error) = state.take_fault("update_list_position", list_id.as_str()) {
            return Err(error);
        }

        let list = state
            .lists
            .iter_mut()
            .find(|l| &l.id == list_id)
            .ok_or_else(|| RemoteError::not_found("list", list_id.as_str()))?;
        list.position = position;
        Ok(list.clone())
    }

    async fn update_card_position(&self, card_id: &CardId, position: usize) -> Result<Card> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::UpdateCardPosition {
            card_id: card_id.clone(),
            position,
        });
        if let Some(error) = state.take_fault("update_card_position", card_id.as_str()) {
            return Err(error);
        }

        let card = state
            .cards
            .iter_mut()
            .find(|c| &c.id == card_id)
            .ok_or_else(|| RemoteError::not_found("card", card_id.as_str()))?;
        card.position = position;
        Ok(card.clone())
    }

    async fn move_card(
        &self,
        card_id: &CardId,
        target_list_id: &ListId,
        position: usize,
    ) -> Result<Card> {
        let mut state = self.state.lock().await;
        state.calls.push(GatewayCall::MoveCard {
            card_id: card_id.clone(),
            target_list_id: target_list_id.clone(),
            position,
        });
        if let Some(error) = state.take_fault("move_card", card_id.as_str()) {
            return Err(error);
        }
        if !state.lists.iter().any(|l| &l.id == target_list_id) {
            return Err(RemoteError::not_found("list", target_list_id.as_str()));
        }
        let card_index = state
            .cards
            .iter()
            .position(|c| &c.id == card_id)
            .ok_or_else(|| RemoteError::not_found("card", card_id.as_str()))?;

        // Insert shifts destination siblings; the source list keeps its gap
        // until the client's explicit position updates arrive.
        for card in state
            .cards
            .iter_mut()
            .filter(|c| &c.id != card_id && &c.list_id == target_list_id && c.position >= position)
        {
            card.position += 1;
        }

        let card = &mut state.cards[card_index];
        card.list_id = target_list_id.clone();
        card.position = position;
        Ok(card.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardId {
        BoardId::from_string("b1")
    }

    async fn setup() -> InMemoryGateway {
        let gateway = InMemoryGateway::new();
        let a = List::new(board(), "A", 0);
        let b = List::new(board(), "B", 1);
        for (i, title) in ["Card1", "Card2"].iter().enumerate() {
            gateway.seed_card(Card::new(a.id.clone(), *title, i)).await;
        }
        gateway.seed_card(Card::new(b.id.clone(), "Card3", 0)).await;
        gateway.seed_list(a).await;
        gateway.seed_list(b).await;
        gateway
    }

    #[tokio::test]
    async fn test_get_lists_ordering() {
        let gateway = InMemoryGateway::new();
        // Seed out of order; fetch comes back position-sorted.
        gateway.seed_list(List::new(board(), "Second", 1)).await;
        gateway.seed_list(List::new(board(), "First", 0)).await;

        let lists = gateway.get_lists(&board()).await.unwrap();
        assert_eq!(lists[0].name, "First");
        assert_eq!(lists[1].name, "Second");
    }

    #[tokio::test]
    async fn test_create_appends_at_length() {
        let gateway = setup().await;
        let created = gateway
            .create_list(&board(), "C", Some("#112233"))
            .await
            .unwrap();
        assert_eq!(created.position, 2);
        assert_eq!(created.color.as_deref(), Some("#112233"));

        let lists = gateway.server_lists(&board()).await;
        let card_list = lists[0].id.clone();
        let card = gateway.create_card(&card_list, "New card").await.unwrap();
        assert_eq!(card.position, 2);
    }

    #[tokio::test]
    async fn test_move_card_shifts_destination_only() {
        let gateway = setup().await;
        let lists = gateway.server_lists(&board()).await;
        let (a, b) = (lists[0].id.clone(), lists[1].id.clone());
        let moved = gateway.server_cards(&a).await[0].id.clone();

        gateway.move_card(&moved, &b, 0).await.unwrap();

        let dest = gateway.server_cards(&b).await;
        assert_eq!(dest.len(), 2);
        assert_eq!(dest[0].id, moved);
        assert_eq!(dest[0].position, 0);
        assert_eq!(dest[1].position, 1);

        // Source keeps its gap: remaining card still at position 1.
        let source = gateway.server_cards(&a).await;
        assert_eq!(source.len(), 1);
        assert_eq!(source[0].position, 1);
    }

    #[tokio::test]
    async fn test_fault_injection_targets_id() {
        let gateway = setup().await;
        let lists = gateway.server_lists(&board()).await;
        let cards = gateway.server_cards(&lists[0].id).await;
        let (first, second) = (cards[0].id.clone(), cards[1].id.clone());

        gateway
            .fail_next_for(
                "update_card_position",
                second.as_str(),
                RemoteError::network("boom"),
            )
            .await;

        // Non-matching target is unaffected.
        gateway.update_card_position(&first, 5).await.unwrap();
        // Matching target consumes the fault.
        let err = gateway.update_card_position(&second, 6).await.unwrap_err();
        assert!(err.is_retryable());
        // Fault is gone afterwards.
        gateway.update_card_position(&second, 6).await.unwrap();
    }

    #[tokio::test]
    async fn test_call_log_records_mutations() {
        let gateway = setup().await;
        let lists = gateway.server_lists(&board()).await;
        gateway.get_lists(&board()).await.unwrap();
        gateway
            .update_list_position(&lists[0].id, 1)
            .await
            .unwrap();

        let mutations = gateway.mutation_calls().await;
        assert_eq!(
            mutations,
            vec![GatewayCall::UpdateListPosition {
                list_id: lists[0].id.clone(),
                position: 1,
            }]
        );
        assert_eq!(gateway.calls().await.len(), 2);
    }

    #[tokio::test]
    async fn test_missing_card_not_found() {
        let gateway = setup().await;
        let err = gateway
            .update_card_position(&CardId::from_string("ghost"), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, RemoteError::NotFound { .. }));
    }
}
