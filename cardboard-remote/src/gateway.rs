//! The remote gateway contract
//!
//! The persistence layer sits behind this trait. Calls are asynchronous and
//! independently fallible, and their completion order across calls is not
//! guaranteed; the engine reconciles responses by emission time, never by
//! arrival time.

use crate::error::Result;
use async_trait::async_trait;
use cardboard_common::{BoardId, Card, CardId, List, ListId};

/// Abstract boundary to the persistence collaborator.
#[async_trait]
pub trait RemoteGateway: Send + Sync {
    /// Fetch a board's lists, ordered by position ascending, ties broken by
    /// creation time ascending.
    async fn get_lists(&self, board_id: &BoardId) -> Result<Vec<List>>;

    /// Fetch a list's cards, same ordering contract as [`get_lists`].
    ///
    /// [`get_lists`]: RemoteGateway::get_lists
    async fn get_cards(&self, list_id: &ListId) -> Result<Vec<Card>>;

    /// Create a list appended at `position = current length`.
    async fn create_list(
        &self,
        board_id: &BoardId,
        name: &str,
        color: Option<&str>,
    ) -> Result<List>;

    /// Create a card appended at `position = current length`.
    async fn create_card(&self, list_id: &ListId, title: &str) -> Result<Card>;

    /// Persist a list's new position within its board.
    async fn update_list_position(&self, list_id: &ListId, position: usize) -> Result<List>;

    /// Persist a card's new position within its current list.
    async fn update_card_position(&self, card_id: &CardId, position: usize) -> Result<Card>;

    /// Reparent and reposition a card in one call. The server inserts the
    /// card at `position` in the target list, shifting destination siblings;
    /// positions in the source list are the caller's responsibility.
    async fn move_card(
        &self,
        card_id: &CardId,
        target_list_id: &ListId,
        position: usize,
    ) -> Result<Card>;
}
