//! List (column) types

use super::ids::{BoardId, ListId};
use super::sequence::Sequenced;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A list (column) on a board, holding an ordered sequence of cards.
///
/// `position` is the list's dense integer rank among its board's lists.
/// It is meaningful only relative to the board that owns the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub board_id: BoardId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub position: usize,
    pub created_at: DateTime<Utc>,
}

impl List {
    /// Create a new list at the given position
    pub fn new(board_id: BoardId, name: impl Into<String>, position: usize) -> Self {
        Self {
            id: ListId::new(),
            board_id,
            name: name.into(),
            color: None,
            position,
            created_at: Utc::now(),
        }
    }

    /// Set the list color (hex string as sent by the remote)
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }
}

impl Sequenced for List {
    type Id = ListId;

    fn id(&self) -> &ListId {
        &self.id
    }

    fn position(&self) -> usize {
        self.position
    }

    fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_creation() {
        let list = List::new(BoardId::from_string("b1"), "To Do", 0);
        assert_eq!(list.name, "To Do");
        assert_eq!(list.position, 0);
        assert!(list.color.is_none());
    }

    #[test]
    fn test_list_with_color() {
        let list = List::new(BoardId::from_string("b1"), "Doing", 1).with_color("#00ff00");
        assert_eq!(list.color.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn test_list_serialization() {
        let list = List::new(BoardId::from_string("b1"), "Done", 2);
        let json = serde_json::to_string(&list).unwrap();
        let parsed: List = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, list);
        // color is omitted when unset
        assert!(!json.contains("\"color\""));
    }
}
