//! Drag targets and container identifiers

use super::ids::{BoardId, CardId, ListId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What is being dragged.
///
/// A tagged variant rather than an untyped payload: consumers match
/// exhaustively instead of inspecting kind strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DragTarget {
    /// A list being reordered within its board
    List { list_id: ListId },
    /// A card being moved within or across lists
    Card {
        card_id: CardId,
        source_list_id: ListId,
    },
}

impl DragTarget {
    /// Target a list
    pub fn list(list_id: impl Into<ListId>) -> Self {
        Self::List {
            list_id: list_id.into(),
        }
    }

    /// Target a card in the given source list
    pub fn card(card_id: impl Into<CardId>, source_list_id: impl Into<ListId>) -> Self {
        Self::Card {
            card_id: card_id.into(),
            source_list_id: source_list_id.into(),
        }
    }
}

/// Identifies one ordered container on the board: either the board's sequence
/// of lists, or one list's sequence of cards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContainerId {
    /// The ordered lists of a board
    Lists { board_id: BoardId },
    /// The ordered cards of a list
    Cards { list_id: ListId },
}

impl ContainerId {
    /// The board's list container
    pub fn lists(board_id: impl Into<BoardId>) -> Self {
        Self::Lists {
            board_id: board_id.into(),
        }
    }

    /// A list's card container
    pub fn cards(list_id: impl Into<ListId>) -> Self {
        Self::Cards {
            list_id: list_id.into(),
        }
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lists { board_id } => write!(f, "lists:{}", board_id),
            Self::Cards { list_id } => write!(f, "cards:{}", list_id),
        }
    }
}
