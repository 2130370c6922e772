//! Card types

use super::ids::{CardId, ListId};
use super::sequence::Sequenced;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A card on the board.
///
/// A card belongs to exactly one list at a time; `position` is its dense
/// integer rank within that list. Everything beyond `{id, list_id, title,
/// position}` is metadata the reorder engine carries but never inspects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub list_id: ListId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_completed: bool,
    pub position: usize,
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Create a new card at the given position
    pub fn new(list_id: ListId, title: impl Into<String>, position: usize) -> Self {
        Self {
            id: CardId::new(),
            list_id,
            title: title.into(),
            description: None,
            color: None,
            due_date: None,
            is_completed: false,
            position,
            created_at: Utc::now(),
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the card color
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Set the due date
    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }
}

impl Sequenced for Card {
    type Id = CardId;

    fn id(&self) -> &CardId {
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
