//! DTOs for the card_items_sea adapter.

use time::OffsetDateTime;

/// DTO for creating a new item.
#[derive(Debug, Clone)]
pub struct ItemCreate {
    pub card_id: i64,
    pub position: i16,
    pub content: String,
    pub notes: Option<String>,
    pub proof_url: Option<String>,
    pub is_completed: bool,
    pub completed_at: Option<OffsetDateTime>,
}

impl ItemCreate {
    pub fn new(card_id: i64, position: i16, content: impl Into<String>) -> Self {
        Self {
            card_id,
            position,
            content: content.into(),
            notes: None,
            proof_url: None,
            is_completed: false,
            completed_at: None,
        }
    }

    pub fn with_notes(mut self, notes: Option<String>) -> Self {
        self.notes = notes;
        self
    }

    pub fn with_proof_url(mut self, proof_url: Option<String>) -> Self {
        self.proof_url = proof_url;
        self
    }
}
