//! Card repository functions for the domain layer.

use sea_orm::ConnectionTrait;

use crate::adapters::cards_sea as cards_adapter;
use crate::domain::grid::Grid;
use crate::entities::cards;
use crate::errors::domain::{DomainError, NotFoundKind, StateKind};

/// Card domain model.
///
/// Converted from the database model (cards::Model) when loaded through repos
/// functions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: i64,
    pub user_id: i64,
    pub year: i32,
    pub title: Option<String>,
    pub category: Option<String>,
    pub grid_size: i16,
    pub header_text: String,
    pub has_free_space: bool,
    pub free_space_pos: Option<i16>,
    pub is_finalized: bool,
    pub visible_to_friends: bool,
    pub is_archived: bool,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
}

impl Card {
    /// Validated grid geometry for this card.
    pub fn grid(&self) -> Result<Grid, DomainError> {
        let free_space_pos = if self.has_free_space {
            self.free_space_pos
        } else {
            None
        };
        Grid::new(self.grid_size, free_space_pos)
    }

    pub fn capacity(&self) -> Result<usize, DomainError> {
        Ok(self.grid()?.capacity())
    }

    /// Ownership gate applied by every mutating operation.
    pub fn ensure_owned_by(&self, user_id: i64) -> Result<(), DomainError> {
        if self.user_id != user_id {
            return Err(DomainError::forbidden(format!(
                "Card {} does not belong to user {user_id}",
                self.id
            )));
        }
        Ok(())
    }

    /// Structural mutations (add/remove/reposition/config) require a draft.
    pub fn ensure_draft(&self) -> Result<(), DomainError> {
        if self.is_finalized {
            return Err(DomainError::state(
                StateKind::CardFinalized,
                format!("Card {} is finalized; its items are frozen", self.id),
            ));
        }
        Ok(())
    }

    /// Completion tracking requires a finalized card.
    pub fn ensure_finalized(&self) -> Result<(), DomainError> {
        if !self.is_finalized {
            return Err(DomainError::state(
                StateKind::CardNotFinalized,
                format!("Card {} is still a draft; finalize it first", self.id),
            ));
        }
        Ok(())
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<Option<Card>, DomainError> {
    let card = cards_adapter::find_by_id(conn, card_id).await?;
    Ok(card.map(Card::from))
}

/// Find card by ID or return a domain NotFound.
pub async fn require_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<Card, DomainError> {
    find_by_id(conn, card_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Card, format!("Card {card_id} not found"))
    })
}

/// Load-and-authorize step shared by every mutating operation: the card must
/// exist and belong to the acting user.
pub async fn require_owned_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    user_id: i64,
) -> Result<Card, DomainError> {
    let card = require_card(conn, card_id).await?;
    card.ensure_owned_by(user_id)?;
    Ok(card)
}

/// Same as [`require_owned_card`] but takes the exclusive row lock first.
/// Must run inside a transaction; state read afterwards is fresh under the
/// lock.
pub async fn require_owned_card_locked<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    user_id: i64,
) -> Result<Card, DomainError> {
    let card = cards_adapter::lock_by_id(conn, card_id)
        .await?
        .map(Card::from)
        .ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Card, format!("Card {card_id} not found"))
        })?;
    card.ensure_owned_by(user_id)?;
    Ok(card)
}

pub async fn find_by_user_year_title<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    year: i32,
    title: Option<&str>,
) -> Result<Option<Card>, DomainError> {
    let card = cards_adapter::find_by_user_year_title(conn, user_id, year, title).await?;
    Ok(card.map(Card::from))
}

pub async fn list_by_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    archived: Option<bool>,
) -> Result<Vec<Card>, DomainError> {
    let cards = cards_adapter::list_by_user(conn, user_id, archived).await?;
    Ok(cards.into_iter().map(Card::from).collect())
}

/// Load a set of owned cards by id, failing if any id is missing or foreign.
pub async fn require_owned_cards<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
    user_id: i64,
) -> Result<Vec<Card>, DomainError> {
    let cards = cards_adapter::find_many_owned(conn, ids, user_id).await?;
    if cards.len() != ids.len() {
        let found: Vec<i64> = cards.iter().map(|c| c.id).collect();
        let missing: Vec<i64> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
        return Err(DomainError::not_found(
            NotFoundKind::Card,
            format!("Cards not found or not owned: {missing:?}"),
        ));
    }
    Ok(cards.into_iter().map(Card::from).collect())
}

// Conversions between SeaORM models and domain models

impl From<cards::Model> for Card {
    fn from(model: cards::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            year: model.year,
            title: model.title,
            category: model.category,
            grid_size: model.grid_size,
            header_text: model.header_text,
            has_free_space: model.has_free_space,
            free_space_pos: model.free_space_pos,
            is_finalized: model.is_finalized,
            visible_to_friends: model.visible_to_friends,
            is_archived: model.is_archived,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
