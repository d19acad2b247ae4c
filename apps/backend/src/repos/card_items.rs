//! Item repository functions for the domain layer.

use sea_orm::ConnectionTrait;

use crate::adapters::card_items_sea as items_adapter;
use crate::domain::stats::ItemCompletion;
use crate::entities::card_items;
use crate::errors::domain::{DomainError, NotFoundKind};

/// Item domain model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardItem {
    pub id: i64,
    pub card_id: i64,
    pub position: i16,
    pub content: String,
    pub is_completed: bool,
    pub completed_at: Option<time::OffsetDateTime>,
    pub notes: Option<String>,
    pub proof_url: Option<String>,
    pub created_at: time::OffsetDateTime,
    pub updated_at: time::OffsetDateTime,
}

impl CardItem {
    /// Completion view consumed by the stats builder.
    pub fn completion(&self) -> ItemCompletion {
        ItemCompletion {
            position: self.position,
            is_completed: self.is_completed,
            completed_at: self.completed_at,
        }
    }
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    item_id: i64,
) -> Result<Option<CardItem>, DomainError> {
    let item = items_adapter::find_by_id(conn, item_id).await?;
    Ok(item.map(CardItem::from))
}

/// Find an item by ID and require it to belong to `card_id`. Items reached
/// through a foreign card surface as NotFound, not Forbidden, so item ids
/// cannot be probed across cards.
pub async fn require_item_on_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    item_id: i64,
) -> Result<CardItem, DomainError> {
    let item = find_by_id(conn, item_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Item, format!("Item {item_id} not found"))
    })?;
    if item.card_id != card_id {
        return Err(DomainError::not_found(
            NotFoundKind::Item,
            format!("Item {item_id} not found on card {card_id}"),
        ));
    }
    Ok(item)
}

/// All items of a card in ascending position order.
pub async fn find_by_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<Vec<CardItem>, DomainError> {
    let items = items_adapter::find_by_card(conn, card_id).await?;
    Ok(items.into_iter().map(CardItem::from).collect())
}

pub async fn find_by_card_and_position<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    position: i16,
) -> Result<Option<CardItem>, DomainError> {
    let item = items_adapter::find_by_card_and_position(conn, card_id, position).await?;
    Ok(item.map(CardItem::from))
}

pub async fn occupied_positions<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<Vec<i16>, DomainError> {
    Ok(items_adapter::occupied_positions(conn, card_id).await?)
}

pub async fn count_by_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<u64, DomainError> {
    Ok(items_adapter::count_by_card(conn, card_id).await?)
}

// Conversions between SeaORM models and domain models

impl From<card_items::Model> for CardItem {
    fn from(model: card_items::Model) -> Self {
        Self {
            id: model.id,
            card_id: model.card_id,
            position: model.position,
            content: model.content,
            is_completed: model.is_completed,
            completed_at: model.completed_at,
            notes: model.notes,
            proof_url: model.proof_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
