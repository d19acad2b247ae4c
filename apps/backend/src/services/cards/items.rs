//! Position allocator and item mutations.

use rand::seq::IndexedRandom;
use sea_orm::DatabaseConnection;
use time::OffsetDateTime;
use tracing::{debug, info};

use super::CardService;
use crate::adapters::card_items_sea::{self, ItemCreate};
use crate::db::with_txn;
use crate::domain::stats::count_bingos;
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::{card_items, cards, CardItem};

/// Input for [`CardService::add_item`].
#[derive(Debug, Clone)]
pub struct AddItem {
    pub content: String,
    /// Explicit cell, or `None` for a uniformly random open cell.
    pub position: Option<i16>,
    pub notes: Option<String>,
    pub proof_url: Option<String>,
}

impl AddItem {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            position: None,
            notes: None,
            proof_url: None,
        }
    }

    pub fn at(mut self, position: i16) -> Self {
        self.position = Some(position);
        self
    }
}

/// Result of completing an item, including the bingo-line delta. When
/// `new_bingos() > 0` the caller is expected to invoke the
/// friend-notification collaborator; the engine itself never does.
#[derive(Debug, Clone)]
pub struct CompletionOutcome {
    pub item: CardItem,
    pub bingos_before: u32,
    pub bingos_after: u32,
}

impl CompletionOutcome {
    pub fn new_bingos(&self) -> u32 {
        self.bingos_after.saturating_sub(self.bingos_before)
    }
}

impl CardService {
    /// Add an item at an explicit or random position.
    ///
    /// Explicit inserts validate against the currently loaded item set and
    /// let the (card_id, position) uniqueness constraint catch writer races,
    /// which surface as [`ConflictKind::PositionOccupied`]. Random inserts
    /// take the exclusive card row lock, re-read the occupied set under it,
    /// and pick uniformly among the open cells, so concurrent callers can
    /// never collide.
    pub async fn add_item(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        input: AddItem,
    ) -> Result<CardItem, DomainError> {
        let content = crate::domain::fields::validate_content(&input.content)?;
        let notes = crate::domain::fields::validate_notes(input.notes.as_deref())?;
        let proof_url = crate::domain::fields::validate_proof_url(input.proof_url.as_deref())?;

        match input.position {
            Some(position) => {
                self.add_item_at(db, user_id, card_id, position, content, notes, proof_url)
                    .await
            }
            None => {
                self.add_item_random(db, user_id, card_id, content, notes, proof_url)
                    .await
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn add_item_at(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        position: i16,
        content: String,
        notes: Option<String>,
        proof_url: Option<String>,
    ) -> Result<CardItem, DomainError> {
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        card.ensure_draft()?;
        let grid = card.grid()?;

        if !grid.is_valid_item_position(position) {
            return Err(DomainError::validation(
                ValidationKind::Position,
                format!("Position {position} is outside the grid or on the free space"),
            ));
        }
        if card_items::find_by_card_and_position(db, card_id, position)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                ConflictKind::PositionOccupied,
                format!("Position {position} already holds an item"),
            ));
        }

        // A concurrent writer can still slip in between the check and the
        // insert; the uniqueness constraint turns that race into the same
        // PositionOccupied conflict.
        let dto = ItemCreate::new(card_id, position, content)
            .with_notes(notes)
            .with_proof_url(proof_url);
        let item = card_items_sea::create_item(db, dto).await.map(CardItem::from)?;
        debug!(card_id, position, item_id = item.id, "item added at explicit position");
        Ok(item)
    }

    async fn add_item_random(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        content: String,
        notes: Option<String>,
        proof_url: Option<String>,
    ) -> Result<CardItem, DomainError> {
        let mut rng = self.fork_rng();
        let item = with_txn(db, move |txn| {
            Box::pin(async move {
                // Lock first, then re-read everything the decision depends
                // on; concurrent allocators against this card queue up here.
                let card = cards::require_owned_card_locked(txn, card_id, user_id).await?;
                card.ensure_draft()?;
                let grid = card.grid()?;

                let occupied = card_items::occupied_positions(txn, card_id).await?;
                let open = grid.open_positions(&occupied);
                let Some(position) = open.choose(&mut rng).copied() else {
                    return Err(DomainError::capacity(format!(
                        "Card {card_id} has no open positions left"
                    )));
                };

                let dto = ItemCreate::new(card_id, position, content)
                    .with_notes(notes)
                    .with_proof_url(proof_url);
                let item = card_items_sea::create_item(txn, dto).await.map(CardItem::from)?;
                Ok(item)
            })
        })
        .await?;

        debug!(card_id, position = item.position, item_id = item.id, "item added at random position");
        Ok(item)
    }

    /// Rewrite an item's goal text. Draft cards only.
    pub async fn update_item_content(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        item_id: i64,
        content: &str,
    ) -> Result<CardItem, DomainError> {
        let content = crate::domain::fields::validate_content(content)?;
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        card.ensure_draft()?;
        card_items::require_item_on_card(db, card_id, item_id).await?;

        let item = card_items_sea::update_content(db, item_id, content)
            .await
            .map(CardItem::from)?;
        Ok(item)
    }

    /// Move an item to an explicit empty cell. Draft cards only.
    pub async fn update_item_position(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        item_id: i64,
        position: i16,
    ) -> Result<CardItem, DomainError> {
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        card.ensure_draft()?;
        let grid = card.grid()?;

        if !grid.is_valid_item_position(position) {
            return Err(DomainError::validation(
                ValidationKind::Position,
                format!("Position {position} is outside the grid or on the free space"),
            ));
        }

        let item = card_items::require_item_on_card(db, card_id, item_id).await?;
        if item.position == position {
            return Ok(item);
        }
        if card_items::find_by_card_and_position(db, card_id, position)
            .await?
            .is_some()
        {
            return Err(DomainError::conflict(
                ConflictKind::PositionOccupied,
                format!("Position {position} already holds an item"),
            ));
        }

        let item = card_items_sea::update_position(db, item_id, position)
            .await
            .map(CardItem::from)?;
        Ok(item)
    }

    /// Remove an item from a draft card.
    pub async fn remove_item(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        item_id: i64,
    ) -> Result<(), DomainError> {
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        card.ensure_draft()?;
        card_items::require_item_on_card(db, card_id, item_id).await?;

        card_items_sea::delete_by_id(db, item_id).await?;
        debug!(card_id, item_id, "item removed");
        Ok(())
    }

    /// Mark an item complete and report the bingo-line delta.
    ///
    /// Only finalized cards track completion. Completing an item that is
    /// already complete is a no-op with a zero delta.
    pub async fn complete_item(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        item_id: i64,
    ) -> Result<CompletionOutcome, DomainError> {
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        card.ensure_finalized()?;
        let grid = card.grid()?;
        let item = card_items::require_item_on_card(db, card_id, item_id).await?;

        let items = card_items::find_by_card(db, card_id).await?;
        let completed: Vec<i16> = items
            .iter()
            .filter(|i| i.is_completed)
            .map(|i| i.position)
            .collect();
        let bingos_before = count_bingos(&grid, &completed);

        if item.is_completed {
            return Ok(CompletionOutcome {
                item,
                bingos_before,
                bingos_after: bingos_before,
            });
        }

        let item = card_items_sea::set_completion(
            db,
            item_id,
            true,
            Some(OffsetDateTime::now_utc()),
        )
        .await
        .map(CardItem::from)?;

        let mut completed_after = completed;
        completed_after.push(item.position);
        let bingos_after = count_bingos(&grid, &completed_after);

        if bingos_after > bingos_before {
            info!(
                card_id,
                item_id,
                bingos_before,
                bingos_after,
                "item completion produced new bingo lines"
            );
        }

        Ok(CompletionOutcome {
            item,
            bingos_before,
            bingos_after,
        })
    }

    /// Clear an item's completion mark. Only finalized cards track
    /// completion; un-completing an incomplete item is a no-op.
    pub async fn uncomplete_item(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        item_id: i64,
    ) -> Result<CardItem, DomainError> {
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        card.ensure_finalized()?;
        let item = card_items::require_item_on_card(db, card_id, item_id).await?;

        if !item.is_completed {
            return Ok(item);
        }

        let item = card_items_sea::set_completion(db, item_id, false, None)
            .await
            .map(CardItem::from)?;
        Ok(item)
    }

    /// Update an item's notes. Allowed in both draft and finalized states.
    pub async fn update_item_notes(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        item_id: i64,
        notes: Option<&str>,
    ) -> Result<CardItem, DomainError> {
        let notes = crate::domain::fields::validate_notes(notes)?;
        cards::require_owned_card(db, card_id, user_id).await?;
        card_items::require_item_on_card(db, card_id, item_id).await?;

        let item = card_items_sea::update_notes(db, item_id, notes)
            .await
            .map(CardItem::from)?;
        Ok(item)
    }

    /// Update an item's proof URL. Allowed in both draft and finalized
    /// states.
    pub async fn update_item_proof(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        item_id: i64,
        proof_url: Option<&str>,
    ) -> Result<CardItem, DomainError> {
        let proof_url = crate::domain::fields::validate_proof_url(proof_url)?;
        cards::require_owned_card(db, card_id, user_id).await?;
        card_items::require_item_on_card(db, card_id, item_id).await?;

        let item = card_items_sea::update_proof_url(db, item_id, proof_url)
            .await
            .map(CardItem::from)?;
        Ok(item)
    }
}
