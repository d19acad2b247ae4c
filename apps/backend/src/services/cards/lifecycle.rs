//! Finalize, visibility, archive and card configuration.

use rand::seq::IndexedRandom;
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use super::{pick_free_space_pos, CardService};
use crate::adapters::{card_items_sea, cards_sea};
use crate::db::with_txn;
use crate::domain::grid::{self, Grid};
use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, StateKind};
use crate::repos::{card_items, cards, Card};

/// Input for [`CardService::update_card_config`]. `None` fields are left
/// unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateCardConfig {
    pub header_text: Option<String>,
    pub has_free_space: Option<bool>,
    /// Explicit cell when enabling the free space; defaults to center/random.
    pub free_space_pos: Option<i16>,
}

impl CardService {
    /// One-way draft → finalized transition.
    ///
    /// Idempotent: finalizing an already-finalized card returns it unchanged.
    /// Requires the item count to equal capacity. `visible_to_friends`
    /// optionally sets visibility in the same step.
    pub async fn finalize(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        visible_to_friends: Option<bool>,
    ) -> Result<Card, DomainError> {
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        if card.is_finalized {
            debug!(card_id, "finalize on an already-finalized card, nothing to do");
            return Ok(card);
        }

        let capacity = card.capacity()?;
        let count = card_items::count_by_card(db, card_id).await? as usize;
        if count != capacity {
            return Err(DomainError::state(
                StateKind::FinalizeCountMismatch,
                format!("Card {card_id} has {count} of {capacity} items"),
            ));
        }

        let card = cards_sea::set_finalized(db, card_id, visible_to_friends)
            .await
            .map(Card::from)?;
        info!(card_id, user_id, "card finalized");
        Ok(card)
    }

    /// Set the friend-visibility flag. Independent of the draft/finalized
    /// state machine.
    pub async fn update_visibility(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        visible_to_friends: bool,
    ) -> Result<Card, DomainError> {
        cards::require_owned_card(db, card_id, user_id).await?;
        let card = cards_sea::set_visibility(db, card_id, visible_to_friends)
            .await
            .map(Card::from)?;
        Ok(card)
    }

    /// Set visibility on several cards at once. Every id must exist and
    /// belong to the acting user or the whole update is rejected.
    pub async fn update_visibility_bulk(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        mut card_ids: Vec<i64>,
        visible_to_friends: bool,
    ) -> Result<u64, DomainError> {
        card_ids.sort_unstable();
        card_ids.dedup();
        if card_ids.is_empty() {
            return Ok(0);
        }
        with_txn(db, move |txn| {
            Box::pin(async move {
                cards::require_owned_cards(txn, &card_ids, user_id).await?;
                let affected =
                    cards_sea::set_visibility_many(txn, &card_ids, user_id, visible_to_friends)
                        .await?;
                Ok(affected)
            })
        })
        .await
    }

    /// Toggle the archive flag on several cards at once. Archive is
    /// orthogonal to the grid invariants.
    pub async fn set_archived_bulk(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        mut card_ids: Vec<i64>,
        archived: bool,
    ) -> Result<u64, DomainError> {
        card_ids.sort_unstable();
        card_ids.dedup();
        if card_ids.is_empty() {
            return Ok(0);
        }
        with_txn(db, move |txn| {
            Box::pin(async move {
                cards::require_owned_cards(txn, &card_ids, user_id).await?;
                let affected =
                    cards_sea::set_archived_many(txn, &card_ids, user_id, archived).await?;
                Ok(affected)
            })
        })
        .await
    }

    /// Delete several cards at once; items cascade with their cards.
    pub async fn delete_cards_bulk(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        mut card_ids: Vec<i64>,
    ) -> Result<u64, DomainError> {
        card_ids.sort_unstable();
        card_ids.dedup();
        if card_ids.is_empty() {
            return Ok(0);
        }
        let affected = with_txn(db, move |txn| {
            Box::pin(async move {
                cards::require_owned_cards(txn, &card_ids, user_id).await?;
                let affected = cards_sea::delete_many(txn, &card_ids, user_id).await?;
                Ok(affected)
            })
        })
        .await?;
        info!(user_id, affected, "cards deleted");
        Ok(affected)
    }

    /// Update header text and/or toggle the free space. Draft cards only.
    ///
    /// Enabling the free space picks a cell (explicit, center, or random) and
    /// displaces any item occupying it to a uniformly random empty cell;
    /// everything commits in one transaction. Disabling just clears the cell.
    pub async fn update_card_config(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        input: UpdateCardConfig,
    ) -> Result<Card, DomainError> {
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        card.ensure_draft()?;

        let header_text = match input.header_text {
            Some(header) => Some(grid::validate_header(&header, card.grid_size)?),
            None => None,
        };

        let grid_size = card.grid_size;
        let currently_free = card.has_free_space;
        let requested_free = input.has_free_space;
        let requested_pos = input.free_space_pos;
        let mut rng = self.fork_rng();

        with_txn(db, move |txn| {
            Box::pin(async move {
                if let Some(header) = header_text {
                    cards_sea::update_header(txn, card_id, header).await?;
                }

                match requested_free {
                    Some(true) if !currently_free => {
                        let occupied = card_items::occupied_positions(txn, card_id).await?;
                        let free_pos =
                            pick_free_space_pos(&mut rng, grid_size, requested_pos, &occupied)?;

                        if occupied.contains(&free_pos) {
                            // The chosen cell holds an item: displace it to a
                            // random empty cell of the new layout.
                            let occupant =
                                card_items::find_by_card_and_position(txn, card_id, free_pos)
                                    .await?
                                    .ok_or_else(|| {
                                        DomainError::infra(
                                            InfraErrorKind::DataCorruption,
                                            "Occupied position has no item row",
                                        )
                                    })?;
                            let new_grid = Grid::new(grid_size, Some(free_pos))?;
                            let candidates = new_grid.open_positions(&occupied);
                            let Some(target) = candidates.choose(&mut rng).copied() else {
                                return Err(DomainError::conflict(
                                    ConflictKind::NoSpaceForFree,
                                    "No empty cell left for the displaced item",
                                ));
                            };
                            cards_sea::set_free_space(txn, card_id, Some(free_pos)).await?;
                            card_items_sea::update_position(txn, occupant.id, target).await?;
                        } else {
                            cards_sea::set_free_space(txn, card_id, Some(free_pos)).await?;
                        }
                    }
                    Some(false) if currently_free => {
                        cards_sea::set_free_space(txn, card_id, None).await?;
                    }
                    _ => {}
                }

                let card = cards::require_card(txn, card_id).await?;
                Ok(card)
            })
        })
        .await
    }
}
