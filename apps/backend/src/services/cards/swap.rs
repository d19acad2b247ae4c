//! Pairwise position swap, including free-space relocation.

use rand::seq::IndexedRandom;
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use super::CardService;
use crate::adapters::{card_items_sea, cards_sea};
use crate::db::with_txn;
use crate::domain::grid::{Grid, SWAP_SENTINEL_POS};
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind, ValidationKind};
use crate::repos::{card_items, cards};

impl CardService {
    /// Swap the contents of two cells.
    ///
    /// Equal positions are a no-op success with zero store mutations. When
    /// one operand is the free-space cell the swap becomes a free-space
    /// relocation. Otherwise the occupied cells trade places through the
    /// negative sentinel so the (card_id, position) uniqueness constraint
    /// holds at every step; any failure rolls the whole transaction back.
    pub async fn swap_items(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
        pos_a: i16,
        pos_b: i16,
    ) -> Result<(), DomainError> {
        if pos_a == pos_b {
            debug!(card_id, pos_a, "swap of a cell with itself, nothing to do");
            return Ok(());
        }

        let card = cards::require_owned_card(db, card_id, user_id).await?;
        card.ensure_draft()?;
        let grid = card.grid()?;

        for pos in [pos_a, pos_b] {
            if !grid.is_in_range(pos) {
                return Err(DomainError::validation(
                    ValidationKind::Position,
                    format!("Position {pos} is outside the grid"),
                ));
            }
        }

        if grid.is_free_space(pos_a) {
            return self.move_free_space(db, card_id, grid, pos_b).await;
        }
        if grid.is_free_space(pos_b) {
            return self.move_free_space(db, card_id, grid, pos_a).await;
        }

        let item_a = card_items::find_by_card_and_position(db, card_id, pos_a).await?;
        let item_b = card_items::find_by_card_and_position(db, card_id, pos_b).await?;

        let (item_a, item_b) = match (item_a, item_b) {
            (None, None) => {
                return Err(DomainError::not_found(
                    NotFoundKind::Item,
                    format!("No item at position {pos_a} or {pos_b}"),
                ));
            }
            (Some(a), b) => (a, b),
            (None, Some(b)) => {
                // One occupant moving into an empty cell: a single move.
                card_items_sea::update_position(db, b.id, pos_a).await?;
                debug!(card_id, from = pos_b, to = pos_a, "item moved to empty cell");
                return Ok(());
            }
        };

        match item_b {
            None => {
                card_items_sea::update_position(db, item_a.id, pos_b).await?;
                debug!(card_id, from = pos_a, to = pos_b, "item moved to empty cell");
            }
            Some(item_b) => {
                with_txn(db, move |txn| {
                    Box::pin(async move {
                        // Three-step trade through the sentinel keeps the
                        // uniqueness constraint satisfied mid-transaction.
                        card_items_sea::update_position(txn, item_a.id, SWAP_SENTINEL_POS).await?;
                        card_items_sea::update_position(txn, item_b.id, pos_a).await?;
                        card_items_sea::update_position(txn, item_a.id, pos_b).await?;
                        Ok(())
                    })
                })
                .await?;
                debug!(card_id, pos_a, pos_b, "items swapped");
            }
        }

        Ok(())
    }

    /// Relocate the free space to `new_pos`, displacing any occupying item to
    /// a uniformly random empty cell. Atomic: the flag move and the
    /// displacement commit together or not at all.
    async fn move_free_space(
        &self,
        db: &DatabaseConnection,
        card_id: i64,
        grid: Grid,
        new_pos: i16,
    ) -> Result<(), DomainError> {
        let mut rng = self.fork_rng();
        with_txn(db, move |txn| {
            Box::pin(async move {
                let occupant =
                    card_items::find_by_card_and_position(txn, card_id, new_pos).await?;
                let occupied = card_items::occupied_positions(txn, card_id).await?;

                // Geometry after the move: the old free cell becomes a normal
                // empty cell and is a valid displacement target.
                let new_grid = Grid::new(grid.size(), Some(new_pos))?;

                let displacement_target = match &occupant {
                    Some(_) => {
                        let candidates = new_grid.open_positions(&occupied);
                        let Some(target) = candidates.choose(&mut rng).copied() else {
                            return Err(DomainError::conflict(
                                ConflictKind::NoSpaceForFree,
                                "No empty cell left for the displaced item",
                            ));
                        };
                        Some(target)
                    }
                    None => None,
                };

                cards_sea::set_free_space(txn, card_id, Some(new_pos)).await?;
                if let (Some(occupant), Some(target)) = (occupant, displacement_target) {
                    card_items_sea::update_position(txn, occupant.id, target).await?;
                    info!(
                        card_id,
                        new_free_pos = new_pos,
                        displaced_to = target,
                        "free space moved, occupant displaced"
                    );
                } else {
                    debug!(card_id, new_free_pos = new_pos, "free space moved");
                }
                Ok(())
            })
        })
        .await
    }
}
