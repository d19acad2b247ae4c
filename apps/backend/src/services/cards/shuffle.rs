//! Full re-randomization of item positions.

use rand::seq::SliceRandom;
use sea_orm::DatabaseConnection;
use tracing::{debug, info};

use super::CardService;
use crate::adapters::card_items_sea;
use crate::db::with_txn;
use crate::domain::grid::shuffle_sentinel_pos;
use crate::errors::domain::DomainError;
use crate::repos::{card_items, cards, CardItem};

impl CardService {
    /// Randomly permute all items across the card's non-free cells.
    ///
    /// Every item is first parked at its own negative sentinel, then assigned
    /// its shuffled target, all inside one transaction; the uniqueness
    /// constraint holds at every step. A card with zero items returns
    /// immediately without opening a transaction.
    pub async fn shuffle(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
    ) -> Result<Vec<CardItem>, DomainError> {
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        card.ensure_draft()?;
        let grid = card.grid()?;

        let items = card_items::find_by_card(db, card_id).await?;
        if items.is_empty() {
            debug!(card_id, "shuffle of an empty card, skipping transaction");
            return Ok(items);
        }

        let mut rng = self.fork_rng();
        with_txn(db, move |txn| {
            Box::pin(async move {
                for (index, item) in items.iter().enumerate() {
                    card_items_sea::update_position(txn, item.id, shuffle_sentinel_pos(index))
                        .await?;
                }

                let mut targets = grid.open_positions(&[]);
                targets.shuffle(&mut rng);

                for (item, target) in items.iter().zip(targets.iter()) {
                    card_items_sea::update_position(txn, item.id, *target).await?;
                }
                Ok(())
            })
        })
        .await?;

        // Reload to return authoritative post-commit state.
        let shuffled = card_items::find_by_card(db, card_id).await?;
        info!(card_id, item_count = shuffled.len(), "card shuffled");
        Ok(shuffled)
    }
}
