//! Card statistics.

use sea_orm::DatabaseConnection;

use super::CardService;
use crate::domain::stats::{build_stats, CardStats};
use crate::errors::domain::DomainError;
use crate::repos::{card_items, cards};

impl CardService {
    /// Completion statistics and bingo count for one card.
    pub async fn get_stats(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
    ) -> Result<CardStats, DomainError> {
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        let grid = card.grid()?;
        let items = card_items::find_by_card(db, card_id).await?;

        let completions: Vec<_> = items.iter().map(|i| i.completion()).collect();
        Ok(build_stats(&grid, &completions))
    }
}
