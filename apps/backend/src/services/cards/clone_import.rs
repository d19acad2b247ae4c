//! Clone and bulk-import engines. Each produces a whole card + item set in
//! one transaction; failure at any point rolls everything back.

use rand::seq::SliceRandom;
use sea_orm::DatabaseConnection;
use tracing::info;

use super::{CardService, DEFAULT_HEADER_TEXT};
use crate::adapters::card_items_sea::{self, ItemCreate};
use crate::adapters::cards_sea::{self, CardCreate};
use crate::db::with_txn;
use crate::domain::fields::{validate_category, validate_content, validate_title};
use crate::domain::grid::{self, Grid};
use crate::errors::domain::{ConflictKind, DomainError, StateKind, ValidationKind};
use crate::repos::{card_items, cards, Card, CardItem};

/// Overrides for [`CardService::clone_card`]. `None` fields inherit the
/// source card's value.
#[derive(Debug, Clone, Default)]
pub struct CloneCard {
    pub year: Option<i32>,
    pub title: Option<String>,
    pub category: Option<String>,
    pub grid_size: Option<i16>,
    pub header_text: Option<String>,
    pub has_free_space: Option<bool>,
    /// Explicit free-space cell for the clone; defaults to center/random.
    pub free_space_pos: Option<i16>,
}

/// Result of a clone, including how many source items did not fit.
#[derive(Debug, Clone)]
pub struct CloneOutcome {
    pub card: Card,
    pub items: Vec<CardItem>,
    pub truncated_item_count: usize,
}

/// One `(position, content)` pair for [`CardService::import_card`].
#[derive(Debug, Clone)]
pub struct ImportItem {
    pub position: i16,
    pub content: String,
}

/// Input for [`CardService::import_card`] - a whole card staged elsewhere,
/// created in one atomic step.
#[derive(Debug, Clone)]
pub struct ImportCard {
    pub year: i32,
    pub title: Option<String>,
    pub category: Option<String>,
    pub grid_size: i16,
    pub header_text: Option<String>,
    pub has_free_space: bool,
    /// Explicit free-space cell; defaults to the center for odd grid sizes
    /// and a uniformly random unclaimed cell otherwise.
    pub free_space_pos: Option<i16>,
    /// Finalize in the same step. Requires the item count to equal capacity.
    pub finalize: bool,
    pub visible_to_friends: bool,
    pub items: Vec<ImportItem>,
}

impl ImportCard {
    pub fn new(year: i32, grid_size: i16, items: Vec<ImportItem>) -> Self {
        Self {
            year,
            title: None,
            category: None,
            grid_size,
            header_text: None,
            has_free_space: false,
            free_space_pos: None,
            finalize: false,
            visible_to_friends: false,
            items,
        }
    }
}

impl CardService {
    /// Produce a new card from an existing one, optionally with a different
    /// grid size or free-space setting.
    ///
    /// When the new capacity is smaller than the source item count, items are
    /// kept in original relative order up to capacity and the rest are
    /// dropped; the drop count is reported in the outcome. Kept items land on
    /// a randomly shuffled set of valid positions and start uncompleted.
    pub async fn clone_card(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        source_card_id: i64,
        input: CloneCard,
    ) -> Result<CloneOutcome, DomainError> {
        let source = cards::require_owned_card(db, source_card_id, user_id).await?;
        // Ascending position order is the source's relative order.
        let source_items = card_items::find_by_card(db, source_card_id).await?;

        let year = input.year.unwrap_or(source.year);
        let title = match input.title {
            Some(title) => validate_title(Some(&title))?,
            None => source.title.clone(),
        };
        let category = match input.category {
            Some(category) => validate_category(Some(&category))?,
            None => source.category.clone(),
        };

        let grid_size = input.grid_size.unwrap_or(source.grid_size);
        if !grid::is_valid_grid_size(grid_size) {
            return Err(DomainError::validation(
                ValidationKind::GridSize,
                format!(
                    "Grid size must be between {} and {}, got {grid_size}",
                    grid::MIN_GRID_SIZE,
                    grid::MAX_GRID_SIZE
                ),
            ));
        }
        let header_text = grid::validate_header(
            input.header_text.as_deref().unwrap_or(&source.header_text),
            grid_size,
        )?;

        // Free-space flag inherits unless explicitly overridden.
        let has_free_space = input.has_free_space.unwrap_or(source.has_free_space);
        let free_space_pos = if has_free_space {
            Some(self.resolve_free_space_pos(grid_size, input.free_space_pos, &[])?)
        } else {
            None
        };
        let new_grid = Grid::new(grid_size, free_space_pos)?;

        let capacity = new_grid.capacity();
        let truncated_item_count = source_items.len().saturating_sub(capacity);

        let mut targets = new_grid.open_positions(&[]);
        self.draw(|rng| targets.shuffle(rng));
        let placements: Vec<(i16, String)> = source_items
            .into_iter()
            .take(capacity)
            .zip(targets)
            .map(|(item, position)| (position, item.content))
            .collect();

        let dto = CardCreate::new(user_id, year, grid_size, header_text)
            .with_title(title)
            .with_category(category)
            .with_free_space_pos(free_space_pos);

        let (card, items) = with_txn(db, move |txn| {
            Box::pin(async move {
                // Title-uniqueness violations surface here as TitleTaken or
                // DuplicateDefaultCard and roll the clone back whole.
                let card = cards_sea::create_card(txn, dto).await.map(Card::from)?;

                let item_dtos: Vec<ItemCreate> = placements
                    .into_iter()
                    .map(|(position, content)| ItemCreate::new(card.id, position, content))
                    .collect();
                card_items_sea::create_items(txn, item_dtos).await?;

                let items = card_items::find_by_card(txn, card.id).await?;
                Ok((card, items))
            })
        })
        .await?;

        info!(
            source_card_id,
            card_id = card.id,
            item_count = items.len(),
            truncated_item_count,
            "card cloned"
        );

        Ok(CloneOutcome {
            card,
            items,
            truncated_item_count,
        })
    }

    /// Bulk-create a card and all of its items in one transaction.
    ///
    /// All validation happens before the transaction opens; an import that
    /// requests immediate finalization with an item count different from
    /// capacity fails before any row is written.
    pub async fn import_card(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        input: ImportCard,
    ) -> Result<(Card, Vec<CardItem>), DomainError> {
        let title = validate_title(input.title.as_deref())?;
        let category = validate_category(input.category.as_deref())?;

        if !grid::is_valid_grid_size(input.grid_size) {
            return Err(DomainError::validation(
                ValidationKind::GridSize,
                format!(
                    "Grid size must be between {} and {}, got {}",
                    grid::MIN_GRID_SIZE,
                    grid::MAX_GRID_SIZE,
                    input.grid_size
                ),
            ));
        }
        let header_text = grid::validate_header(
            input.header_text.as_deref().unwrap_or(DEFAULT_HEADER_TEXT),
            input.grid_size,
        )?;

        // Resolve the free space against the claimed cells: center for odd
        // grids, otherwise a uniformly random unclaimed cell (failing if the
        // supplied items cover the whole grid).
        let claimed: Vec<i16> = input.items.iter().map(|i| i.position).collect();
        let free_space_pos = if input.has_free_space {
            Some(self.resolve_free_space_pos(input.grid_size, input.free_space_pos, &claimed)?)
        } else {
            None
        };
        let grid = Grid::new(input.grid_size, free_space_pos)?;

        let mut seen: Vec<i16> = Vec::with_capacity(input.items.len());
        let mut placements: Vec<(i16, String)> = Vec::with_capacity(input.items.len());
        for item in &input.items {
            if !grid.is_valid_item_position(item.position) {
                return Err(DomainError::validation(
                    ValidationKind::Position,
                    format!(
                        "Position {} is outside the grid or on the free space",
                        item.position
                    ),
                ));
            }
            if seen.contains(&item.position) {
                return Err(DomainError::conflict(
                    ConflictKind::PositionOccupied,
                    format!("Position {} appears twice in the import", item.position),
                ));
            }
            seen.push(item.position);
            placements.push((item.position, validate_content(&item.content)?));
        }

        let capacity = grid.capacity();
        if placements.len() > capacity {
            return Err(DomainError::capacity(format!(
                "Import has {} items but the card holds {capacity}",
                placements.len()
            )));
        }
        if input.finalize && placements.len() != capacity {
            return Err(DomainError::state(
                StateKind::FinalizeCountMismatch,
                format!(
                    "Cannot finalize: import has {} of {capacity} items",
                    placements.len()
                ),
            ));
        }

        let dto = CardCreate::new(user_id, input.year, input.grid_size, header_text)
            .with_title(title)
            .with_category(category)
            .with_free_space_pos(free_space_pos)
            .finalized(input.finalize)
            .visible(input.visible_to_friends);

        let (card, items) = with_txn(db, move |txn| {
            Box::pin(async move {
                let card = cards_sea::create_card(txn, dto).await.map(Card::from)?;

                let item_dtos: Vec<ItemCreate> = placements
                    .into_iter()
                    .map(|(position, content)| ItemCreate::new(card.id, position, content))
                    .collect();
                card_items_sea::create_items(txn, item_dtos).await?;

                let items = card_items::find_by_card(txn, card.id).await?;
                Ok((card, items))
            })
        })
        .await?;

        info!(
            card_id = card.id,
            user_id,
            item_count = items.len(),
            finalized = card.is_finalized,
            "card imported"
        );

        Ok((card, items))
    }
}
