//! Card grid engine - the public operation surface.
//!
//! Every mutating operation takes the acting user id and re-verifies
//! ownership through `repos::cards::require_owned_card` before touching
//! anything. Multi-step rewrites (swap, shuffle, clone, import, free-space
//! moves) run inside exactly one transaction via `db::with_txn`; partial
//! state is never observable by other readers.

mod clone_import;
mod items;
mod lifecycle;
mod shuffle;
mod stats;
mod swap;

use parking_lot::Mutex;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sea_orm::DatabaseConnection;
use tracing::info;

pub use clone_import::{CloneCard, CloneOutcome, ImportCard, ImportItem};
pub use items::{AddItem, CompletionOutcome};
pub use lifecycle::UpdateCardConfig;

use crate::adapters::cards_sea::{self, CardCreate};
use crate::domain::fields::{validate_category, validate_title};
use crate::domain::grid::{self, Grid};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};
use crate::repos::{card_items, cards, Card, CardItem};

/// Header shown above the grid when the caller does not supply one. Five
/// characters, so it covers every allowed grid width.
pub const DEFAULT_HEADER_TEXT: &str = "BINGO";

/// Pure free-space placement rule shared by create, clone, import and the
/// config toggle: explicit choice wins, odd grids default to the center,
/// even grids get a uniformly random cell outside `taken`.
pub(crate) fn pick_free_space_pos(
    rng: &mut ChaCha8Rng,
    grid_size: i16,
    requested: Option<i16>,
    taken: &[i16],
) -> Result<i16, DomainError> {
    let total = grid_size * grid_size;
    if let Some(pos) = requested {
        if !(0..total).contains(&pos) {
            return Err(DomainError::validation(
                ValidationKind::Position,
                format!("Free space position {pos} is outside the {grid_size}x{grid_size} grid"),
            ));
        }
        return Ok(pos);
    }
    if let Some(center) = grid::default_free_space_position(grid_size) {
        return Ok(center);
    }
    let empty: Vec<i16> = (0..total).filter(|p| !taken.contains(p)).collect();
    if empty.is_empty() {
        return Err(DomainError::conflict(
            ConflictKind::NoSpaceForFree,
            "No empty cell is available for the free space",
        ));
    }
    Ok(empty[rng.random_range(0..empty.len())])
}

/// Input for [`CardService::create_card`].
#[derive(Debug, Clone)]
pub struct CreateCard {
    pub year: i32,
    pub title: Option<String>,
    pub category: Option<String>,
    pub grid_size: i16,
    pub header_text: Option<String>,
    pub has_free_space: bool,
    /// Explicit free-space cell. Defaults to the center for odd grid sizes
    /// and a uniformly random cell otherwise.
    pub free_space_pos: Option<i16>,
}

impl CreateCard {
    pub fn new(year: i32, grid_size: i16) -> Self {
        Self {
            year,
            title: None,
            category: None,
            grid_size,
            header_text: None,
            has_free_space: false,
            free_space_pos: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_header_text(mut self, header_text: impl Into<String>) -> Self {
        self.header_text = Some(header_text.into());
        self
    }

    pub fn with_free_space(mut self, pos: Option<i16>) -> Self {
        self.has_free_space = true;
        self.free_space_pos = pos;
        self
    }
}

/// Card grid service.
///
/// Holds the injected random source so allocation, shuffle and clone
/// placement are reproducible in tests via [`CardService::with_seed`].
pub struct CardService {
    rng: Mutex<ChaCha8Rng>,
}

impl CardService {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::from_os_rng()),
        }
    }

    /// Deterministic service for tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    /// Run `f` against the injected RNG. The guard never crosses an await.
    pub(crate) fn draw<T>(&self, f: impl FnOnce(&mut ChaCha8Rng) -> T) -> T {
        let mut rng = self.rng.lock();
        f(&mut rng)
    }

    /// Derive an owned child RNG seeded from the service RNG.
    ///
    /// Transaction closures take one of these instead of borrowing the
    /// service, so randomness drawn under a row lock stays deterministic
    /// under [`CardService::with_seed`].
    pub(crate) fn fork_rng(&self) -> ChaCha8Rng {
        self.draw(|rng| ChaCha8Rng::seed_from_u64(rng.next_u64()))
    }

    /// Resolve the free-space cell for a fresh card: explicit choice wins,
    /// odd grids default to the center, even grids get a uniformly random
    /// cell outside `taken`.
    pub(crate) fn resolve_free_space_pos(
        &self,
        grid_size: i16,
        requested: Option<i16>,
        taken: &[i16],
    ) -> Result<i16, DomainError> {
        self.draw(|rng| pick_free_space_pos(rng, grid_size, requested, taken))
    }

    /// Create an empty draft card.
    pub async fn create_card(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        input: CreateCard,
    ) -> Result<Card, DomainError> {
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

        let free_space_pos = if input.has_free_space {
            Some(self.resolve_free_space_pos(input.grid_size, input.free_space_pos, &[])?)
        } else {
            None
        };
        // Single validated construction keeps the pos-iff-flag invariant.
        Grid::new(input.grid_size, free_space_pos)?;

        let dto = CardCreate::new(user_id, input.year, input.grid_size, header_text)
            .with_title(title)
            .with_category(category)
            .with_free_space_pos(free_space_pos);

        let card = cards_sea::create_card(db, dto).await.map(Card::from)?;
        info!(card_id = card.id, user_id, year = card.year, "card created");
        Ok(card)
    }

    /// Load a card with its items.
    pub async fn get_card(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        card_id: i64,
    ) -> Result<(Card, Vec<CardItem>), DomainError> {
        let card = cards::require_owned_card(db, card_id, user_id).await?;
        let items = card_items::find_by_card(db, card_id).await?;
        Ok((card, items))
    }

    pub async fn get_by_user_and_year(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        year: i32,
        title: Option<&str>,
    ) -> Result<Option<Card>, DomainError> {
        cards::find_by_user_year_title(db, user_id, year, title).await
    }

    /// A user's non-archived cards, newest year first.
    pub async fn list_by_user(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
    ) -> Result<Vec<Card>, DomainError> {
        cards::list_by_user(db, user_id, Some(false)).await
    }

    pub async fn list_archived(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
    ) -> Result<Vec<Card>, DomainError> {
        cards::list_by_user(db, user_id, Some(true)).await
    }

    /// Pre-flight duplicate probe: would `(year, title)` collide with an
    /// existing card? Reads outside a transaction; the uniqueness constraints
    /// remain the final authority at insert time.
    pub async fn check_conflict(
        &self,
        db: &DatabaseConnection,
        user_id: i64,
        year: i32,
        title: Option<&str>,
    ) -> Result<bool, DomainError> {
        let title = validate_title(title)?;
        let existing = cards::find_by_user_year_title(db, user_id, year, title.as_deref()).await?;
        Ok(existing.is_some())
    }
}

impl Default for CardService {
    fn default() -> Self {
        Self::new()
    }
}
