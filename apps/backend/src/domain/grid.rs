//! Pure grid geometry and validation. No I/O.

use unicode_normalization::UnicodeNormalization;

use crate::errors::domain::{DomainError, ValidationKind};

pub const MIN_GRID_SIZE: i16 = 2;
pub const MAX_GRID_SIZE: i16 = 5;

/// Temporary position used while two items trade places inside one
/// transaction. Negative, so it can never collide with a live cell under the
/// (card_id, position) uniqueness constraint.
pub const SWAP_SENTINEL_POS: i16 = -1;

/// Parking position for item `index` during a shuffle. Each item gets its own
/// negative slot so the uniqueness constraint holds mid-transaction.
pub fn shuffle_sentinel_pos(index: usize) -> i16 {
    -(index as i16 + 1)
}

pub fn is_valid_grid_size(size: i16) -> bool {
    (MIN_GRID_SIZE..=MAX_GRID_SIZE).contains(&size)
}

/// Exact center for odd grid sizes. Even grids have no natural center; the
/// caller picks a cell instead.
pub fn default_free_space_position(size: i16) -> Option<i16> {
    if size % 2 == 1 {
        Some(size * size / 2)
    } else {
        None
    }
}

/// Validated grid geometry for one card.
///
/// The "free space position present iff the card has a free space" invariant
/// lives in this constructor; everything downstream consumes a `Grid` instead
/// of re-checking the two raw fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    size: i16,
    free_space_pos: Option<i16>,
}

impl Grid {
    pub fn new(size: i16, free_space_pos: Option<i16>) -> Result<Self, DomainError> {
        if !is_valid_grid_size(size) {
            return Err(DomainError::validation(
                ValidationKind::GridSize,
                format!("Grid size must be between {MIN_GRID_SIZE} and {MAX_GRID_SIZE}, got {size}"),
            ));
        }
        if let Some(pos) = free_space_pos {
            if !(0..size * size).contains(&pos) {
                return Err(DomainError::validation(
                    ValidationKind::Position,
                    format!("Free space position {pos} is outside the {size}x{size} grid"),
                ));
            }
        }
        Ok(Self {
            size,
            free_space_pos,
        })
    }

    pub fn size(&self) -> i16 {
        self.size
    }

    pub fn total_squares(&self) -> i16 {
        self.size * self.size
    }

    pub fn has_free_space(&self) -> bool {
        self.free_space_pos.is_some()
    }

    pub fn free_space_pos(&self) -> Option<i16> {
        self.free_space_pos
    }

    /// Number of items the grid can hold.
    pub fn capacity(&self) -> usize {
        self.total_squares() as usize - usize::from(self.free_space_pos.is_some())
    }

    pub fn is_in_range(&self, pos: i16) -> bool {
        (0..self.total_squares()).contains(&pos)
    }

    pub fn is_free_space(&self, pos: i16) -> bool {
        self.free_space_pos == Some(pos)
    }

    /// In range and not the free-space cell.
    pub fn is_valid_item_position(&self, pos: i16) -> bool {
        self.is_in_range(pos) && !self.is_free_space(pos)
    }

    /// All valid item cells not present in `occupied`, ascending.
    pub fn open_positions(&self, occupied: &[i16]) -> Vec<i16> {
        (0..self.total_squares())
            .filter(|p| self.is_valid_item_position(*p) && !occupied.contains(p))
            .collect()
    }
}

/// NFC-normalize, trim and collapse inner whitespace runs.
pub fn normalize_header(raw: &str) -> String {
    let normalized: String = raw.nfc().collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize the header and require at least one character per column.
///
/// Header failures are reported as [`ValidationKind::HeaderText`], distinct
/// from grid-size errors.
pub fn validate_header(raw: &str, grid_size: i16) -> Result<String, DomainError> {
    let header = normalize_header(raw);
    if header.chars().count() < grid_size as usize {
        return Err(DomainError::validation(
            ValidationKind::HeaderText,
            format!("Header text needs at least {grid_size} characters, one per column"),
        ));
    }
    Ok(header)
}
