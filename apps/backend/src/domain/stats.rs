//! Completion statistics and bingo-line counting. Pure, no I/O.

use serde::Serialize;
use time::OffsetDateTime;

use super::grid::Grid;

/// Completion view of one item, decoupled from the persistence model.
#[derive(Debug, Clone, Copy)]
pub struct ItemCompletion {
    pub position: i16,
    pub is_completed: bool,
    pub completed_at: Option<OffsetDateTime>,
}

/// Derived statistics for one card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardStats {
    pub total_items: usize,
    pub completed_items: usize,
    pub capacity: usize,
    /// `completed_items / capacity * 100`.
    pub completion_rate: f64,
    pub bingo_count: u32,
    pub first_completed_at: Option<OffsetDateTime>,
    pub last_completed_at: Option<OffsetDateTime>,
}

/// Boolean completion grid of `total_squares` cells. The free-space cell (if
/// any) is always complete; each completed item marks its cell.
pub fn completion_grid(grid: &Grid, completed_positions: &[i16]) -> Vec<bool> {
    let mut cells = vec![false; grid.total_squares() as usize];
    if let Some(free) = grid.free_space_pos() {
        cells[free as usize] = true;
    }
    for &pos in completed_positions {
        if grid.is_in_range(pos) {
            cells[pos as usize] = true;
        }
    }
    cells
}

/// Count complete lines: every row, every column and the two main diagonals.
/// Each line contributes at most one to the total.
pub fn count_bingos(grid: &Grid, completed_positions: &[i16]) -> u32 {
    let n = grid.size() as usize;
    let cells = completion_grid(grid, completed_positions);
    let mut bingos = 0;

    for row in 0..n {
        if (0..n).all(|col| cells[row * n + col]) {
            bingos += 1;
        }
    }
    for col in 0..n {
        if (0..n).all(|row| cells[row * n + col]) {
            bingos += 1;
        }
    }
    if (0..n).all(|i| cells[i * n + i]) {
        bingos += 1;
    }
    if (0..n).all(|i| cells[i * n + (n - 1 - i)]) {
        bingos += 1;
    }

    bingos
}

/// Derive the full stats block for a card.
pub fn build_stats(grid: &Grid, items: &[ItemCompletion]) -> CardStats {
    let completed: Vec<&ItemCompletion> = items.iter().filter(|i| i.is_completed).collect();
    let completed_positions: Vec<i16> = completed.iter().map(|i| i.position).collect();

    let capacity = grid.capacity();
    let completion_rate = if capacity == 0 {
        0.0
    } else {
        completed.len() as f64 / capacity as f64 * 100.0
    };

    CardStats {
        total_items: items.len(),
        completed_items: completed.len(),
        capacity,
        completion_rate,
        bingo_count: count_bingos(grid, &completed_positions),
        first_completed_at: completed.iter().filter_map(|i| i.completed_at).min(),
        last_completed_at: completed.iter().filter_map(|i| i.completed_at).max(),
    }
}
