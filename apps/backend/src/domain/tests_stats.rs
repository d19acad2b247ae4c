use time::macros::datetime;

use crate::domain::grid::Grid;
use crate::domain::stats::{build_stats, completion_grid, count_bingos, ItemCompletion};

fn five_by_five_with_center_free() -> Grid {
    Grid::new(5, Some(12)).unwrap()
}

#[test]
fn free_space_cell_is_always_complete() {
    let grid = five_by_five_with_center_free();
    let cells = completion_grid(&grid, &[]);
    assert!(cells[12]);
    assert_eq!(cells.iter().filter(|c| **c).count(), 1);
}

#[test]
fn top_row_alone_is_one_bingo() {
    let grid = five_by_five_with_center_free();
    assert_eq!(count_bingos(&grid, &[0, 1, 2, 3, 4]), 1);
}

#[test]
fn full_card_counts_rows_columns_and_diagonals() {
    let grid = five_by_five_with_center_free();
    let all_non_free: Vec<i16> = (0..25).filter(|p| *p != 12).collect();
    // 5 rows + 5 columns + 2 diagonals
    assert_eq!(count_bingos(&grid, &all_non_free), 12);
}

#[test]
fn free_space_completes_its_own_lines() {
    let grid = five_by_five_with_center_free();
    // Middle row minus the free cell: the free space fills the gap.
    assert_eq!(count_bingos(&grid, &[10, 11, 13, 14]), 1);
    // Main diagonal crosses the center too.
    assert_eq!(count_bingos(&grid, &[0, 6, 18, 24]), 1);
}

#[test]
fn diagonal_on_grid_without_free_space() {
    let grid = Grid::new(3, None).unwrap();
    assert_eq!(count_bingos(&grid, &[0, 4, 8]), 1);
    assert_eq!(count_bingos(&grid, &[2, 4, 6]), 1);
    assert_eq!(count_bingos(&grid, &[0, 4]), 0);
}

#[test]
fn stats_rate_is_over_capacity_not_total_squares() {
    let grid = five_by_five_with_center_free();
    let items: Vec<ItemCompletion> = (0..24)
        .map(|i| ItemCompletion {
            position: if i < 12 { i } else { i + 1 },
            is_completed: i < 6,
            completed_at: None,
        })
        .collect();

    let stats = build_stats(&grid, &items);
    assert_eq!(stats.total_items, 24);
    assert_eq!(stats.completed_items, 6);
    assert_eq!(stats.capacity, 24);
    assert!((stats.completion_rate - 25.0).abs() < f64::EPSILON);
}

#[test]
fn stats_track_first_and_last_completion() {
    let grid = Grid::new(3, None).unwrap();
    let items = vec![
        ItemCompletion {
            position: 0,
            is_completed: true,
            completed_at: Some(datetime!(2025-03-01 10:00 UTC)),
        },
        ItemCompletion {
            position: 1,
            is_completed: true,
            completed_at: Some(datetime!(2025-01-15 08:30 UTC)),
        },
        ItemCompletion {
            position: 2,
            is_completed: false,
            completed_at: None,
        },
    ];

    let stats = build_stats(&grid, &items);
    assert_eq!(
        stats.first_completed_at,
        Some(datetime!(2025-01-15 08:30 UTC))
    );
    assert_eq!(
        stats.last_completed_at,
        Some(datetime!(2025-03-01 10:00 UTC))
    );
    assert_eq!(stats.bingo_count, 0);
}
