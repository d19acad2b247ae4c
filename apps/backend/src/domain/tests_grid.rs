use crate::domain::grid::{
    self, default_free_space_position, normalize_header, shuffle_sentinel_pos, validate_header,
    Grid, SWAP_SENTINEL_POS,
};
use crate::errors::domain::{DomainError, ValidationKind};

#[test]
fn capacity_accounts_for_free_space() {
    for size in grid::MIN_GRID_SIZE..=grid::MAX_GRID_SIZE {
        let without = Grid::new(size, None).unwrap();
        assert_eq!(without.capacity(), (size * size) as usize);

        let with = Grid::new(size, Some(0)).unwrap();
        assert_eq!(with.capacity(), (size * size) as usize - 1);
    }
}

#[test]
fn rejects_out_of_range_grid_sizes() {
    for size in [0, 1, 6, 10, -3] {
        let err = Grid::new(size, None).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::GridSize, _)
        ));
    }
}

#[test]
fn rejects_free_space_outside_grid() {
    for pos in [-1, 9, 100] {
        let err = Grid::new(3, Some(pos)).unwrap_err();
        assert!(matches!(
            err,
            DomainError::Validation(ValidationKind::Position, _)
        ));
    }
}

#[test]
fn default_free_space_is_center_for_odd_sizes() {
    assert_eq!(default_free_space_position(3), Some(4));
    assert_eq!(default_free_space_position(5), Some(12));
    assert_eq!(default_free_space_position(2), None);
    assert_eq!(default_free_space_position(4), None);
}

#[test]
fn item_positions_exclude_free_space_and_out_of_range() {
    let grid = Grid::new(3, Some(4)).unwrap();
    assert!(grid.is_valid_item_position(0));
    assert!(grid.is_valid_item_position(8));
    assert!(!grid.is_valid_item_position(4)); // free space
    assert!(!grid.is_valid_item_position(9));
    assert!(!grid.is_valid_item_position(-1));
}

#[test]
fn open_positions_skip_occupied_and_free() {
    let grid = Grid::new(3, Some(4)).unwrap();
    let open = grid.open_positions(&[0, 1, 8]);
    assert_eq!(open, vec![2, 3, 5, 6, 7]);

    let full: Vec<i16> = (0..9).filter(|p| *p != 4).collect();
    assert!(grid.open_positions(&full).is_empty());
}

#[test]
fn header_normalization_collapses_whitespace() {
    assert_eq!(normalize_header("  B  I N\tG O  "), "B I N G O");
    assert_eq!(normalize_header("BINGO"), "BINGO");
}

#[test]
fn header_must_cover_every_column() {
    assert_eq!(validate_header("BINGO", 5).unwrap(), "BINGO");
    assert_eq!(validate_header("  GOALS  ", 5).unwrap(), "GOALS");

    let err = validate_header("BING", 5).unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::HeaderText, _)
    ));
}

#[test]
fn sentinels_stay_outside_every_legal_range() {
    assert!(SWAP_SENTINEL_POS < 0);
    for i in 0..25 {
        assert!(shuffle_sentinel_pos(i) < 0);
    }
    // Distinct per item, so parked rows never collide with each other.
    assert_ne!(shuffle_sentinel_pos(0), shuffle_sentinel_pos(1));
}
