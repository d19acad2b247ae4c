//! Clone and import engine tests: truncation, atomicity, free-space
//! auto-placement and conflict mapping.

mod common;

use backend::errors::domain::{ConflictKind, DomainError, StateKind, ValidationKind};
use backend::{AddItem, CardService, CloneCard, CreateCard, ImportCard, ImportItem};
use common::{assert_distinct_positions, create_user, setup_db};

async fn full_five_by_five(
    service: &CardService,
    db: &sea_orm::DatabaseConnection,
    user: i64,
    year: i32,
) -> backend::Card {
    let card = service
        .create_card(db, user, CreateCard::new(year, 5).with_free_space(None))
        .await
        .unwrap();
    for (i, pos) in (0..25).filter(|p| *p != 12).enumerate() {
        service
            .add_item(db, user, card.id, AddItem::new(format!("goal {i}")).at(pos))
            .await
            .unwrap();
    }
    card
}

#[tokio::test]
async fn clone_truncates_to_the_new_capacity_in_source_order() {
    let db = setup_db().await;
    let user = create_user(&db, "clone-truncate").await;
    let service = CardService::with_seed(31);

    let source = full_five_by_five(&service, &db, user, 2024).await;

    // 2x2 with free space: capacity 3.
    let outcome = service
        .clone_card(
            &db,
            user,
            source.id,
            CloneCard {
                year: Some(2025),
                grid_size: Some(2),
                has_free_space: Some(true),
                header_text: Some("GO".to_owned()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome.card.grid_size, 2);
    assert!(outcome.card.has_free_space);
    assert_eq!(outcome.items.len(), 3);
    assert_eq!(outcome.truncated_item_count, 21);
    assert_distinct_positions(&outcome.items);

    // Kept items are the first three in source position order.
    let mut kept: Vec<String> = outcome.items.iter().map(|i| i.content.clone()).collect();
    kept.sort();
    assert_eq!(kept, vec!["goal 0", "goal 1", "goal 2"]);

    let free = outcome.card.free_space_pos.unwrap();
    for item in &outcome.items {
        assert!((0..4).contains(&item.position));
        assert_ne!(item.position, free);
        assert!(!item.is_completed, "clones start uncompleted");
    }
}

#[tokio::test]
async fn clone_without_year_override_hits_the_duplicate_constraint() {
    let db = setup_db().await;
    let user = create_user(&db, "clone-duplicate").await;
    let service = CardService::with_seed(32);

    let source = service
        .create_card(&db, user, CreateCard::new(2025, 3))
        .await
        .unwrap();

    // Same user, same year, same (absent) title: the partial unique index
    // fires and maps to the untitled-card conflict.
    let err = service
        .clone_card(&db, user, source.id, CloneCard::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::DuplicateDefaultCard, _)
    ));

    // A fresh year clones cleanly and inherits the configuration.
    let outcome = service
        .clone_card(
            &db,
            user,
            source.id,
            CloneCard {
                year: Some(2026),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(outcome.card.year, 2026);
    assert_eq!(outcome.card.grid_size, source.grid_size);
    assert_eq!(outcome.card.has_free_space, source.has_free_space);
    assert_eq!(outcome.truncated_item_count, 0);
}

#[tokio::test]
async fn clone_can_drop_the_free_space_to_grow_capacity() {
    let db = setup_db().await;
    let user = create_user(&db, "clone-grow").await;
    let service = CardService::with_seed(33);

    let source = service
        .create_card(&db, user, CreateCard::new(2025, 3).with_free_space(None))
        .await
        .unwrap();
    for i in 0..8 {
        service
            .add_item(&db, user, source.id, AddItem::new(format!("goal {i}")))
            .await
            .unwrap();
    }

    let outcome = service
        .clone_card(
            &db,
            user,
            source.id,
            CloneCard {
                year: Some(2026),
                has_free_space: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(!outcome.card.has_free_space);
    assert_eq!(outcome.card.free_space_pos, None);
    assert_eq!(outcome.card.capacity().unwrap(), 9);
    assert_eq!(outcome.items.len(), 8);
    assert_eq!(outcome.truncated_item_count, 0);
}

#[tokio::test]
async fn import_creates_a_finalized_card_in_one_step() {
    let db = setup_db().await;
    let user = create_user(&db, "import-finalized").await;
    let service = CardService::with_seed(41);

    let items: Vec<ImportItem> = (0..9)
        .filter(|p| *p != 4)
        .map(|p| ImportItem {
            position: p,
            content: format!("staged goal {p}"),
        })
        .collect();

    let mut input = ImportCard::new(2025, 3, items);
    input.has_free_space = true;
    input.finalize = true;
    input.visible_to_friends = true;
    input.title = Some("Migrated".to_owned());

    let (card, items) = service.import_card(&db, user, input).await.unwrap();

    assert!(card.is_finalized);
    assert!(card.visible_to_friends);
    assert_eq!(card.free_space_pos, Some(4), "odd grids center the free space");
    assert_eq!(items.len(), 8);
    assert_distinct_positions(&items);
}

#[tokio::test]
async fn import_finalize_mismatch_fails_before_any_write() {
    let db = setup_db().await;
    let user = create_user(&db, "import-mismatch").await;
    let service = CardService::with_seed(42);

    let mut input = ImportCard::new(
        2025,
        3,
        vec![ImportItem {
            position: 0,
            content: "only one".to_owned(),
        }],
    );
    input.finalize = true;

    let err = service.import_card(&db, user, input).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::State(StateKind::FinalizeCountMismatch, _)
    ));

    // Zero side effects: nothing was created for this user.
    assert!(service.list_by_user(&db, user).await.unwrap().is_empty());
}

#[tokio::test]
async fn import_validates_positions_against_the_grid_and_free_space() {
    let db = setup_db().await;
    let user = create_user(&db, "import-positions").await;
    let service = CardService::with_seed(43);

    // Duplicate position in the payload.
    let err = service
        .import_card(
            &db,
            user,
            ImportCard::new(
                2025,
                3,
                vec![
                    ImportItem {
                        position: 1,
                        content: "a".into(),
                    },
                    ImportItem {
                        position: 1,
                        content: "b".into(),
                    },
                ],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::PositionOccupied, _)
    ));

    // Item on the (centered) free space.
    let mut input = ImportCard::new(
        2025,
        3,
        vec![ImportItem {
            position: 4,
            content: "center".into(),
        }],
    );
    input.has_free_space = true;
    let err = service.import_card(&db, user, input).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::Position, _)
    ));

    // Out of range.
    let err = service
        .import_card(
            &db,
            user,
            ImportCard::new(
                2025,
                3,
                vec![ImportItem {
                    position: 9,
                    content: "outside".into(),
                }],
            ),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::Position, _)
    ));
}

#[tokio::test]
async fn import_places_the_free_space_on_an_unclaimed_cell_for_even_grids() {
    let db = setup_db().await;
    let user = create_user(&db, "import-even-free").await;
    let service = CardService::with_seed(44);

    // 2x2, three of four cells claimed: the free space must take cell 3.
    let mut input = ImportCard::new(
        2025,
        2,
        (0..3)
            .map(|p| ImportItem {
                position: p,
                content: format!("goal {p}"),
            })
            .collect(),
    );
    input.has_free_space = true;
    input.header_text = Some("GO".to_owned());

    let (card, items) = service.import_card(&db, user, input).await.unwrap();
    assert_eq!(card.free_space_pos, Some(3));
    assert_eq!(items.len(), 3);

    // All four cells claimed: nowhere left for the free space.
    let mut input = ImportCard::new(
        2026,
        2,
        (0..4)
            .map(|p| ImportItem {
                position: p,
                content: format!("goal {p}"),
            })
            .collect(),
    );
    input.has_free_space = true;
    input.header_text = Some("GO".to_owned());

    let err = service.import_card(&db, user, input).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::NoSpaceForFree, _)
    ));
}

#[tokio::test]
async fn check_conflict_probes_both_uniqueness_rules() {
    let db = setup_db().await;
    let user = create_user(&db, "check-conflict").await;
    let service = CardService::with_seed(45);

    service
        .create_card(&db, user, CreateCard::new(2025, 3).with_title("Fitness"))
        .await
        .unwrap();
    service
        .create_card(&db, user, CreateCard::new(2025, 3))
        .await
        .unwrap();

    assert!(service
        .check_conflict(&db, user, 2025, Some("Fitness"))
        .await
        .unwrap());
    assert!(service.check_conflict(&db, user, 2025, None).await.unwrap());
    assert!(!service
        .check_conflict(&db, user, 2025, Some("Travel"))
        .await
        .unwrap());
    assert!(!service.check_conflict(&db, user, 2026, None).await.unwrap());
}
