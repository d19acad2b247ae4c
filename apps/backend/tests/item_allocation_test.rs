//! Position allocator tests: explicit and random placement, capacity, and
//! concurrent allocation against one card.

mod common;

use std::sync::Arc;

use backend::errors::domain::{ConflictKind, DomainError, StateKind, ValidationKind};
use backend::{AddItem, CardService, CreateCard};
use common::{assert_distinct_positions, create_user, setup_db};
use futures::future::join_all;

#[tokio::test]
async fn explicit_position_is_validated_against_loaded_items() {
    let db = setup_db().await;
    let user = create_user(&db, "alloc-explicit").await;
    let service = CardService::with_seed(2);

    let card = service
        .create_card(&db, user, CreateCard::new(2025, 3).with_free_space(None))
        .await
        .unwrap();

    let item = service
        .add_item(&db, user, card.id, AddItem::new("read 12 books").at(0))
        .await
        .unwrap();
    assert_eq!(item.position, 0);

    let err = service
        .add_item(&db, user, card.id, AddItem::new("run a marathon").at(0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::PositionOccupied, _)
    ));

    // The free-space cell is not a valid item position.
    let err = service
        .add_item(&db, user, card.id, AddItem::new("learn rust").at(4))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::Position, _)
    ));

    let err = service
        .add_item(&db, user, card.id, AddItem::new("out of range").at(9))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::Position, _)
    ));
}

#[tokio::test]
async fn random_allocation_fills_the_card_without_collisions() {
    let db = setup_db().await;
    let user = create_user(&db, "alloc-random").await;
    let service = CardService::with_seed(42);

    // 3x3 with center free space: capacity 8.
    let card = service
        .create_card(&db, user, CreateCard::new(2025, 3).with_free_space(None))
        .await
        .unwrap();

    for i in 0..8 {
        let item = service
            .add_item(&db, user, card.id, AddItem::new(format!("goal {i}")))
            .await
            .unwrap();
        assert!((0..9).contains(&item.position));
        assert_ne!(item.position, 4, "random placement must avoid the free space");
    }

    let (_, items) = service.get_card(&db, user, card.id).await.unwrap();
    assert_eq!(items.len(), 8);
    assert_distinct_positions(&items);

    let err = service
        .add_item(&db, user, card.id, AddItem::new("one too many"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Capacity(_)));
}

#[tokio::test]
async fn random_allocation_exhibits_variety() {
    let db = setup_db().await;
    let user = create_user(&db, "alloc-variety").await;
    let service = CardService::with_seed(1234);

    // One random item on each of several empty 5x5 cards; the chosen cells
    // must not collapse to a single deterministic position.
    let mut first_positions = Vec::new();
    for year in 2020..2030 {
        let card = service
            .create_card(&db, user, CreateCard::new(year, 5))
            .await
            .unwrap();
        let item = service
            .add_item(&db, user, card.id, AddItem::new("first goal"))
            .await
            .unwrap();
        first_positions.push(item.position);
    }

    first_positions.sort_unstable();
    first_positions.dedup();
    assert!(
        first_positions.len() > 1,
        "uniform allocation should not always pick the same cell"
    );
}

#[tokio::test]
async fn concurrent_random_allocations_never_collide() {
    let db = setup_db().await;
    let user = create_user(&db, "alloc-concurrent").await;
    let service = Arc::new(CardService::with_seed(77));

    let card = service
        .create_card(&db, user, CreateCard::new(2025, 5).with_free_space(None))
        .await
        .unwrap();

    let tasks: Vec<_> = (0..12)
        .map(|i| {
            let db = db.clone();
            let service = Arc::clone(&service);
            let card_id = card.id;
            tokio::spawn(async move {
                service
                    .add_item(&db, user, card_id, AddItem::new(format!("goal {i}")))
                    .await
            })
        })
        .collect();

    for result in join_all(tasks).await {
        result.expect("task panicked").expect("allocation failed");
    }

    let (_, items) = service.get_card(&db, user, card.id).await.unwrap();
    assert_eq!(items.len(), 12);
    assert_distinct_positions(&items);
    for item in &items {
        assert_ne!(item.position, 12, "free space must stay empty");
    }
}

#[tokio::test]
async fn reposition_and_remove_require_a_draft() {
    let db = setup_db().await;
    let user = create_user(&db, "alloc-reposition").await;
    let service = CardService::with_seed(6);

    // 2x2, capacity 4.
    let card = service
        .create_card(&db, user, CreateCard::new(2025, 2))
        .await
        .unwrap();
    let item = service
        .add_item(&db, user, card.id, AddItem::new("movable").at(0))
        .await
        .unwrap();
    let blocker = service
        .add_item(&db, user, card.id, AddItem::new("blocker").at(1))
        .await
        .unwrap();

    // Reposition to an empty cell works; to an occupied one conflicts.
    let moved = service
        .update_item_position(&db, user, card.id, item.id, 3)
        .await
        .unwrap();
    assert_eq!(moved.position, 3);

    let err = service
        .update_item_position(&db, user, card.id, item.id, blocker.position)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::PositionOccupied, _)
    ));

    // Moving onto its own cell is a no-op success.
    let same = service
        .update_item_position(&db, user, card.id, item.id, 3)
        .await
        .unwrap();
    assert_eq!(same.position, 3);

    service.remove_item(&db, user, card.id, item.id).await.unwrap();
    let (_, items) = service.get_card(&db, user, card.id).await.unwrap();
    assert_eq!(items.len(), 1);

    // Fill and finalize, then verify the structural freeze.
    service
        .add_item(&db, user, card.id, AddItem::new("a").at(0))
        .await
        .unwrap();
    service
        .add_item(&db, user, card.id, AddItem::new("b").at(2))
        .await
        .unwrap();
    service
        .add_item(&db, user, card.id, AddItem::new("c").at(3))
        .await
        .unwrap();
    service.finalize(&db, user, card.id, None).await.unwrap();

    let err = service
        .update_item_position(&db, user, card.id, blocker.id, 0)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::State(StateKind::CardFinalized, _)));
    let err = service
        .remove_item(&db, user, card.id, blocker.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::State(StateKind::CardFinalized, _)));
    let err = service
        .update_item_content(&db, user, card.id, blocker.id, "rewrite")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::State(StateKind::CardFinalized, _)));

    // Notes and proof remain editable after finalize.
    let item = service
        .update_item_notes(&db, user, card.id, blocker.id, Some("went well"))
        .await
        .unwrap();
    assert_eq!(item.notes.as_deref(), Some("went well"));

    let item = service
        .update_item_proof(
            &db,
            user,
            card.id,
            blocker.id,
            Some("https://example.com/proof.jpg"),
        )
        .await
        .unwrap();
    assert_eq!(item.proof_url.as_deref(), Some("https://example.com/proof.jpg"));

    let err = service
        .update_item_proof(&db, user, card.id, blocker.id, Some("not a url"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::Validation(ValidationKind::ProofUrl, _)
    ));
}
