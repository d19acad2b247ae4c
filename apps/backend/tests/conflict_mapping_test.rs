//! Storage-constraint translation tests: the uniqueness indexes are the last
//! line of defense, and their violations must surface as the matching domain
//! conflict, not a generic DB error.

mod common;

use backend::adapters::card_items_sea::{self, ItemCreate};
use backend::adapters::cards_sea::{self, CardCreate};
use backend::errors::domain::{ConflictKind, DomainError};
use backend::{CardService, CreateCard};
use common::{create_user, setup_db};

#[tokio::test]
async fn position_constraint_maps_to_position_occupied() {
    let db = setup_db().await;
    let user = create_user(&db, "constraint-position").await;
    let service = CardService::with_seed(61);

    let card = service
        .create_card(&db, user, CreateCard::new(2025, 3))
        .await
        .unwrap();

    // Straight through the adapter, as a racing writer would land.
    card_items_sea::create_item(&db, ItemCreate::new(card.id, 0, "first"))
        .await
        .unwrap();
    let err: DomainError = card_items_sea::create_item(&db, ItemCreate::new(card.id, 0, "second"))
        .await
        .unwrap_err()
        .into();

    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::PositionOccupied, _)
    ));
}

#[tokio::test]
async fn title_constraint_maps_to_title_taken() {
    let db = setup_db().await;
    let user = create_user(&db, "constraint-title").await;

    let dto = CardCreate::new(user, 2025, 3, "BINGO").with_title(Some("Fitness".to_owned()));
    cards_sea::create_card(&db, dto.clone()).await.unwrap();

    let err: DomainError = cards_sea::create_card(&db, dto).await.unwrap_err().into();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::TitleTaken, _)
    ));
}

#[tokio::test]
async fn untitled_card_constraint_maps_to_duplicate_default_card() {
    let db = setup_db().await;
    let user = create_user(&db, "constraint-default").await;

    let dto = CardCreate::new(user, 2025, 3, "BINGO");
    cards_sea::create_card(&db, dto.clone()).await.unwrap();

    let err: DomainError = cards_sea::create_card(&db, dto).await.unwrap_err().into();
    assert!(matches!(
        err,
        DomainError::Conflict(ConflictKind::DuplicateDefaultCard, _)
    ));

    // A titled card for the same year does not trip the partial index.
    let titled = CardCreate::new(user, 2025, 3, "BINGO").with_title(Some("Side".to_owned()));
    cards_sea::create_card(&db, titled).await.unwrap();
}

#[tokio::test]
async fn error_codes_expose_a_closed_branchable_set() {
    let db = setup_db().await;
    let user = create_user(&db, "constraint-codes").await;
    let service = CardService::with_seed(62);

    let err = service
        .create_card(&db, user, CreateCard::new(2025, 9))
        .await
        .unwrap_err();
    assert_eq!(err.code().as_str(), "INVALID_GRID_SIZE");

    let card = service
        .create_card(&db, user, CreateCard::new(2025, 3))
        .await
        .unwrap();
    let err = service.get_card(&db, user, card.id + 1).await.unwrap_err();
    assert_eq!(err.code().as_str(), "CARD_NOT_FOUND");
}
