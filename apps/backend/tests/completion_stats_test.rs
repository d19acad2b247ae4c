//! Completion tracking and stats tests, including the bingo-line delta the
//! caller uses to trigger friend notifications.

mod common;

use backend::errors::domain::{DomainError, StateKind};
use backend::{CardService, ImportCard, ImportItem};
use common::{create_user, setup_db};

/// Import a finalized 5x5 card with a centered free space and 24 items, one
/// per non-free cell. Item content records its position.
async fn finalized_five_by_five(
    service: &CardService,
    db: &sea_orm::DatabaseConnection,
    user: i64,
) -> (backend::Card, Vec<backend::CardItem>) {
    let items: Vec<ImportItem> = (0..25)
        .filter(|p| *p != 12)
        .map(|p| ImportItem {
            position: p,
            content: format!("cell {p}"),
        })
        .collect();
    let mut input = ImportCard::new(2025, 5, items);
    input.has_free_space = true;
    input.finalize = true;
    service.import_card(db, user, input).await.unwrap()
}

#[tokio::test]
async fn completion_requires_a_finalized_card() {
    let db = setup_db().await;
    let user = create_user(&db, "complete-draft").await;
    let service = CardService::with_seed(51);

    let card = service
        .create_card(&db, user, backend::CreateCard::new(2025, 3))
        .await
        .unwrap();
    let item = service
        .add_item(&db, user, card.id, backend::AddItem::new("early bird").at(0))
        .await
        .unwrap();

    let err = service
        .complete_item(&db, user, card.id, item.id)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::State(StateKind::CardNotFinalized, _)
    ));
}

#[tokio::test]
async fn completing_a_row_reports_the_new_bingo() {
    let db = setup_db().await;
    let user = create_user(&db, "complete-row").await;
    let service = CardService::with_seed(52);

    let (card, items) = finalized_five_by_five(&service, &db, user).await;

    // Top row: positions 0..=4, no free space involved.
    let row: Vec<_> = items.iter().filter(|i| i.position < 5).collect();
    assert_eq!(row.len(), 5);

    let mut last = None;
    for item in &row {
        last = Some(
            service
                .complete_item(&db, user, card.id, item.id)
                .await
                .unwrap(),
        );
    }
    let outcome = last.unwrap();
    assert_eq!(outcome.bingos_before, 0);
    assert_eq!(outcome.bingos_after, 1);
    assert_eq!(outcome.new_bingos(), 1);
    assert!(outcome.item.is_completed);
    assert!(outcome.item.completed_at.is_some());

    // Completing an already-complete item is a no-op with zero delta.
    let again = service
        .complete_item(&db, user, card.id, row[0].id)
        .await
        .unwrap();
    assert_eq!(again.new_bingos(), 0);
    assert_eq!(again.bingos_after, 1);

    let stats = service.get_stats(&db, user, card.id).await.unwrap();
    assert_eq!(stats.bingo_count, 1);
    assert_eq!(stats.completed_items, 5);
    assert_eq!(stats.capacity, 24);
    assert!(stats.first_completed_at.is_some());
    assert!(stats.last_completed_at >= stats.first_completed_at);
}

#[tokio::test]
async fn full_completion_yields_twelve_bingos_on_a_five_grid() {
    let db = setup_db().await;
    let user = create_user(&db, "complete-full").await;
    let service = CardService::with_seed(53);

    let (card, items) = finalized_five_by_five(&service, &db, user).await;

    let mut total_new = 0;
    for item in &items {
        let outcome = service
            .complete_item(&db, user, card.id, item.id)
            .await
            .unwrap();
        total_new += outcome.new_bingos();
    }

    // 5 rows + 5 columns + 2 diagonals.
    assert_eq!(total_new, 12);

    let stats = service.get_stats(&db, user, card.id).await.unwrap();
    assert_eq!(stats.bingo_count, 12);
    assert_eq!(stats.completed_items, 24);
    assert!((stats.completion_rate - 100.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn uncomplete_clears_the_mark_and_the_timestamp() {
    let db = setup_db().await;
    let user = create_user(&db, "uncomplete").await;
    let service = CardService::with_seed(54);

    let (card, items) = finalized_five_by_five(&service, &db, user).await;
    let item_id = items[0].id;

    service.complete_item(&db, user, card.id, item_id).await.unwrap();
    let item = service
        .uncomplete_item(&db, user, card.id, item_id)
        .await
        .unwrap();
    assert!(!item.is_completed);
    assert!(item.completed_at.is_none());

    // Un-completing an incomplete item is a no-op success.
    let item = service
        .uncomplete_item(&db, user, card.id, item_id)
        .await
        .unwrap();
    assert!(!item.is_completed);

    let stats = service.get_stats(&db, user, card.id).await.unwrap();
    assert_eq!(stats.completed_items, 0);
    assert_eq!(stats.bingo_count, 0);
    assert_eq!(stats.first_completed_at, None);
}
