//! SeaORM adapter for the card_items table - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::entities::card_items;

pub mod dto;

pub use dto::ItemCreate;

// Adapter functions return DbErr; the repos layer maps to DomainError via
// From<DbErr>.

/// Helper: apply an update to one item, bump `updated_at`, then refetch.
async fn update_then_fetch<C, F>(
    conn: &C,
    id: i64,
    configure_update: F,
) -> Result<card_items::Model, sea_orm::DbErr>
where
    C: ConnectionTrait + Send + Sync,
    F: FnOnce(
        sea_orm::UpdateMany<card_items::Entity>,
    ) -> sea_orm::UpdateMany<card_items::Entity>,
{
    let now = OffsetDateTime::now_utc();

    let result = configure_update(card_items::Entity::update_many())
        .col_expr(card_items::Column::UpdatedAt, Expr::val(now).into())
        .filter(card_items::Column::Id.eq(id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(sea_orm::DbErr::RecordNotFound("Item not found".to_string()));
    }

    require_item(conn, id).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    item_id: i64,
) -> Result<Option<card_items::Model>, sea_orm::DbErr> {
    card_items::Entity::find_by_id(item_id).one(conn).await
}

/// Find item by ID or return RecordNotFound.
pub async fn require_item<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    item_id: i64,
) -> Result<card_items::Model, sea_orm::DbErr> {
    find_by_id(conn, item_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Item not found".to_string()))
}

/// All items of a card in ascending position order.
pub async fn find_by_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<Vec<card_items::Model>, sea_orm::DbErr> {
    card_items::Entity::find()
        .filter(card_items::Column::CardId.eq(card_id))
        .order_by_asc(card_items::Column::Position)
        .all(conn)
        .await
}

pub async fn find_by_card_and_position<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    position: i16,
) -> Result<Option<card_items::Model>, sea_orm::DbErr> {
    card_items::Entity::find()
        .filter(card_items::Column::CardId.eq(card_id))
        .filter(card_items::Column::Position.eq(position))
        .one(conn)
        .await
}

/// Just the occupied positions of a card, ascending.
pub async fn occupied_positions<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<Vec<i16>, sea_orm::DbErr> {
    card_items::Entity::find()
        .select_only()
        .column(card_items::Column::Position)
        .filter(card_items::Column::CardId.eq(card_id))
        .order_by_asc(card_items::Column::Position)
        .into_tuple::<i16>()
        .all(conn)
        .await
}

pub async fn count_by_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    card_items::Entity::find()
        .filter(card_items::Column::CardId.eq(card_id))
        .count(conn)
        .await
}

pub async fn create_item<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: ItemCreate,
) -> Result<card_items::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let item_active = card_items::ActiveModel {
        id: NotSet,
        card_id: Set(dto.card_id),
        position: Set(dto.position),
        content: Set(dto.content),
        is_completed: Set(dto.is_completed),
        completed_at: Set(dto.completed_at),
        notes: Set(dto.notes),
        proof_url: Set(dto.proof_url),
        created_at: Set(now),
        updated_at: Set(now),
    };

    item_active.insert(conn).await
}

/// Bulk insert for clone/import. A no-op for an empty slice.
pub async fn create_items<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dtos: Vec<ItemCreate>,
) -> Result<(), sea_orm::DbErr> {
    if dtos.is_empty() {
        return Ok(());
    }
    let now = OffsetDateTime::now_utc();
    let actives: Vec<card_items::ActiveModel> = dtos
        .into_iter()
        .map(|dto| card_items::ActiveModel {
            id: NotSet,
            card_id: Set(dto.card_id),
            position: Set(dto.position),
            content: Set(dto.content),
            is_completed: Set(dto.is_completed),
            completed_at: Set(dto.completed_at),
            notes: Set(dto.notes),
            proof_url: Set(dto.proof_url),
            created_at: Set(now),
            updated_at: Set(now),
        })
        .collect();

    card_items::Entity::insert_many(actives).exec(conn).await?;
    Ok(())
}

pub async fn update_position<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    item_id: i64,
    position: i16,
) -> Result<card_items::Model, sea_orm::DbErr> {
    update_then_fetch(conn, item_id, |update| {
        update.col_expr(card_items::Column::Position, Expr::val(position).into())
    })
    .await
}

pub async fn update_content<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    item_id: i64,
    content: String,
) -> Result<card_items::Model, sea_orm::DbErr> {
    update_then_fetch(conn, item_id, |update| {
        update.col_expr(card_items::Column::Content, Expr::val(content).into())
    })
    .await
}

pub async fn set_completion<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    item_id: i64,
    is_completed: bool,
    completed_at: Option<OffsetDateTime>,
) -> Result<card_items::Model, sea_orm::DbErr> {
    update_then_fetch(conn, item_id, |update| {
        update
            .col_expr(card_items::Column::IsCompleted, Expr::val(is_completed).into())
            .col_expr(card_items::Column::CompletedAt, Expr::val(completed_at).into())
    })
    .await
}

pub async fn update_notes<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    item_id: i64,
    notes: Option<String>,
) -> Result<card_items::Model, sea_orm::DbErr> {
    update_then_fetch(conn, item_id, |update| {
        update.col_expr(card_items::Column::Notes, Expr::val(notes).into())
    })
    .await
}

pub async fn update_proof_url<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    item_id: i64,
    proof_url: Option<String>,
) -> Result<card_items::Model, sea_orm::DbErr> {
    update_then_fetch(conn, item_id, |update| {
        update.col_expr(card_items::Column::ProofUrl, Expr::val(proof_url).into())
    })
    .await
}

pub async fn delete_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    item_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = card_items::Entity::delete_many()
        .filter(card_items::Column::Id.eq(item_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
