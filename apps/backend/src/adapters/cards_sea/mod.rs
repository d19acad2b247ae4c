//! SeaORM adapter for the cards table - generic over ConnectionTrait.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::cards;

pub mod dto;

pub use dto::CardCreate;

// Adapter functions return DbErr; the repos layer maps to DomainError via
// From<DbErr>.

/// Helper: apply an update to one card, bump `updated_at`, then refetch.
///
/// Checks rows_affected so a vanished row surfaces as RecordNotFound instead
/// of a silent no-op. The caller provides a closure that configures
/// entity-specific columns.
async fn update_then_fetch<C, F>(
    conn: &C,
    id: i64,
    configure_update: F,
) -> Result<cards::Model, sea_orm::DbErr>
where
    C: ConnectionTrait + Send + Sync,
    F: FnOnce(sea_orm::UpdateMany<cards::Entity>) -> sea_orm::UpdateMany<cards::Entity>,
{
    let now = time::OffsetDateTime::now_utc();

    let result = configure_update(cards::Entity::update_many())
        .col_expr(cards::Column::UpdatedAt, Expr::val(now).into())
        .filter(cards::Column::Id.eq(id))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Err(sea_orm::DbErr::RecordNotFound("Card not found".to_string()));
    }

    require_card(conn, id).await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<Option<cards::Model>, sea_orm::DbErr> {
    cards::Entity::find_by_id(card_id).one(conn).await
}

/// Find card by ID or return RecordNotFound.
pub async fn require_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<cards::Model, sea_orm::DbErr> {
    find_by_id(conn, card_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("Card not found".to_string()))
}

/// Find card by ID while taking an exclusive row lock (`SELECT ... FOR
/// UPDATE`). Must run inside a transaction; serializes concurrent allocators
/// targeting the same card.
pub async fn lock_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
) -> Result<Option<cards::Model>, sea_orm::DbErr> {
    cards::Entity::find_by_id(card_id)
        .lock_exclusive()
        .one(conn)
        .await
}

pub async fn find_by_user_year_title<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    year: i32,
    title: Option<&str>,
) -> Result<Option<cards::Model>, sea_orm::DbErr> {
    let mut query = cards::Entity::find()
        .filter(cards::Column::UserId.eq(user_id))
        .filter(cards::Column::Year.eq(year));
    query = match title {
        Some(title) => query.filter(cards::Column::Title.eq(title)),
        None => query.filter(cards::Column::Title.is_null()),
    };
    query.one(conn).await
}

/// List a user's cards, newest year first. `archived` filters the archive
/// flag when given.
pub async fn list_by_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    archived: Option<bool>,
) -> Result<Vec<cards::Model>, sea_orm::DbErr> {
    let mut query = cards::Entity::find().filter(cards::Column::UserId.eq(user_id));
    if let Some(archived) = archived {
        query = query.filter(cards::Column::IsArchived.eq(archived));
    }
    query
        .order_by_desc(cards::Column::Year)
        .order_by_asc(cards::Column::Id)
        .all(conn)
        .await
}

/// Load a set of cards by id, restricted to one owner.
pub async fn find_many_owned<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
    user_id: i64,
) -> Result<Vec<cards::Model>, sea_orm::DbErr> {
    cards::Entity::find()
        .filter(cards::Column::Id.is_in(ids.to_vec()))
        .filter(cards::Column::UserId.eq(user_id))
        .all(conn)
        .await
}

pub async fn create_card<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: CardCreate,
) -> Result<cards::Model, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let card_active = cards::ActiveModel {
        id: NotSet,
        user_id: Set(dto.user_id),
        year: Set(dto.year),
        title: Set(dto.title),
        category: Set(dto.category),
        grid_size: Set(dto.grid_size),
        header_text: Set(dto.header_text),
        has_free_space: Set(dto.free_space_pos.is_some()),
        free_space_pos: Set(dto.free_space_pos),
        is_finalized: Set(dto.is_finalized),
        visible_to_friends: Set(dto.visible_to_friends),
        is_archived: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };

    card_active.insert(conn).await
}

pub async fn update_header<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    header_text: String,
) -> Result<cards::Model, sea_orm::DbErr> {
    update_then_fetch(conn, card_id, |update| {
        update.col_expr(cards::Column::HeaderText, Expr::val(header_text).into())
    })
    .await
}

/// Set or clear the free space. `Some(pos)` enables it at `pos`; `None`
/// disables it. Both columns move together so the "position present iff
/// enabled" invariant holds at the storage layer too.
pub async fn set_free_space<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    free_space_pos: Option<i16>,
) -> Result<cards::Model, sea_orm::DbErr> {
    update_then_fetch(conn, card_id, |update| {
        update
            .col_expr(
                cards::Column::HasFreeSpace,
                Expr::val(free_space_pos.is_some()).into(),
            )
            .col_expr(cards::Column::FreeSpacePos, Expr::val(free_space_pos).into())
    })
    .await
}

pub async fn set_finalized<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    visible_to_friends: Option<bool>,
) -> Result<cards::Model, sea_orm::DbErr> {
    update_then_fetch(conn, card_id, |mut update| {
        update = update.col_expr(cards::Column::IsFinalized, Expr::val(true).into());
        if let Some(visible) = visible_to_friends {
            update = update.col_expr(cards::Column::VisibleToFriends, Expr::val(visible).into());
        }
        update
    })
    .await
}

pub async fn set_visibility<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    card_id: i64,
    visible_to_friends: bool,
) -> Result<cards::Model, sea_orm::DbErr> {
    update_then_fetch(conn, card_id, |update| {
        update.col_expr(
            cards::Column::VisibleToFriends,
            Expr::val(visible_to_friends).into(),
        )
    })
    .await
}

/// Bulk visibility update, restricted to one owner. Returns affected rows.
pub async fn set_visibility_many<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
    user_id: i64,
    visible_to_friends: bool,
) -> Result<u64, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let result = cards::Entity::update_many()
        .col_expr(
            cards::Column::VisibleToFriends,
            Expr::val(visible_to_friends).into(),
        )
        .col_expr(cards::Column::UpdatedAt, Expr::val(now).into())
        .filter(cards::Column::Id.is_in(ids.to_vec()))
        .filter(cards::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Bulk archive toggle, restricted to one owner. Returns affected rows.
pub async fn set_archived_many<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
    user_id: i64,
    archived: bool,
) -> Result<u64, sea_orm::DbErr> {
    let now = time::OffsetDateTime::now_utc();
    let result = cards::Entity::update_many()
        .col_expr(cards::Column::IsArchived, Expr::val(archived).into())
        .col_expr(cards::Column::UpdatedAt, Expr::val(now).into())
        .filter(cards::Column::Id.is_in(ids.to_vec()))
        .filter(cards::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}

/// Bulk delete, restricted to one owner. Items go with their cards via the FK
/// cascade. Returns affected rows.
pub async fn delete_many<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ids: &[i64],
    user_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    let result = cards::Entity::delete_many()
        .filter(cards::Column::Id.is_in(ids.to_vec()))
        .filter(cards::Column::UserId.eq(user_id))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
