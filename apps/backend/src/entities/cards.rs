use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cards")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "user_id")]
    pub user_id: i64,
    pub year: i32,
    pub title: Option<String>,
    pub category: Option<String>,
    #[sea_orm(column_name = "grid_size", column_type = "SmallInteger")]
    pub grid_size: i16,
    #[sea_orm(column_name = "header_text")]
    pub header_text: String,
    #[sea_orm(column_name = "has_free_space")]
    pub has_free_space: bool,
    #[sea_orm(column_name = "free_space_pos", column_type = "SmallInteger")]
    pub free_space_pos: Option<i16>,
    #[sea_orm(column_name = "is_finalized")]
    pub is_finalized: bool,
    #[sea_orm(column_name = "visible_to_friends")]
    pub visible_to_friends: bool,
    #[sea_orm(column_name = "is_archived")]
    pub is_archived: bool,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::card_items::Entity")]
    CardItems,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::card_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CardItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
