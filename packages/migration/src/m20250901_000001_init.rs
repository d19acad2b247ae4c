use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::{DatabaseBackend, Statement};
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Users {
    Table,
    Id,
    Sub,
    Username,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Cards {
    Table,
    Id,
    UserId,
    Year,
    Title,
    Category,
    GridSize,
    HeaderText,
    HasFreeSpace,
    FreeSpacePos,
    IsFinalized,
    VisibleToFriends,
    IsArchived,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum CardItems {
    Table,
    Id,
    CardId,
    Position,
    Content,
    IsCompleted,
    CompletedAt,
    Notes,
    ProofUrl,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // users
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Users::Sub).string().not_null())
                    .col(ColumnDef::new(Users::Username).string().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_users_sub")
                    .table(Users::Table)
                    .col(Users::Sub)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // cards
        manager
            .create_table(
                Table::create()
                    .table(Cards::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Cards::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(Cards::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Cards::Year).integer().not_null())
                    .col(ColumnDef::new(Cards::Title).text().null())
                    .col(ColumnDef::new(Cards::Category).text().null())
                    .col(ColumnDef::new(Cards::GridSize).small_integer().not_null())
                    .col(ColumnDef::new(Cards::HeaderText).text().not_null())
                    .col(
                        ColumnDef::new(Cards::HasFreeSpace)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Cards::FreeSpacePos).small_integer().null())
                    .col(
                        ColumnDef::new(Cards::IsFinalized)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Cards::VisibleToFriends)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Cards::IsArchived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Cards::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Cards::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_cards_user_id")
                            .from(Cards::Table, Cards::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_cards_user_id")
                    .table(Cards::Table)
                    .col(Cards::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_cards_user_year")
                    .table(Cards::Table)
                    .col(Cards::UserId)
                    .col(Cards::Year)
                    .to_owned(),
            )
            .await?;

        // One card per (user, year, title). NULL titles are distinct under this
        // index on both backends, so untitled cards need the partial index below.
        manager
            .create_index(
                Index::create()
                    .name("ux_cards_user_year_title")
                    .table(Cards::Table)
                    .col(Cards::UserId)
                    .col(Cards::Year)
                    .col(Cards::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // At most one untitled ("default") card per (user, year). Partial unique
        // indexes share syntax on PostgreSQL and SQLite.
        let backend = manager.get_database_backend();
        match backend {
            DatabaseBackend::Postgres | DatabaseBackend::Sqlite => {
                manager
                    .get_connection()
                    .execute(Statement::from_string(
                        backend,
                        "CREATE UNIQUE INDEX ux_cards_user_year_default \
                         ON cards (user_id, year) WHERE title IS NULL",
                    ))
                    .await?;
            }
            _ => {
                return Err(DbErr::Custom("Unsupported database backend".into()));
            }
        }

        // card_items
        manager
            .create_table(
                Table::create()
                    .table(CardItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CardItems::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(CardItems::CardId).big_integer().not_null())
                    .col(
                        ColumnDef::new(CardItems::Position)
                            .small_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CardItems::Content).text().not_null())
                    .col(
                        ColumnDef::new(CardItems::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CardItems::CompletedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(CardItems::Notes).text().null())
                    .col(ColumnDef::new(CardItems::ProofUrl).text().null())
                    .col(
                        ColumnDef::new(CardItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CardItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_card_items_card_id")
                            .from(CardItems::Table, CardItems::CardId)
                            .to(Cards::Table, Cards::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_card_items_card_id")
                    .table(CardItems::Table)
                    .col(CardItems::CardId)
                    .to_owned(),
            )
            .await?;

        // Last line of defense for the grid engine: two items can never share a
        // cell, no matter which writer loses a race. Multi-step rewrites dodge
        // this constraint mid-transaction with negative sentinel positions.
        manager
            .create_index(
                Index::create()
                    .name("ux_card_items_card_position")
                    .table(CardItems::Table)
                    .col(CardItems::CardId)
                    .col(CardItems::Position)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // drop in reverse order + drop index before table

        manager
            .drop_index(
                Index::drop()
                    .name("ux_card_items_card_position")
                    .table(CardItems::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ix_card_items_card_id")
                    .table(CardItems::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(CardItems::Table).to_owned())
            .await?;

        let backend = manager.get_database_backend();
        manager
            .get_connection()
            .execute(Statement::from_string(
                backend,
                "DROP INDEX IF EXISTS ux_cards_user_year_default",
            ))
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ux_cards_user_year_title")
                    .table(Cards::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ix_cards_user_year")
                    .table(Cards::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ix_cards_user_id")
                    .table(Cards::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Cards::Table).to_owned())
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("ux_users_sub")
                    .table(Users::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}
