#![allow(dead_code)]

//! Shared test bootstrap: a migrated in-memory SQLite database per test plus
//! small fixture helpers.

use backend::entities::users;
use backend::repos::CardItem;
use migration::{Migrator, MigratorTrait};
use once_cell::sync::OnceCell;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, NotSet, Set};
use tracing_subscriber::{fmt, EnvFilter};

static LOGGING: OnceCell<()> = OnceCell::new();

// Logging is auto-installed for every test binary that declares `mod common`.
#[ctor::ctor]
fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

/// Fresh, fully migrated in-memory SQLite database.
///
/// A single-connection pool, so every query sees the same in-memory database
/// and the pool never swaps the connection out from under the tests.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:".to_owned());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("apply migrations");
    db
}

/// Insert a user row and return its id.
pub async fn create_user(db: &DatabaseConnection, sub: &str) -> i64 {
    let now = time::OffsetDateTime::now_utc();
    let user = users::ActiveModel {
        id: NotSet,
        sub: Set(sub.to_owned()),
        username: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await
    .expect("insert user");
    user.id
}

/// Assert that item positions are pairwise distinct.
pub fn assert_distinct_positions(items: &[CardItem]) {
    let mut positions: Vec<i16> = items.iter().map(|i| i.position).collect();
    positions.sort_unstable();
    positions.dedup();
    assert_eq!(
        positions.len(),
        items.len(),
        "expected pairwise distinct positions"
    );
}
