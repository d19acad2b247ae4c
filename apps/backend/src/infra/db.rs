//! Database connection bootstrap.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::info;

use crate::errors::domain::DomainError;

/// Connect to the database behind `url` with the standard pool settings.
///
/// Works for both PostgreSQL and SQLite URLs. In-memory SQLite callers should
/// pass `max_connections = 1` so every pooled connection sees the same
/// database.
pub async fn connect_db(url: &str, max_connections: u32) -> Result<DatabaseConnection, DomainError> {
    let mut opts = ConnectOptions::new(url.to_owned());
    opts.max_connections(max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(false);

    let db = Database::connect(opts).await?;
    info!(max_connections, "database connected");
    Ok(db)
}
