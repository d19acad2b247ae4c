//! SeaORM -> DomainError translation helpers.
//!
//! Adapters return `sea_orm::DbErr`; repos and services convert to
//! `crate::errors::domain::DomainError` through the `From` implementation
//! below. Unique-constraint violations are fingerprinted here so a storage
//! race surfaces as the specific domain conflict that was violated (position
//! occupied, title taken, duplicate default card) instead of a raw DB error.

use tracing::{error, warn};

use crate::errors::domain::{ConflictKind, DomainError, InfraErrorKind, NotFoundKind};

fn mentions_sqlstate(msg: &str, code: &str) -> bool {
    msg.contains(code) || msg.contains(&format!("SQLSTATE({code})"))
}

/// Extract the column list from SQLite "UNIQUE constraint failed: ..." errors.
///
/// SQLite reports either a `table.column[, table.column...]` list or, for
/// partial indexes, `index 'index_name'`.
fn extract_sqlite_unique_detail(error_msg: &str) -> Option<&str> {
    let start = error_msg.find("UNIQUE constraint failed: ")?;
    let rest = &error_msg[start + "UNIQUE constraint failed: ".len()..];
    let end = rest.find('\n').unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Map SQLite unique-violation details to domain-specific conflict errors.
///
/// Order matters: the title detail also names `cards.user_id` and
/// `cards.year`, so the title check must run before the untitled-card check.
fn map_sqlite_unique_to_conflict(detail: &str) -> Option<(ConflictKind, &'static str)> {
    if detail.contains("card_items.card_id") && detail.contains("card_items.position") {
        return Some((
            ConflictKind::PositionOccupied,
            "Position already occupied on this card",
        ));
    }
    if detail.contains("cards.title") {
        return Some((
            ConflictKind::TitleTaken,
            "A card with this title already exists for this year",
        ));
    }
    // The partial index on untitled cards is reported either by name or as
    // its (user_id, year) column list, depending on the SQLite version.
    if detail.contains("ux_cards_user_year_default")
        || (detail.contains("cards.user_id") && detail.contains("cards.year"))
    {
        return Some((
            ConflictKind::DuplicateDefaultCard,
            "An untitled card already exists for this year",
        ));
    }
    None
}

/// Map PostgreSQL constraint names to domain-specific conflict errors.
fn map_postgres_constraint_to_conflict(error_msg: &str) -> Option<(ConflictKind, &'static str)> {
    if error_msg.contains("ux_card_items_card_position") {
        return Some((
            ConflictKind::PositionOccupied,
            "Position already occupied on this card",
        ));
    }
    if error_msg.contains("ux_cards_user_year_default") {
        return Some((
            ConflictKind::DuplicateDefaultCard,
            "An untitled card already exists for this year",
        ));
    }
    if error_msg.contains("ux_cards_user_year_title") {
        return Some((
            ConflictKind::TitleTaken,
            "A card with this title already exists for this year",
        ));
    }
    None
}

/// Translate a `DbErr` into a `DomainError` with sanitized detail.
pub fn map_db_err(e: sea_orm::DbErr) -> DomainError {
    let error_msg = e.to_string();

    match &e {
        sea_orm::DbErr::RecordNotFound(_) => {
            return DomainError::not_found(NotFoundKind::Other("Record".into()), "Record not found");
        }
        sea_orm::DbErr::ConnectionAcquire(_) | sea_orm::DbErr::Conn(_) => {
            warn!(raw_error = %error_msg, "Database unavailable");
            return DomainError::infra(InfraErrorKind::DbUnavailable, "Database unavailable");
        }
        _ => {}
    }

    if mentions_sqlstate(&error_msg, "23505")
        || error_msg.contains("duplicate key value violates unique constraint")
        || error_msg.contains("UNIQUE constraint failed")
    {
        warn!(raw_error = %error_msg, "Unique constraint violation");

        // SQLite reports table.column lists (or index names) ...
        if let Some(detail) = extract_sqlite_unique_detail(&error_msg) {
            if let Some((kind, detail)) = map_sqlite_unique_to_conflict(detail) {
                return DomainError::conflict(kind, detail);
            }
        }

        // ... PostgreSQL reports constraint names.
        if let Some((kind, detail)) = map_postgres_constraint_to_conflict(&error_msg) {
            return DomainError::conflict(kind, detail);
        }

        return DomainError::conflict(
            ConflictKind::Other("Unique".into()),
            "Unique constraint violation",
        );
    }

    if mentions_sqlstate(&error_msg, "23503") || error_msg.contains("FOREIGN KEY constraint failed")
    {
        warn!(raw_error = %error_msg, "Foreign key constraint violation");
        return DomainError::validation(
            crate::errors::domain::ValidationKind::Other("ForeignKey".into()),
            "Foreign key constraint violation",
        );
    }

    if error_msg.contains("timeout") || error_msg.contains("pool") {
        warn!(raw_error = %error_msg, "Database timeout or pool issue");
        return DomainError::infra(InfraErrorKind::Timeout, "Database timeout");
    }

    error!(raw_error = %error_msg, "Unhandled database error");
    DomainError::infra(
        InfraErrorKind::Other("DbErr".into()),
        "Database operation failed",
    )
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        map_db_err(e)
    }
}
