//! Error codes for the bingo backend API.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that callers (HTTP handlers, other services) branch on.

use core::fmt;

use super::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, StateKind, ValidationKind,
};

/// Centralized error codes for the bingo backend API.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string, giving
/// callers a small closed set to branch on instead of raw storage diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authorization
    /// Acting user does not own the card
    Forbidden,

    // Resource not found
    /// Card not found
    CardNotFound,
    /// Item not found
    ItemNotFound,
    /// User not found
    UserNotFound,
    /// General not found error
    NotFound,

    // Business logic conflicts
    /// Card title already used for this year
    TitleTaken,
    /// Untitled card already exists for this year
    DuplicateDefaultCard,
    /// Grid position already occupied
    PositionOccupied,
    /// No empty cell available for the free space
    NoSpaceForFree,
    /// General conflict error
    Conflict,

    // Request validation
    /// Grid size outside the allowed range
    InvalidGridSize,
    /// Position outside the grid or on the free space
    InvalidPosition,
    /// Header text missing or shorter than the grid width
    InvalidHeaderText,
    /// Title empty or too long
    InvalidTitle,
    /// Category empty or too long
    InvalidCategory,
    /// Item content empty or too long
    InvalidContent,
    /// Proof URL is not an http(s) URL
    InvalidProofUrl,
    /// General validation error
    ValidationError,

    // Lifecycle state
    /// Structural mutation on a finalized card
    CardFinalized,
    /// Completion tracking on a draft card
    CardNotFinalized,
    /// Item count does not match capacity at finalize
    FinalizeCountMismatch,

    // Capacity
    /// Card already at capacity
    CardFull,

    // Infrastructure
    /// Database timed out
    DbTimeout,
    /// Database unavailable
    DbUnavailable,
    /// Unclassified database error
    DbError,
}

impl ErrorCode {
    /// Canonical SCREAMING_SNAKE_CASE string for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::CardNotFound => "CARD_NOT_FOUND",
            ErrorCode::ItemNotFound => "ITEM_NOT_FOUND",
            ErrorCode::UserNotFound => "USER_NOT_FOUND",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::TitleTaken => "TITLE_TAKEN",
            ErrorCode::DuplicateDefaultCard => "DUPLICATE_DEFAULT_CARD",
            ErrorCode::PositionOccupied => "POSITION_OCCUPIED",
            ErrorCode::NoSpaceForFree => "NO_SPACE_FOR_FREE",
            ErrorCode::Conflict => "CONFLICT",
            ErrorCode::InvalidGridSize => "INVALID_GRID_SIZE",
            ErrorCode::InvalidPosition => "INVALID_POSITION",
            ErrorCode::InvalidHeaderText => "INVALID_HEADER_TEXT",
            ErrorCode::InvalidTitle => "INVALID_TITLE",
            ErrorCode::InvalidCategory => "INVALID_CATEGORY",
            ErrorCode::InvalidContent => "INVALID_CONTENT",
            ErrorCode::InvalidProofUrl => "INVALID_PROOF_URL",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::CardFinalized => "CARD_FINALIZED",
            ErrorCode::CardNotFinalized => "CARD_NOT_FINALIZED",
            ErrorCode::FinalizeCountMismatch => "FINALIZE_COUNT_MISMATCH",
            ErrorCode::CardFull => "CARD_FULL",
            ErrorCode::DbTimeout => "DB_TIMEOUT",
            ErrorCode::DbUnavailable => "DB_UNAVAILABLE",
            ErrorCode::DbError => "DB_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&DomainError> for ErrorCode {
    fn from(err: &DomainError) -> Self {
        match err {
            DomainError::Forbidden(_) => ErrorCode::Forbidden,
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Card => ErrorCode::CardNotFound,
                NotFoundKind::Item => ErrorCode::ItemNotFound,
                NotFoundKind::User => ErrorCode::UserNotFound,
                _ => ErrorCode::NotFound,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::TitleTaken => ErrorCode::TitleTaken,
                ConflictKind::DuplicateDefaultCard => ErrorCode::DuplicateDefaultCard,
                ConflictKind::PositionOccupied => ErrorCode::PositionOccupied,
                ConflictKind::NoSpaceForFree => ErrorCode::NoSpaceForFree,
                _ => ErrorCode::Conflict,
            },
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::GridSize => ErrorCode::InvalidGridSize,
                ValidationKind::Position => ErrorCode::InvalidPosition,
                ValidationKind::HeaderText => ErrorCode::InvalidHeaderText,
                ValidationKind::Title => ErrorCode::InvalidTitle,
                ValidationKind::Category => ErrorCode::InvalidCategory,
                ValidationKind::Content => ErrorCode::InvalidContent,
                ValidationKind::ProofUrl => ErrorCode::InvalidProofUrl,
                _ => ErrorCode::ValidationError,
            },
            DomainError::State(kind, _) => match kind {
                StateKind::CardFinalized => ErrorCode::CardFinalized,
                StateKind::CardNotFinalized => ErrorCode::CardNotFinalized,
                StateKind::FinalizeCountMismatch => ErrorCode::FinalizeCountMismatch,
            },
            DomainError::Capacity(_) => ErrorCode::CardFull,
            DomainError::Infra(kind, _) => match kind {
                InfraErrorKind::Timeout => ErrorCode::DbTimeout,
                InfraErrorKind::DbUnavailable => ErrorCode::DbUnavailable,
                _ => ErrorCode::DbError,
            },
        }
    }
}

impl DomainError {
    /// Stable code for this error, suitable for API responses and logs.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::from(self)
    }
}
