//! Domain-level error type used across services, repos and adapters.
//!
//! This error type is HTTP- and DB-agnostic. Adapters return `sea_orm::DbErr`;
//! the repos layer converts to `DomainError` via the provided
//! `From<sea_orm::DbErr>` implementation (see `crate::infra::db_errors`).

use thiserror::Error;

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    Timeout,
    DbUnavailable,
    DataCorruption,
    Other(String),
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    User,
    Card,
    Item,
    Other(String),
}

/// Domain-level conflict kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    /// A card with this title already exists for the user and year.
    TitleTaken,
    /// An untitled card already exists for the user and year.
    DuplicateDefaultCard,
    /// The target grid cell already holds an item.
    PositionOccupied,
    /// No empty cell is left to receive the free space or a displaced item.
    NoSpaceForFree,
    Other(String),
}

/// Parameter validation failure kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    GridSize,
    Position,
    HeaderText,
    Title,
    Category,
    Content,
    ProofUrl,
    Other(String),
}

/// Card lifecycle rule violations
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StateKind {
    /// Structural mutation attempted on a finalized card.
    CardFinalized,
    /// Completion tracking attempted on a draft card.
    CardNotFinalized,
    /// Finalize attempted with an item count different from capacity.
    FinalizeCountMismatch,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Input validation or business rule violation
    #[error("validation error {0:?}: {1}")]
    Validation(ValidationKind, String),
    /// Semantic conflict
    #[error("conflict {0:?}: {1}")]
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    #[error("not found {0:?}: {1}")]
    NotFound(NotFoundKind, String),
    /// Acting user does not own the card
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Operation not legal in the card's current lifecycle state
    #[error("state conflict {0:?}: {1}")]
    State(StateKind, String),
    /// Card already holds as many items as its grid allows
    #[error("capacity exceeded: {0}")]
    Capacity(String),
    /// Infrastructure/operational failures
    #[error("infra {0:?}: {1}")]
    Infra(InfraErrorKind, String),
}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::Forbidden(detail.into())
    }
    pub fn state(kind: StateKind, detail: impl Into<String>) -> Self {
        Self::State(kind, detail.into())
    }
    pub fn capacity(detail: impl Into<String>) -> Self {
        Self::Capacity(detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }
}
