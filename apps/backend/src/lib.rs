#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod db;
pub mod domain;
pub mod entities;
pub mod errors;
pub mod infra;
pub mod repos;
pub mod services;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use db::{set_txn_policy, with_txn, TxnPolicy};
pub use domain::grid::Grid;
pub use domain::stats::CardStats;
pub use errors::domain::DomainError;
pub use errors::ErrorCode;
pub use infra::db::connect_db;
pub use repos::{Card, CardItem};
pub use services::cards::{
    AddItem, CardService, CloneCard, CloneOutcome, CompletionOutcome, CreateCard, ImportCard,
    ImportItem, UpdateCardConfig,
};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
