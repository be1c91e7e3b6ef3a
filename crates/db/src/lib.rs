//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions for the ledger tables
//! - Repository abstractions owning every atomic write path
//! - Database migrations
//!
//! The ledger tables are append-only: no repository exposes an update or
//! delete for transactions or entries, and cached balances move only as a
//! byproduct of committing an entry pair.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{LedgerRepository, TrialBalanceRepository};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
