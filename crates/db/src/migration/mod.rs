//! Database migrations.
//!
//! Migrations are managed using sea-orm-migration and are written with the
//! portable schema DSL so the same migration runs on PostgreSQL and on the
//! SQLite test backend.

pub use sea_orm_migration::prelude::*;

mod m20260804_000001_initial;

/// Migrator for running database migrations.
pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20260804_000001_initial::Migration)]
    }
}
