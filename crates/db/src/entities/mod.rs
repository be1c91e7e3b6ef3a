//! `SeaORM` entity definitions for the ledger tables.

pub mod account_balances;
pub mod idempotency_keys;
pub mod ledger_entries;
pub mod ledger_transactions;
pub mod sea_orm_active_enums;
pub mod trial_balance_snapshots;
