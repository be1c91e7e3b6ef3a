//! Repository abstractions for data access.
//!
//! Repositories own every atomic write path. The ledger tables are
//! append-only from here: nothing exposes an update or delete for
//! transactions or entries.

pub mod ledger;
pub mod trial_balance;

pub use ledger::LedgerRepository;
pub use trial_balance::TrialBalanceRepository;
