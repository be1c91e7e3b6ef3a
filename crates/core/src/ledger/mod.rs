//! Double-entry posting logic.
//!
//! This module implements the core ledger functionality:
//! - Fixed account codes and balance classes
//! - Entry pairs (one debit, one credit, equal amounts)
//! - Posting plans for topup/charge/bonus operations
//! - Reversal planning (side-swapped mirror of an existing pair)
//! - Error taxonomy for ledger operations

pub mod balance;
pub mod error;
pub mod posting;
pub mod reversal;
pub mod types;

#[cfg(test)]
mod posting_props;

pub use balance::AccountClass;
pub use error::LedgerError;
pub use posting::{BalanceDelta, PostingPlan, PostingService};
pub use reversal::{OriginalTransaction, ReversalService};
pub use types::{AccountCode, AccountRef, EntryPair, EntrySide, EntrySpec, TransactionKind};
