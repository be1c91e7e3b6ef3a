//! Reversal planning.
//!
//! A reversal is a new transaction whose two entries exactly mirror an
//! existing transaction with debit and credit swapped, restoring both
//! balances to their pre-original state. Whether a reversal already exists
//! for the target is the repository's concern (a uniqueness constraint);
//! this module only plans the mirrored pair.

use cortado_shared::types::TransactionId;

use super::error::LedgerError;
use super::types::{EntryPair, EntrySpec, TransactionKind};

/// The already-committed transaction a reversal targets.
#[derive(Debug, Clone, Copy)]
pub struct OriginalTransaction {
    /// The original transaction id.
    pub id: TransactionId,
    /// The original transaction kind.
    pub kind: TransactionKind,
    /// The original entry pair.
    pub entries: EntryPair,
}

/// Stateless service for planning reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Plans the mirrored entry pair for reversing `original`.
    ///
    /// Each entry keeps its account and amount and swaps its side, so the
    /// reversal's debit posts to the original's credit account and vice
    /// versa.
    ///
    /// # Errors
    ///
    /// Returns `ReversalForbiddenType` if the original is itself a
    /// reversal, and `InvariantBroken` if the stored pair does not balance
    /// (a committed transaction can only be unbalanced through a handler
    /// bug).
    pub fn plan(original: &OriginalTransaction) -> Result<EntryPair, LedgerError> {
        if !original.kind.is_reversible() {
            return Err(LedgerError::ReversalForbiddenType(original.id));
        }
        if !original.entries.is_balanced() {
            return Err(LedgerError::InvariantBroken(format!(
                "transaction {} has an unbalanced entry pair on record",
                original.id
            )));
        }

        let mirrored = EntryPair {
            debit: EntrySpec {
                account: original.entries.credit.account,
                side: original.entries.credit.side.opposite(),
                amount: original.entries.credit.amount,
            },
            credit: EntrySpec {
                account: original.entries.debit.account,
                side: original.entries.debit.side.opposite(),
                amount: original.entries.debit.amount,
            },
        };

        Ok(mirrored)
    }
}
