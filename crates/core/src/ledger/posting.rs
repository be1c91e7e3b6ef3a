//! Posting plans for wallet operations.
//!
//! This module is pure business logic with no database dependencies: it
//! validates an operation's input and computes the balanced entry pair and
//! the balance deltas the repository must apply atomically.

use cortado_shared::types::{MinorUnits, UserId};

use super::balance::AccountClass;
use super::error::LedgerError;
use super::types::{AccountCode, AccountRef, EntryPair, EntrySpec, TransactionKind};

/// The signed change an entry applies to one cached account balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceDelta {
    /// The account whose cached balance moves.
    pub account: AccountRef,
    /// Signed minor-unit change.
    pub change: MinorUnits,
}

/// A validated, ready-to-commit posting: the transaction kind plus the
/// entry pair that realizes it.
#[derive(Debug, Clone, Copy)]
pub struct PostingPlan {
    /// The logical transaction kind.
    pub kind: TransactionKind,
    /// The balanced entry pair.
    pub entries: EntryPair,
}

impl PostingPlan {
    /// The balance deltas both entries imply, in entry order.
    #[must_use]
    pub fn balance_deltas(&self) -> [BalanceDelta; 2] {
        self.entries.entries().map(delta_for)
    }
}

fn delta_for(entry: EntrySpec) -> BalanceDelta {
    BalanceDelta {
        account: entry.account,
        change: entry.account.code.class().balance_change(entry.side, entry.amount),
    }
}

/// Stateless planner for the three money-moving wallet operations.
///
/// | Kind   | Debit            | Credit           |
/// |--------|------------------|------------------|
/// | topup  | cash             | customer funds   |
/// | charge | customer funds   | revenue          |
/// | bonus  | bonus expense    | customer funds   |
pub struct PostingService;

impl PostingService {
    /// Plans a posting for `kind` against `user_id`'s wallet.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a non-positive amount or for the
    /// `Reversal` kind, which is planned from an existing transaction by
    /// the reversal service instead.
    pub fn plan(
        kind: TransactionKind,
        user_id: UserId,
        amount: MinorUnits,
    ) -> Result<PostingPlan, LedgerError> {
        if !amount.is_positive() {
            return Err(LedgerError::Validation(format!(
                "amount must be a positive number of minor units, got {amount}"
            )));
        }

        let wallet = AccountRef::customer(AccountCode::CustomerFunds, user_id);
        let entries = match kind {
            TransactionKind::Topup => {
                EntryPair::new(AccountRef::global(AccountCode::Cash), wallet, amount)
            }
            TransactionKind::Charge => {
                EntryPair::new(wallet, AccountRef::global(AccountCode::Revenue), amount)
            }
            TransactionKind::Bonus => {
                EntryPair::new(AccountRef::global(AccountCode::BonusExpense), wallet, amount)
            }
            TransactionKind::Reversal => {
                return Err(LedgerError::Validation(
                    "a reversal is planned from its original transaction, not posted directly"
                        .to_string(),
                ));
            }
        };

        Ok(PostingPlan { kind, entries })
    }

    /// Verifies the double-entry invariant on a pair about to be committed.
    ///
    /// # Errors
    ///
    /// Returns `InvariantBroken` if the pair is not one debit and one
    /// credit of equal positive amounts. Hitting this means a handler bug,
    /// not bad input.
    pub fn verify_pair(entries: &EntryPair) -> Result<(), LedgerError> {
        if entries.is_balanced() {
            Ok(())
        } else {
            Err(LedgerError::InvariantBroken(format!(
                "entry pair does not balance: debit {} / credit {}",
                entries.debit.amount, entries.credit.amount
            )))
        }
    }

    /// Returns the wallet shortfall check for a withdrawal from a
    /// non-negative account: `Ok` if `balance` covers `amount`.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` with both figures otherwise.
    pub fn check_sufficient(
        balance: MinorUnits,
        amount: MinorUnits,
    ) -> Result<(), LedgerError> {
        if balance >= amount {
            Ok(())
        } else {
            Err(LedgerError::InsufficientFunds {
                balance,
                requested: amount,
            })
        }
    }
}
