//! Trial balance computation.
//!
//! The trial balance is the ledger's self-check: across every entry (or
//! every entry up to an as-of date), total debits must equal total
//! credits. It is read-only; a mismatch reports a latent handler bug and
//! is an operator alert, never something to retry or repair automatically.

use chrono::NaiveDate;
use cortado_shared::types::MinorUnits;
use serde::{Deserialize, Serialize};

/// Reconciliation outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialBalanceStatus {
    /// Debits equal credits exactly.
    Ok,
    /// Debits differ from credits; the books are inconsistent.
    Mismatch,
}

/// A computed trial balance for a date (or the whole ledger stamped with
/// the run date).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialBalance {
    /// The as-of date this balance covers.
    pub as_of: NaiveDate,
    /// Sum of all debit amounts.
    pub sum_debit: MinorUnits,
    /// Sum of all credit amounts.
    pub sum_credit: MinorUnits,
    /// `sum_debit - sum_credit`; zero when the ledger balances.
    pub delta: MinorUnits,
    /// Pass/fail status.
    pub status: TrialBalanceStatus,
}

impl TrialBalance {
    /// Builds a trial balance from the two aggregate sums.
    #[must_use]
    pub fn from_sums(as_of: NaiveDate, sum_debit: MinorUnits, sum_credit: MinorUnits) -> Self {
        let delta = MinorUnits::new(sum_debit.value() - sum_credit.value());
        let status = if delta == MinorUnits::ZERO {
            TrialBalanceStatus::Ok
        } else {
            TrialBalanceStatus::Mismatch
        };
        Self {
            as_of,
            sum_debit,
            sum_credit,
            delta,
            status,
        }
    }

    /// Returns true when the books balance.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status == TrialBalanceStatus::Ok
    }
}
