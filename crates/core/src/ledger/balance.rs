//! Account balance sign conventions.

use cortado_shared::types::MinorUnits;
use serde::{Deserialize, Serialize};

use super::types::EntrySide;

/// Balance classes determining how debits and credits move a balance.
///
/// - Asset/Expense: balance += debit - credit (debit-normal)
/// - Liability/Revenue: balance += credit - debit (credit-normal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountClass {
    /// Debit-normal accounts (cash, bonus expense).
    DebitNormal,
    /// Credit-normal accounts (customer funds, revenue).
    CreditNormal,
}

impl AccountClass {
    /// The signed balance change a single entry causes on an account of
    /// this class.
    #[must_use]
    pub const fn balance_change(self, side: EntrySide, amount: MinorUnits) -> MinorUnits {
        match (self, side) {
            (Self::DebitNormal, EntrySide::Debit) | (Self::CreditNormal, EntrySide::Credit) => {
                amount
            }
            (Self::DebitNormal, EntrySide::Credit) | (Self::CreditNormal, EntrySide::Debit) => {
                amount.negate()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debit_normal_changes() {
        let class = AccountClass::DebitNormal;
        assert_eq!(
            class.balance_change(EntrySide::Debit, MinorUnits::new(100)),
            MinorUnits::new(100)
        );
        assert_eq!(
            class.balance_change(EntrySide::Credit, MinorUnits::new(50)),
            MinorUnits::new(-50)
        );
    }

    #[test]
    fn test_credit_normal_changes() {
        let class = AccountClass::CreditNormal;
        assert_eq!(
            class.balance_change(EntrySide::Credit, MinorUnits::new(100)),
            MinorUnits::new(100)
        );
        assert_eq!(
            class.balance_change(EntrySide::Debit, MinorUnits::new(50)),
            MinorUnits::new(-50)
        );
    }
}
