//! Ledger domain types for posting and reversal.
//!
//! The account set is fixed: a café loyalty wallet needs a cash account,
//! one liability account per customer, a revenue account, and a bonus
//! expense account. There is no configurable chart of accounts.

use cortado_shared::types::{MinorUnits, UserId};
use serde::{Deserialize, Serialize};

use super::balance::AccountClass;

/// Entry side: either Debit or Credit.
///
/// In double-entry bookkeeping:
/// - Debits increase asset/expense accounts, decrease liability/revenue accounts
/// - Credits decrease asset/expense accounts, increase liability/revenue accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit entry.
    Debit,
    /// Credit entry.
    Credit,
}

impl EntrySide {
    /// The other side; a reversal swaps every entry to this.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// Logical transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Customer adds money to the wallet.
    Topup,
    /// Staff charges the wallet at point-of-sale.
    Charge,
    /// Operator grants promotional credit.
    Bonus,
    /// Mirror of a previous transaction with sides swapped.
    Reversal,
}

impl TransactionKind {
    /// Returns true if a transaction of this kind may itself be reversed.
    ///
    /// Reversals cannot be re-reversed; every other kind is reversible
    /// exactly once.
    #[must_use]
    pub const fn is_reversible(self) -> bool {
        !matches!(self, Self::Reversal)
    }
}

/// The fixed set of account codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCode {
    /// Cash/bank asset account (global).
    Cash,
    /// Customer wallet liability account (keyed by user).
    CustomerFunds,
    /// Sales revenue account (global).
    Revenue,
    /// Promotional bonus expense account (global).
    BonusExpense,
}

impl AccountCode {
    /// The balance class governing this account's sign convention.
    #[must_use]
    pub const fn class(self) -> AccountClass {
        match self {
            Self::Cash | Self::BonusExpense => AccountClass::DebitNormal,
            Self::CustomerFunds | Self::Revenue => AccountClass::CreditNormal,
        }
    }

    /// Returns true if balances on this account are kept per customer.
    #[must_use]
    pub const fn is_per_customer(self) -> bool {
        matches!(self, Self::CustomerFunds)
    }

    /// Returns true if this account's balance must never go negative.
    ///
    /// Customer wallets hold money the operator owes the customer; the
    /// ledger refuses any posting that would overdraw one.
    #[must_use]
    pub const fn forbids_negative_balance(self) -> bool {
        self.is_per_customer()
    }
}

impl std::fmt::Display for AccountCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = match self {
            Self::Cash => "cash",
            Self::CustomerFunds => "customer_funds",
            Self::Revenue => "revenue",
            Self::BonusExpense => "bonus_expense",
        };
        write!(f, "{code}")
    }
}

impl std::str::FromStr for AccountCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cash" => Ok(Self::Cash),
            "customer_funds" => Ok(Self::CustomerFunds),
            "revenue" => Ok(Self::Revenue),
            "bonus_expense" => Ok(Self::BonusExpense),
            _ => Err(format!("unknown account code: {s}")),
        }
    }
}

/// A concrete account: a code plus the customer key for per-customer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRef {
    /// The account code.
    pub code: AccountCode,
    /// Customer key; `None` for global accounts.
    pub user_id: Option<UserId>,
}

impl AccountRef {
    /// A global (operator-level) account.
    #[must_use]
    pub const fn global(code: AccountCode) -> Self {
        Self {
            code,
            user_id: None,
        }
    }

    /// A per-customer account.
    #[must_use]
    pub const fn customer(code: AccountCode, user_id: UserId) -> Self {
        Self {
            code,
            user_id: Some(user_id),
        }
    }
}

/// One half of a balanced entry pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySpec {
    /// The account this entry posts to.
    pub account: AccountRef,
    /// Debit or credit.
    pub side: EntrySide,
    /// Positive amount in minor units.
    pub amount: MinorUnits,
}

/// Exactly two entries forming a balanced pair: one debit, one credit,
/// equal amounts. This is the shape every ledger transaction takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPair {
    /// The debit entry.
    pub debit: EntrySpec,
    /// The credit entry.
    pub credit: EntrySpec,
}

impl EntryPair {
    /// Builds a pair debiting one account and crediting another for `amount`.
    #[must_use]
    pub const fn new(
        debit_account: AccountRef,
        credit_account: AccountRef,
        amount: MinorUnits,
    ) -> Self {
        Self {
            debit: EntrySpec {
                account: debit_account,
                side: EntrySide::Debit,
                amount,
            },
            credit: EntrySpec {
                account: credit_account,
                side: EntrySide::Credit,
                amount,
            },
        }
    }

    /// The common amount of both entries.
    #[must_use]
    pub const fn amount(&self) -> MinorUnits {
        self.debit.amount
    }

    /// Both entries, debit first.
    #[must_use]
    pub const fn entries(&self) -> [EntrySpec; 2] {
        [self.debit, self.credit]
    }

    /// Returns true if the pair satisfies the double-entry invariant:
    /// sides are correct and the amounts are equal and positive.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit.side == EntrySide::Debit
            && self.credit.side == EntrySide::Credit
            && self.debit.amount == self.credit.amount
            && self.debit.amount.is_positive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_reversibility() {
        assert!(TransactionKind::Topup.is_reversible());
        assert!(TransactionKind::Charge.is_reversible());
        assert!(TransactionKind::Bonus.is_reversible());
        assert!(!TransactionKind::Reversal.is_reversible());
    }

    #[test]
    fn test_account_classes() {
        assert_eq!(AccountCode::Cash.class(), AccountClass::DebitNormal);
        assert_eq!(AccountCode::BonusExpense.class(), AccountClass::DebitNormal);
        assert_eq!(AccountCode::CustomerFunds.class(), AccountClass::CreditNormal);
        assert_eq!(AccountCode::Revenue.class(), AccountClass::CreditNormal);
    }

    #[test]
    fn test_only_customer_funds_is_keyed() {
        assert!(AccountCode::CustomerFunds.is_per_customer());
        assert!(!AccountCode::Cash.is_per_customer());
        assert!(!AccountCode::Revenue.is_per_customer());
        assert!(!AccountCode::BonusExpense.is_per_customer());
    }

    #[test]
    fn test_account_code_roundtrip() {
        for code in [
            AccountCode::Cash,
            AccountCode::CustomerFunds,
            AccountCode::Revenue,
            AccountCode::BonusExpense,
        ] {
            assert_eq!(code.to_string().parse::<AccountCode>().unwrap(), code);
        }
        assert!("petty_cash".parse::<AccountCode>().is_err());
    }

    #[test]
    fn test_entry_pair_balanced() {
        let user = UserId::new();
        let pair = EntryPair::new(
            AccountRef::global(AccountCode::Cash),
            AccountRef::customer(AccountCode::CustomerFunds, user),
            MinorUnits::new(1000),
        );
        assert!(pair.is_balanced());
        assert_eq!(pair.amount(), MinorUnits::new(1000));
    }

    #[test]
    fn test_entry_pair_zero_amount_is_unbalanced() {
        let pair = EntryPair::new(
            AccountRef::global(AccountCode::Cash),
            AccountRef::global(AccountCode::Revenue),
            MinorUnits::ZERO,
        );
        assert!(!pair.is_balanced());
    }
}
