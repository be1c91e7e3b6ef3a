//! String-backed active enums shared by the entity definitions.
//!
//! Stored as short strings rather than native database enums so the same
//! migration runs on PostgreSQL and on the SQLite test backend. Conversions
//! to and from the core domain enums live here so repositories never match
//! on raw strings.

use cortado_core::ledger;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Logical transaction kind.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Customer adds money to the wallet.
    #[sea_orm(string_value = "topup")]
    Topup,
    /// Staff charges the wallet at point-of-sale.
    #[sea_orm(string_value = "charge")]
    Charge,
    /// Operator grants promotional credit.
    #[sea_orm(string_value = "bonus")]
    Bonus,
    /// Mirror of a previous transaction with sides swapped.
    #[sea_orm(string_value = "reversal")]
    Reversal,
}

/// Entry side.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum EntrySide {
    /// Debit entry.
    #[sea_orm(string_value = "debit")]
    Debit,
    /// Credit entry.
    #[sea_orm(string_value = "credit")]
    Credit,
}

/// The fixed set of account codes.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum AccountCode {
    /// Cash/bank asset account (global).
    #[sea_orm(string_value = "cash")]
    Cash,
    /// Customer wallet liability account (keyed by user).
    #[sea_orm(string_value = "customer_funds")]
    CustomerFunds,
    /// Sales revenue account (global).
    #[sea_orm(string_value = "revenue")]
    Revenue,
    /// Promotional bonus expense account (global).
    #[sea_orm(string_value = "bonus_expense")]
    BonusExpense,
}

/// Trial balance snapshot status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum SnapshotStatus {
    /// Debits equal credits exactly.
    #[sea_orm(string_value = "ok")]
    Ok,
    /// Debits differ from credits.
    #[sea_orm(string_value = "mismatch")]
    Mismatch,
}

impl From<ledger::TransactionKind> for TransactionKind {
    fn from(kind: ledger::TransactionKind) -> Self {
        match kind {
            ledger::TransactionKind::Topup => Self::Topup,
            ledger::TransactionKind::Charge => Self::Charge,
            ledger::TransactionKind::Bonus => Self::Bonus,
            ledger::TransactionKind::Reversal => Self::Reversal,
        }
    }
}

impl From<TransactionKind> for ledger::TransactionKind {
    fn from(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::Topup => Self::Topup,
            TransactionKind::Charge => Self::Charge,
            TransactionKind::Bonus => Self::Bonus,
            TransactionKind::Reversal => Self::Reversal,
        }
    }
}

impl From<ledger::EntrySide> for EntrySide {
    fn from(side: ledger::EntrySide) -> Self {
        match side {
            ledger::EntrySide::Debit => Self::Debit,
            ledger::EntrySide::Credit => Self::Credit,
        }
    }
}

impl From<EntrySide> for ledger::EntrySide {
    fn from(side: EntrySide) -> Self {
        match side {
            EntrySide::Debit => Self::Debit,
            EntrySide::Credit => Self::Credit,
        }
    }
}

impl From<ledger::AccountCode> for AccountCode {
    fn from(code: ledger::AccountCode) -> Self {
        match code {
            ledger::AccountCode::Cash => Self::Cash,
            ledger::AccountCode::CustomerFunds => Self::CustomerFunds,
            ledger::AccountCode::Revenue => Self::Revenue,
            ledger::AccountCode::BonusExpense => Self::BonusExpense,
        }
    }
}

impl From<AccountCode> for ledger::AccountCode {
    fn from(code: AccountCode) -> Self {
        match code {
            AccountCode::Cash => Self::Cash,
            AccountCode::CustomerFunds => Self::CustomerFunds,
            AccountCode::Revenue => Self::Revenue,
            AccountCode::BonusExpense => Self::BonusExpense,
        }
    }
}
