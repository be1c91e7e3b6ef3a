//! `SeaORM` Entity for the ledger_entries table.
//!
//! Exactly two rows exist per transaction, one debit and one credit with
//! equal positive amounts. Rows are immutable once created.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{AccountCode, EntrySide};

/// One half of a transaction's balanced entry pair.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_entries")]
pub struct Model {
    /// Entry id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Owning transaction.
    pub transaction_id: Uuid,
    /// Account this entry posts to.
    pub account_code: AccountCode,
    /// Customer key for per-customer accounts; NULL for global accounts.
    pub user_id: Option<Uuid>,
    /// Debit or credit.
    pub side: EntrySide,
    /// Positive amount in minor currency units.
    pub amount_minor: i64,
    /// Business date, copied from the owning transaction.
    pub entry_date: Date,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ledger_transactions::Entity",
        from = "Column::TransactionId",
        to = "super::ledger_transactions::Column::Id"
    )]
    Transaction,
}

impl Related<super::ledger_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
