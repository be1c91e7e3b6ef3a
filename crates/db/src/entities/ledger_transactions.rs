//! `SeaORM` Entity for the ledger_transactions table.
//!
//! Rows are immutable once created: the write path only ever inserts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::TransactionKind;

/// A logical balance-affecting event with exactly two entries.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "ledger_transactions")]
pub struct Model {
    /// Transaction id (UUID v7, time-ordered).
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Logical kind of the event.
    pub kind: TransactionKind,
    /// The transaction this one reverses; unique per target.
    pub reversal_of: Option<Uuid>,
    /// Idempotency key of the request that created this transaction.
    pub origin_key: Option<String>,
    /// Staff member or admin who performed the operation.
    pub actor_id: Option<Uuid>,
    /// Free-form note or reason supplied by the caller.
    pub note: Option<String>,
    /// Business date the event was posted on.
    pub posted_on: Date,
    /// Creation timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ledger_entries::Entity")]
    Entries,
}

impl Related<super::ledger_entries::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Entries.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
