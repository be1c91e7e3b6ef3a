//! `SeaORM` Entity for the account_balances table.
//!
//! A materialized view over the entry log, updated in the same database
//! transaction that inserts an entry pair. It can always be rebuilt by
//! replaying entries.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AccountCode;

/// Cached running balance for one (account code, customer) pair.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "account_balances")]
pub struct Model {
    /// Row id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Account code.
    pub account_code: AccountCode,
    /// Customer key; NULL for the seeded global rows.
    pub user_id: Option<Uuid>,
    /// Net balance in minor units; never negative for customer rows.
    pub balance_minor: i64,
    /// Timestamp of the last entry that moved this balance.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
