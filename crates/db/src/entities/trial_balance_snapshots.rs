//! `SeaORM` Entity for the trial_balance_snapshots table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SnapshotStatus;

/// Result of a trial balance run for one as-of date.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "trial_balance_snapshots")]
pub struct Model {
    /// Snapshot id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// The as-of date; one snapshot per date, overwritten on re-run.
    pub as_of: Date,
    /// Sum of all debit amounts.
    pub sum_debit_minor: i64,
    /// Sum of all credit amounts.
    pub sum_credit_minor: i64,
    /// `sum_debit - sum_credit`.
    pub delta_minor: i64,
    /// Pass/fail status.
    pub status: SnapshotStatus,
    /// Run timestamp.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
