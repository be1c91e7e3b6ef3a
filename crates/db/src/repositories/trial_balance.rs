//! Trial balance repository.
//!
//! Runs the reconciliation check (sum of debits vs sum of credits) inside
//! a single read transaction so the two aggregates come from one
//! consistent snapshot, persists the day's snapshot row, and offers the
//! balance-cache rebuild used by the dev maintenance endpoint.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::{Alias, Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionTrait,
};
use tracing::{error, info};
use uuid::Uuid;

use cortado_core::ledger::{AccountCode, LedgerError};
use cortado_core::reconcile::{TrialBalance, TrialBalanceStatus};
use cortado_shared::types::MinorUnits;

use crate::entities::{account_balances, ledger_entries, sea_orm_active_enums as enums};
use crate::entities::trial_balance_snapshots;

/// Trial balance repository.
#[derive(Debug, Clone)]
pub struct TrialBalanceRepository {
    db: DatabaseConnection,
}

impl TrialBalanceRepository {
    /// Creates a new trial balance repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Runs the trial balance and overwrites the day's snapshot.
    ///
    /// With `as_of` set, only entries dated on or before it are summed;
    /// without it, the whole ledger is summed and the snapshot is stamped
    /// with the current date. The check itself is read-only and never
    /// blocks writers; a mismatch is logged as an operator alert.
    pub async fn run(&self, as_of: Option<NaiveDate>) -> Result<TrialBalance, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db)?;
        let sum_debit = sum_side(&txn, enums::EntrySide::Debit, as_of).await?;
        let sum_credit = sum_side(&txn, enums::EntrySide::Credit, as_of).await?;
        txn.commit().await.map_err(map_db)?;

        let stamped = as_of.unwrap_or_else(|| Utc::now().date_naive());
        let result = TrialBalance::from_sums(stamped, sum_debit, sum_credit);

        if result.is_ok() {
            info!(as_of = %result.as_of, sum_debit = result.sum_debit.value(), "trial balance ok");
        } else {
            error!(
                as_of = %result.as_of,
                sum_debit = result.sum_debit.value(),
                sum_credit = result.sum_credit.value(),
                delta = result.delta.value(),
                "TRIAL BALANCE MISMATCH - ledger is internally inconsistent"
            );
        }

        self.store_snapshot(&result).await?;
        Ok(result)
    }

    /// Returns the stored snapshot for a date, if one exists.
    pub async fn snapshot_for(
        &self,
        as_of: NaiveDate,
    ) -> Result<Option<trial_balance_snapshots::Model>, LedgerError> {
        trial_balance_snapshots::Entity::find()
            .filter(trial_balance_snapshots::Column::AsOf.eq(as_of))
            .one(&self.db)
            .await
            .map_err(map_db)
    }

    /// Recomputes every cached balance from the entry log.
    ///
    /// The cache is derived data; this replays the entries into fresh
    /// rows inside one transaction and returns how many rows were written.
    /// The three global rows are always rewritten, even with no entries.
    pub async fn rebuild_balances(&self) -> Result<u64, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db)?;

        let sums: Vec<(enums::AccountCode, Option<Uuid>, enums::EntrySide, Option<i64>)> =
            ledger_entries::Entity::find()
                .select_only()
                .column(ledger_entries::Column::AccountCode)
                .column(ledger_entries::Column::UserId)
                .column(ledger_entries::Column::Side)
                .column_as(
                    Expr::col(ledger_entries::Column::AmountMinor)
                        .sum()
                        .cast_as(Alias::new("BIGINT")),
                    "total",
                )
                .group_by(ledger_entries::Column::AccountCode)
                .group_by(ledger_entries::Column::UserId)
                .group_by(ledger_entries::Column::Side)
                .into_tuple()
                .all(&txn)
                .await
                .map_err(map_db)?;

        let mut balances: HashMap<(AccountCode, Option<Uuid>), i64> = HashMap::new();
        for code in [AccountCode::Cash, AccountCode::Revenue, AccountCode::BonusExpense] {
            balances.insert((code, None), 0);
        }
        for (code, user_id, side, total) in sums {
            let code: AccountCode = code.into();
            let change = code
                .class()
                .balance_change(side.into(), MinorUnits::new(total.unwrap_or(0)));
            *balances.entry((code, user_id)).or_insert(0) += change.value();
        }

        account_balances::Entity::delete_many()
            .exec(&txn)
            .await
            .map_err(map_db)?;

        let now = Utc::now().fixed_offset();
        let count = balances.len() as u64;
        for ((code, user_id), balance_minor) in balances {
            account_balances::ActiveModel {
                id: Set(Uuid::now_v7()),
                account_code: Set(code.into()),
                user_id: Set(user_id),
                balance_minor: Set(balance_minor),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(map_db)?;
        }

        txn.commit().await.map_err(map_db)?;
        info!(rows = count, "rebuilt account balances from the entry log");
        Ok(count)
    }

    /// Upserts the snapshot row for the result's as-of date.
    async fn store_snapshot(&self, result: &TrialBalance) -> Result<(), LedgerError> {
        let status = match result.status {
            TrialBalanceStatus::Ok => enums::SnapshotStatus::Ok,
            TrialBalanceStatus::Mismatch => enums::SnapshotStatus::Mismatch,
        };

        trial_balance_snapshots::Entity::insert(trial_balance_snapshots::ActiveModel {
            id: Set(Uuid::now_v7()),
            as_of: Set(result.as_of),
            sum_debit_minor: Set(result.sum_debit.value()),
            sum_credit_minor: Set(result.sum_credit.value()),
            delta_minor: Set(result.delta.value()),
            status: Set(status),
            created_at: Set(Utc::now().fixed_offset()),
        })
        .on_conflict(
            OnConflict::column(trial_balance_snapshots::Column::AsOf)
                .update_columns([
                    trial_balance_snapshots::Column::SumDebitMinor,
                    trial_balance_snapshots::Column::SumCreditMinor,
                    trial_balance_snapshots::Column::DeltaMinor,
                    trial_balance_snapshots::Column::Status,
                    trial_balance_snapshots::Column::CreatedAt,
                ])
                .to_owned(),
        )
        .exec(&self.db)
        .await
        .map_err(map_db)?;

        Ok(())
    }
}

/// Sums one side's entry amounts, optionally up to an as-of date.
async fn sum_side<C: ConnectionTrait>(
    conn: &C,
    side: enums::EntrySide,
    as_of: Option<NaiveDate>,
) -> Result<MinorUnits, LedgerError> {
    let mut query = ledger_entries::Entity::find()
        .select_only()
        .column_as(
            Expr::col(ledger_entries::Column::AmountMinor)
                .sum()
                .cast_as(Alias::new("BIGINT")),
            "total",
        )
        .filter(ledger_entries::Column::Side.eq(side));

    if let Some(date) = as_of {
        query = query.filter(ledger_entries::Column::EntryDate.lte(date));
    }

    let total: Option<Option<i64>> = query
        .into_tuple()
        .one(conn)
        .await
        .map_err(map_db)?;

    Ok(MinorUnits::new(total.flatten().unwrap_or(0)))
}

fn map_db(err: DbErr) -> LedgerError {
    LedgerError::Database(err.to_string())
}
