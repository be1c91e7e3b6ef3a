//! Initial database migration.
//!
//! Creates the ledger tables and the two constraints the concurrency model
//! leans on: the unique index on `reversal_of` (at most one reversal per
//! transaction) and the non-negativity CHECK on customer balance rows.
//! Also seeds the three global account balance rows, which are only ever
//! updated at runtime, never inserted.

use chrono::Utc;
use sea_orm_migration::prelude::*;
use uuid::Uuid;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LedgerTransactions::Table)
                    .col(
                        ColumnDef::new(LedgerTransactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::Kind)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::ReversalOf).uuid().null())
                    .col(
                        ColumnDef::new(LedgerTransactions::OriginKey)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(LedgerTransactions::ActorId).uuid().null())
                    .col(ColumnDef::new(LedgerTransactions::Note).string().null())
                    .col(
                        ColumnDef::new(LedgerTransactions::PostedOn)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerTransactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_transactions_reversal_of")
                            .from(LedgerTransactions::Table, LedgerTransactions::ReversalOf)
                            .to(LedgerTransactions::Table, LedgerTransactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one reversal may reference a given transaction. This is
        // the arbiter between two concurrent reversal attempts.
        manager
            .create_index(
                Index::create()
                    .name("uq_ledger_transactions_reversal_of")
                    .table(LedgerTransactions::Table)
                    .col(LedgerTransactions::ReversalOf)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LedgerEntries::Table)
                    .col(
                        ColumnDef::new(LedgerEntries::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::TransactionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LedgerEntries::AccountCode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(LedgerEntries::UserId).uuid().null())
                    .col(ColumnDef::new(LedgerEntries::Side).string_len(8).not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::AmountMinor)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(LedgerEntries::AmountMinor).gt(0)),
                    )
                    .col(ColumnDef::new(LedgerEntries::EntryDate).date().not_null())
                    .col(
                        ColumnDef::new(LedgerEntries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ledger_entries_transaction_id")
                            .from(LedgerEntries::Table, LedgerEntries::TransactionId)
                            .to(LedgerTransactions::Table, LedgerTransactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_ledger_entries_transaction_id")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::TransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_ledger_entries_user_id")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_ledger_entries_entry_date")
                    .table(LedgerEntries::Table)
                    .col(LedgerEntries::EntryDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AccountBalances::Table)
                    .col(
                        ColumnDef::new(AccountBalances::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountBalances::AccountCode)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(AccountBalances::UserId).uuid().null())
                    .col(
                        ColumnDef::new(AccountBalances::BalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0)
                            // Customer wallets may never go negative; the
                            // global rows (NULL user) are unconstrained.
                            .check(
                                Expr::col(AccountBalances::UserId)
                                    .is_null()
                                    .or(Expr::col(AccountBalances::BalanceMinor).gte(0)),
                            ),
                    )
                    .col(
                        ColumnDef::new(AccountBalances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_account_balances_code_user")
                    .table(AccountBalances::Table)
                    .col(AccountBalances::AccountCode)
                    .col(AccountBalances::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(IdempotencyKeys::Table)
                    .col(
                        ColumnDef::new(IdempotencyKeys::Key)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(IdempotencyKeys::RequestHash)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdempotencyKeys::TransactionId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(IdempotencyKeys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_idempotency_keys_transaction_id")
                            .from(IdempotencyKeys::Table, IdempotencyKeys::TransactionId)
                            .to(LedgerTransactions::Table, LedgerTransactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TrialBalanceSnapshots::Table)
                    .col(
                        ColumnDef::new(TrialBalanceSnapshots::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TrialBalanceSnapshots::AsOf)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrialBalanceSnapshots::SumDebitMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrialBalanceSnapshots::SumCreditMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrialBalanceSnapshots::DeltaMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrialBalanceSnapshots::Status)
                            .string_len(8)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrialBalanceSnapshots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_trial_balance_snapshots_as_of")
                    .table(TrialBalanceSnapshots::Table)
                    .col(TrialBalanceSnapshots::AsOf)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Seed the global balance rows. Runtime code only ever updates
        // these; inserting them here keeps the nullable user_id out of the
        // runtime upsert path (NULLs compare distinct in unique indexes).
        let now = Utc::now().fixed_offset();
        let mut seed = Query::insert()
            .into_table(AccountBalances::Table)
            .columns([
                AccountBalances::Id,
                AccountBalances::AccountCode,
                AccountBalances::UserId,
                AccountBalances::BalanceMinor,
                AccountBalances::UpdatedAt,
            ])
            .to_owned();
        for code in ["cash", "revenue", "bonus_expense"] {
            seed.values_panic([
                Uuid::new_v4().into(),
                code.into(),
                Option::<Uuid>::None.into(),
                0i64.into(),
                now.into(),
            ]);
        }
        manager.exec_stmt(seed).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(TrialBalanceSnapshots::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(IdempotencyKeys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AccountBalances::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LedgerTransactions::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum LedgerTransactions {
    Table,
    Id,
    Kind,
    ReversalOf,
    OriginKey,
    ActorId,
    Note,
    PostedOn,
    CreatedAt,
}

#[derive(DeriveIden)]
enum LedgerEntries {
    Table,
    Id,
    TransactionId,
    AccountCode,
    UserId,
    Side,
    AmountMinor,
    EntryDate,
    CreatedAt,
}

#[derive(DeriveIden)]
enum AccountBalances {
    Table,
    Id,
    AccountCode,
    UserId,
    BalanceMinor,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum IdempotencyKeys {
    Table,
    Key,
    RequestHash,
    TransactionId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum TrialBalanceSnapshots {
    Table,
    Id,
    AsOf,
    SumDebitMinor,
    SumCreditMinor,
    DeltaMinor,
    Status,
    CreatedAt,
}
