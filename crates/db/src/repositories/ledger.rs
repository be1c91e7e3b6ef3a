//! Ledger repository: the only write path into the ledger tables.
//!
//! Every money-moving operation runs inside a single database transaction:
//! idempotency check, precondition checks, transaction + entry inserts,
//! atomic balance updates, and the idempotency record, committed together
//! or not at all. Concurrency correctness rests on two storage constraints
//! rather than in-process locks: the unique index on `reversal_of` and the
//! non-negativity CHECK on customer balance rows.

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, SqlErr, TransactionTrait,
};
use tracing::{info, warn};
use uuid::Uuid;

use cortado_core::idempotency::IdempotentRequest;
use cortado_core::ledger::{
    AccountRef, BalanceDelta, EntryPair, EntrySide, EntrySpec, LedgerError,
    OriginalTransaction, PostingPlan, PostingService, ReversalService, TransactionKind,
};
use cortado_shared::types::{MinorUnits, TransactionId, UserId};

use crate::entities::{
    account_balances, idempotency_keys, ledger_entries, ledger_transactions,
    sea_orm_active_enums as enums,
};

/// A money-moving operation to post against a customer wallet.
#[derive(Debug, Clone)]
pub struct OperationInput {
    /// Topup, charge, or bonus.
    pub kind: TransactionKind,
    /// The customer whose wallet is affected.
    pub user_id: UserId,
    /// Positive amount in minor units.
    pub amount: MinorUnits,
    /// Optional note or reason.
    pub note: Option<String>,
    /// Staff member or admin performing the operation.
    pub actor_id: Option<Uuid>,
    /// Idempotency key and request fingerprint.
    pub idempotency: IdempotentRequest,
}

/// A reversal request for an existing transaction.
#[derive(Debug, Clone)]
pub struct ReversalInput {
    /// The transaction to reverse.
    pub target: TransactionId,
    /// Staff member or admin performing the reversal.
    pub actor_id: Option<Uuid>,
    /// Idempotency key and request fingerprint.
    pub idempotency: IdempotentRequest,
}

/// Outcome of a posted (or replayed) operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostReceipt {
    /// The transaction the operation produced (or produced earlier, when
    /// replayed).
    pub transaction_id: TransactionId,
    /// True when an idempotent replay returned a stored result instead of
    /// executing.
    pub replayed: bool,
}

/// A transaction together with its entry pair.
#[derive(Debug, Clone)]
pub struct TransactionWithEntries {
    /// Transaction header.
    pub transaction: ledger_transactions::Model,
    /// The two entries, debit first.
    pub entries: Vec<ledger_entries::Model>,
}

/// Cached wallet balance for one customer.
#[derive(Debug, Clone, Copy)]
pub struct BalanceView {
    /// Net balance in minor units; zero for customers with no history.
    pub balance: MinorUnits,
    /// Timestamp of the last entry that moved the balance, if any.
    pub updated_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// Ledger repository for posting and reading operations.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Posts a topup, charge, or bonus as one atomic unit.
    ///
    /// # Errors
    ///
    /// - `VALIDATION_FAILED` for bad input or idempotency key misuse
    /// - `INSUFFICIENT_FUNDS` when a charge exceeds the wallet balance
    /// - `DATABASE_ERROR` on storage failure
    pub async fn post_operation(&self, input: OperationInput) -> Result<PostReceipt, LedgerError> {
        let plan = PostingService::plan(input.kind, input.user_id, input.amount)?;
        PostingService::verify_pair(&plan.entries)?;

        let txn = self.db.begin().await.map_err(map_db)?;

        if let Some(record) = find_key(&txn, &input.idempotency.key).await? {
            txn.rollback().await.ok();
            return replay(&record, &input.idempotency);
        }

        // Application-level pre-check; the CHECK constraint is the backstop
        // under concurrency.
        if input.kind == TransactionKind::Charge {
            let balance = wallet_balance(&txn, input.user_id).await?;
            PostingService::check_sufficient(balance, input.amount)?;
        }

        let header = TransactionHeader {
            kind: input.kind,
            reversal_of: None,
            origin_key: Some(input.idempotency.key.clone()),
            actor_id: input.actor_id,
            note: input.note.clone(),
        };
        let receipt = self
            .commit_posting(txn, header, &plan, &input.idempotency)
            .await;

        match receipt {
            Err(err) if is_check_violation(&err) => {
                Err(self.insufficient(input.user_id, input.amount).await)
            }
            other => other,
        }
    }

    /// Reverses an existing transaction as one atomic unit.
    ///
    /// # Errors
    ///
    /// - `TX_NOT_FOUND` when the target does not exist
    /// - `REVERSAL_FORBIDDEN_TYPE` when the target is itself a reversal
    /// - `REVERSAL_ALREADY_EXISTS` when the target was already reversed
    /// - `INSUFFICIENT_FUNDS` when undoing a topup the customer has spent
    pub async fn post_reversal(&self, input: ReversalInput) -> Result<PostReceipt, LedgerError> {
        let txn = self.db.begin().await.map_err(map_db)?;

        if let Some(record) = find_key(&txn, &input.idempotency.key).await? {
            txn.rollback().await.ok();
            return replay(&record, &input.idempotency);
        }

        let original = ledger_transactions::Entity::find_by_id(input.target.into_inner())
            .one(&txn)
            .await
            .map_err(map_db)?
            .ok_or(LedgerError::TransactionNotFound(input.target))?;

        let pair = load_entry_pair(&txn, input.target).await?;
        let mirrored = ReversalService::plan(&OriginalTransaction {
            id: input.target,
            kind: original.kind.clone().into(),
            entries: pair,
        })?;

        // Pre-check for a clean error; the unique index on reversal_of is
        // the arbiter when two attempts race.
        let already = ledger_transactions::Entity::find()
            .filter(ledger_transactions::Column::ReversalOf.eq(input.target.into_inner()))
            .count(&txn)
            .await
            .map_err(map_db)?;
        if already > 0 {
            txn.rollback().await.ok();
            return Err(LedgerError::ReversalAlreadyExists(input.target));
        }

        // Undoing a topup debits the wallet; refuse if that would overdraw.
        let debited_wallet = wallet_debit(&mirrored);
        if let Some((user, amount)) = debited_wallet {
            let balance = wallet_balance(&txn, user).await?;
            PostingService::check_sufficient(balance, amount)?;
        }

        let plan = PostingPlan {
            kind: TransactionKind::Reversal,
            entries: mirrored,
        };
        let header = TransactionHeader {
            kind: TransactionKind::Reversal,
            reversal_of: Some(input.target),
            origin_key: Some(input.idempotency.key.clone()),
            actor_id: input.actor_id,
            note: original.note.clone(),
        };
        let receipt = self
            .commit_posting(txn, header, &plan, &input.idempotency)
            .await;

        match receipt {
            Err(err) if is_unique_violation_on(&err, "reversal_of") => {
                // Lost the race against a concurrent reversal attempt.
                Err(LedgerError::ReversalAlreadyExists(input.target))
            }
            Err(err) if is_check_violation(&err) => match debited_wallet {
                Some((user, amount)) => Err(self.insufficient(user, amount).await),
                None => Err(err),
            },
            other => other,
        }
    }

    /// Current wallet balance for a customer.
    pub async fn get_balance(&self, user_id: UserId) -> Result<BalanceView, LedgerError> {
        let row = account_balances::Entity::find()
            .filter(account_balances::Column::AccountCode.eq(enums::AccountCode::CustomerFunds))
            .filter(account_balances::Column::UserId.eq(user_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(map_db)?;

        Ok(row.map_or(
            BalanceView {
                balance: MinorUnits::ZERO,
                updated_at: None,
            },
            |r| BalanceView {
                balance: MinorUnits::new(r.balance_minor),
                updated_at: Some(r.updated_at),
            },
        ))
    }

    /// Fetches a transaction with its entry pair.
    ///
    /// # Errors
    ///
    /// `TX_NOT_FOUND` if absent; `LEDGER_INVARIANT_BROKEN` if the stored
    /// entry count is not exactly two.
    pub async fn get_transaction(
        &self,
        id: TransactionId,
    ) -> Result<TransactionWithEntries, LedgerError> {
        let transaction = ledger_transactions::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(map_db)?
            .ok_or(LedgerError::TransactionNotFound(id))?;

        let entries = entries_of(&self.db, id).await?;
        if entries.len() != 2 {
            return Err(LedgerError::InvariantBroken(format!(
                "transaction {id} has {} entries on record, expected 2",
                entries.len()
            )));
        }

        Ok(TransactionWithEntries {
            transaction,
            entries,
        })
    }

    /// Lists transactions newest-first, optionally restricted to one
    /// customer's wallet, fetching one row past `limit` so the caller can
    /// tell whether more pages exist.
    pub async fn list_transactions(
        &self,
        user_id: Option<UserId>,
        limit: u64,
        cursor: Option<Uuid>,
    ) -> Result<Vec<ledger_transactions::Model>, LedgerError> {
        let mut query = ledger_transactions::Entity::find();

        if let Some(user) = user_id {
            query = query
                .join(
                    JoinType::InnerJoin,
                    ledger_transactions::Relation::Entries.def(),
                )
                .filter(ledger_entries::Column::UserId.eq(user.into_inner()))
                .distinct();
        }

        if let Some(before) = cursor {
            query = query.filter(ledger_transactions::Column::Id.lt(before));
        }

        // UUID v7 ids are time-ordered, so id descending is newest-first.
        query
            .order_by_desc(ledger_transactions::Column::Id)
            .limit(limit + 1)
            .all(&self.db)
            .await
            .map_err(map_db)
    }

    /// Inserts header, entries, balance deltas, and the idempotency record,
    /// then commits. Consumes the transaction; any error rolls back.
    async fn commit_posting(
        &self,
        txn: DatabaseTransaction,
        header: TransactionHeader,
        plan: &PostingPlan,
        idempotency: &IdempotentRequest,
    ) -> Result<PostReceipt, LedgerError> {
        let now = Utc::now().fixed_offset();
        let posted_on = now.date_naive();
        let tx_id = TransactionId::new();

        ledger_transactions::ActiveModel {
            id: Set(tx_id.into_inner()),
            kind: Set(header.kind.into()),
            reversal_of: Set(header.reversal_of.map(TransactionId::into_inner)),
            origin_key: Set(header.origin_key),
            actor_id: Set(header.actor_id),
            note: Set(header.note),
            posted_on: Set(posted_on),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(map_db)?;

        for entry in plan.entries.entries() {
            ledger_entries::ActiveModel {
                id: Set(Uuid::now_v7()),
                transaction_id: Set(tx_id.into_inner()),
                account_code: Set(entry.account.code.into()),
                user_id: Set(entry.account.user_id.map(UserId::into_inner)),
                side: Set(entry.side.into()),
                amount_minor: Set(entry.amount.value()),
                entry_date: Set(posted_on),
                created_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(map_db)?;
        }

        for delta in plan.balance_deltas() {
            apply_delta(&txn, delta, now).await?;
        }

        let key_insert = idempotency_keys::ActiveModel {
            key: Set(idempotency.key.clone()),
            request_hash: Set(idempotency.fingerprint.clone()),
            transaction_id: Set(tx_id.into_inner()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await;

        if let Err(err) = key_insert {
            let lost_key_race = matches!(
                err.sql_err(),
                Some(SqlErr::UniqueConstraintViolation(ref msg)) if msg.contains("idempotency")
            );
            txn.rollback().await.ok();
            if lost_key_race {
                // A concurrent retry with the same key won; serve its result.
                let record = idempotency_keys::Entity::find_by_id(idempotency.key.clone())
                    .one(&self.db)
                    .await
                    .map_err(map_db)?
                    .ok_or_else(|| {
                        LedgerError::Database(
                            "idempotency record vanished after key conflict".to_string(),
                        )
                    })?;
                return replay(&record, idempotency);
            }
            return Err(map_db(err));
        }

        txn.commit().await.map_err(map_db)?;
        info!(
            transaction_id = %tx_id,
            kind = ?plan.kind,
            amount_minor = plan.entries.amount().value(),
            "posted ledger transaction"
        );

        Ok(PostReceipt {
            transaction_id: tx_id,
            replayed: false,
        })
    }

    /// Builds an accurate `INSUFFICIENT_FUNDS` error after the CHECK
    /// constraint caught a race the pre-check could not see.
    async fn insufficient(&self, user_id: UserId, requested: MinorUnits) -> LedgerError {
        let balance = self
            .get_balance(user_id)
            .await
            .map_or(MinorUnits::ZERO, |view| view.balance);
        LedgerError::InsufficientFunds { balance, requested }
    }
}

/// Header fields of a transaction row about to be inserted.
struct TransactionHeader {
    kind: TransactionKind,
    reversal_of: Option<TransactionId>,
    origin_key: Option<String>,
    actor_id: Option<Uuid>,
    note: Option<String>,
}

/// Applies one signed balance delta atomically.
///
/// Global rows are seeded by the migration and only updated; customer rows
/// are upserted so two first-ever postings for the same wallet cannot
/// collide. Both paths express the increment in SQL (`balance = balance +
/// delta`), so concurrent writers serialize on the row instead of losing
/// updates, and the CHECK constraint rejects a negative customer balance
/// at the moment of the write.
async fn apply_delta<C: ConnectionTrait>(
    conn: &C,
    delta: BalanceDelta,
    now: chrono::DateTime<chrono::FixedOffset>,
) -> Result<(), LedgerError> {
    let code: enums::AccountCode = delta.account.code.into();

    match delta.account.user_id {
        None => {
            let result = account_balances::Entity::update_many()
                .col_expr(
                    account_balances::Column::BalanceMinor,
                    Expr::col(account_balances::Column::BalanceMinor).add(delta.change.value()),
                )
                .col_expr(account_balances::Column::UpdatedAt, Expr::value(now))
                .filter(account_balances::Column::AccountCode.eq(code))
                .filter(account_balances::Column::UserId.is_null())
                .exec(conn)
                .await
                .map_err(map_db)?;

            if result.rows_affected == 0 {
                return Err(LedgerError::InvariantBroken(format!(
                    "seeded global balance row missing for account {}",
                    delta.account.code
                )));
            }
            Ok(())
        }
        Some(user) => {
            account_balances::Entity::insert(account_balances::ActiveModel {
                id: Set(Uuid::now_v7()),
                account_code: Set(code),
                user_id: Set(Some(user.into_inner())),
                balance_minor: Set(delta.change.value()),
                updated_at: Set(now),
            })
            .on_conflict(
                OnConflict::columns([
                    account_balances::Column::AccountCode,
                    account_balances::Column::UserId,
                ])
                .value(
                    account_balances::Column::BalanceMinor,
                    Expr::col((
                        account_balances::Entity,
                        account_balances::Column::BalanceMinor,
                    ))
                    .add(delta.change.value()),
                )
                .value(account_balances::Column::UpdatedAt, Expr::value(now))
                .to_owned(),
            )
            .exec(conn)
            .await
            .map_err(map_db)?;
            Ok(())
        }
    }
}

/// Looks up an idempotency record inside the operation's transaction.
async fn find_key<C: ConnectionTrait>(
    conn: &C,
    key: &str,
) -> Result<Option<idempotency_keys::Model>, LedgerError> {
    idempotency_keys::Entity::find_by_id(key.to_string())
        .one(conn)
        .await
        .map_err(map_db)
}

/// Resolves a found idempotency record: replay on a matching fingerprint,
/// reject key reuse with a different body.
fn replay(
    record: &idempotency_keys::Model,
    request: &IdempotentRequest,
) -> Result<PostReceipt, LedgerError> {
    if record.request_hash == request.fingerprint {
        info!(key = %record.key, transaction_id = %record.transaction_id, "idempotent replay");
        Ok(PostReceipt {
            transaction_id: TransactionId::from_uuid(record.transaction_id),
            replayed: true,
        })
    } else {
        warn!(key = %record.key, "idempotency key reused with a different request body");
        Err(LedgerError::Validation(format!(
            "idempotency key {} was already used with a different request body",
            record.key
        )))
    }
}

/// Reads the cached wallet balance inside the operation's transaction.
async fn wallet_balance<C: ConnectionTrait>(
    conn: &C,
    user_id: UserId,
) -> Result<MinorUnits, LedgerError> {
    let row = account_balances::Entity::find()
        .filter(account_balances::Column::AccountCode.eq(enums::AccountCode::CustomerFunds))
        .filter(account_balances::Column::UserId.eq(user_id.into_inner()))
        .one(conn)
        .await
        .map_err(map_db)?;

    Ok(MinorUnits::new(row.map_or(0, |r| r.balance_minor)))
}

/// Loads a transaction's two entries and reconstructs the domain pair.
async fn load_entry_pair<C: ConnectionTrait>(
    conn: &C,
    id: TransactionId,
) -> Result<EntryPair, LedgerError> {
    let models = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::TransactionId.eq(id.into_inner()))
        .all(conn)
        .await
        .map_err(map_db)?;

    let mut debit = None;
    let mut credit = None;
    for model in &models {
        let spec = EntrySpec {
            account: AccountRef {
                code: model.account_code.clone().into(),
                user_id: model.user_id.map(UserId::from_uuid),
            },
            side: model.side.clone().into(),
            amount: MinorUnits::new(model.amount_minor),
        };
        match spec.side {
            EntrySide::Debit => debit = Some(spec),
            EntrySide::Credit => credit = Some(spec),
        }
    }

    match (models.len(), debit, credit) {
        (2, Some(debit), Some(credit)) => Ok(EntryPair { debit, credit }),
        (count, _, _) => Err(LedgerError::InvariantBroken(format!(
            "transaction {id} has {count} entries on record, expected one debit and one credit"
        ))),
    }
}

/// Fetches a transaction's entries, debit first.
async fn entries_of<C: ConnectionTrait>(
    conn: &C,
    id: TransactionId,
) -> Result<Vec<ledger_entries::Model>, LedgerError> {
    let mut entries = ledger_entries::Entity::find()
        .filter(ledger_entries::Column::TransactionId.eq(id.into_inner()))
        .all(conn)
        .await
        .map_err(map_db)?;
    entries.sort_by_key(|entry| matches!(entry.side, enums::EntrySide::Credit));
    Ok(entries)
}

/// If the mirrored pair debits a non-negative customer account, returns
/// who and how much.
fn wallet_debit(pair: &EntryPair) -> Option<(UserId, MinorUnits)> {
    pair.debit
        .account
        .code
        .forbids_negative_balance()
        .then(|| pair.debit.account.user_id.map(|user| (user, pair.debit.amount)))
        .flatten()
}

/// Returns true for errors caused by the balance CHECK constraint.
fn is_check_violation(err: &LedgerError) -> bool {
    match err {
        LedgerError::Database(msg) => {
            let msg = msg.to_ascii_lowercase();
            msg.contains("check constraint") && msg.contains("balance")
        }
        _ => false,
    }
}

/// Returns true for unique-violation errors mentioning `needle`.
fn is_unique_violation_on(err: &LedgerError, needle: &str) -> bool {
    match err {
        LedgerError::Database(msg) => {
            let msg = msg.to_ascii_lowercase();
            msg.contains("unique") && msg.contains(needle)
        }
        _ => false,
    }
}

fn map_db(err: DbErr) -> LedgerError {
    eprintln!("DEBUG map_db: {err:?}");
    LedgerError::Database(err.to_string())
}
