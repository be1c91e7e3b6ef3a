//! End-to-end repository tests for posting, idempotency, and reversal.
//!
//! These run against an in-memory SQLite database with the real migration
//! applied, exercising the same atomic write paths production uses.

use futures::future::join_all;
use sea_orm::{Database, DatabaseConnection};
use uuid::Uuid;

use cortado_core::idempotency::IdempotentRequest;
use cortado_core::ledger::{LedgerError, TransactionKind};
use cortado_db::migration::{Migrator, MigratorTrait};
use cortado_db::repositories::ledger::{LedgerRepository, OperationInput, ReversalInput};
use cortado_shared::types::{MinorUnits, TransactionId, UserId};

async fn setup() -> (LedgerRepository, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    (LedgerRepository::new(db.clone()), db)
}

fn operation(kind: TransactionKind, user: UserId, amount: i64) -> OperationInput {
    let op_name = match kind {
        TransactionKind::Topup => "topup",
        TransactionKind::Charge => "charge",
        TransactionKind::Bonus => "bonus",
        TransactionKind::Reversal => unreachable!("reversals use ReversalInput"),
    };
    let payload = serde_json::json!({
        "user_id": user.to_string(),
        "amount_minor": amount,
    });
    OperationInput {
        kind,
        user_id: user,
        amount: MinorUnits::new(amount),
        note: None,
        actor_id: None,
        idempotency: IdempotentRequest::new(&Uuid::new_v4().to_string(), op_name, &payload)
            .unwrap(),
    }
}

fn reversal(target: TransactionId) -> ReversalInput {
    let payload = serde_json::json!({ "target": target.to_string() });
    ReversalInput {
        target,
        actor_id: None,
        idempotency: IdempotentRequest::new(&Uuid::new_v4().to_string(), "reversal", &payload)
            .unwrap(),
    }
}

async fn balance_of(repo: &LedgerRepository, user: UserId) -> i64 {
    repo.get_balance(user).await.unwrap().balance.value()
}

#[tokio::test]
async fn topup_credits_the_wallet() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    let receipt = repo
        .post_operation(operation(TransactionKind::Topup, user, 1000))
        .await
        .unwrap();
    assert!(!receipt.replayed);

    let view = repo.get_balance(user).await.unwrap();
    assert_eq!(view.balance.value(), 1000);
    assert!(view.updated_at.is_some());
}

#[tokio::test]
async fn unknown_wallet_reads_as_zero() {
    let (repo, _db) = setup().await;
    let view = repo.get_balance(UserId::new()).await.unwrap();
    assert_eq!(view.balance, MinorUnits::ZERO);
    assert!(view.updated_at.is_none());
}

#[tokio::test]
async fn charge_debits_the_wallet() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    repo.post_operation(operation(TransactionKind::Topup, user, 1000))
        .await
        .unwrap();
    repo.post_operation(operation(TransactionKind::Charge, user, 400))
        .await
        .unwrap();

    assert_eq!(balance_of(&repo, user).await, 600);
}

#[tokio::test]
async fn charge_beyond_balance_fails_and_leaves_balance_unchanged() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    repo.post_operation(operation(TransactionKind::Topup, user, 600))
        .await
        .unwrap();

    let err = repo
        .post_operation(operation(TransactionKind::Charge, user, 2000))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");
    assert!(matches!(
        err,
        LedgerError::InsufficientFunds { balance, requested }
            if balance.value() == 600 && requested.value() == 2000
    ));

    assert_eq!(balance_of(&repo, user).await, 600);
}

#[tokio::test]
async fn charge_against_empty_wallet_fails() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    let err = repo
        .post_operation(operation(TransactionKind::Charge, user, 1))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");
}

#[tokio::test]
async fn replay_with_same_key_returns_same_transaction_once() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    let input = operation(TransactionKind::Topup, user, 1000);
    let first = repo.post_operation(input.clone()).await.unwrap();
    let second = repo.post_operation(input).await.unwrap();

    assert_eq!(first.transaction_id, second.transaction_id);
    assert!(!first.replayed);
    assert!(second.replayed);

    // The balance moved exactly once.
    assert_eq!(balance_of(&repo, user).await, 1000);
}

#[tokio::test]
async fn key_reuse_with_different_body_is_rejected() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    let mut input = operation(TransactionKind::Topup, user, 1000);
    repo.post_operation(input.clone()).await.unwrap();

    // Same key, different amount: a client bug, not a retry.
    input.amount = MinorUnits::new(2000);
    input.idempotency.fingerprint = IdempotentRequest::new(
        &input.idempotency.key,
        "topup",
        &serde_json::json!({
            "user_id": user.to_string(),
            "amount_minor": 2000,
        }),
    )
    .unwrap()
    .fingerprint;

    let err = repo.post_operation(input).await.unwrap_err();
    assert_eq!(err.error_code(), "VALIDATION_FAILED");
    assert_eq!(balance_of(&repo, user).await, 1000);
}

#[tokio::test]
async fn reversal_restores_the_wallet_exactly_once() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    repo.post_operation(operation(TransactionKind::Topup, user, 1000))
        .await
        .unwrap();
    let charge = repo
        .post_operation(operation(TransactionKind::Charge, user, 400))
        .await
        .unwrap();
    assert_eq!(balance_of(&repo, user).await, 600);

    let receipt = repo
        .post_reversal(reversal(charge.transaction_id))
        .await
        .unwrap();
    assert_eq!(balance_of(&repo, user).await, 1000);

    // The reversal links back to its original.
    let stored = repo.get_transaction(receipt.transaction_id).await.unwrap();
    assert_eq!(
        stored.transaction.reversal_of,
        Some(charge.transaction_id.into_inner())
    );

    // A second attempt with a fresh key loses to the uniqueness invariant.
    let err = repo
        .post_reversal(reversal(charge.transaction_id))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "REVERSAL_ALREADY_EXISTS");
    assert_eq!(balance_of(&repo, user).await, 1000);
}

#[tokio::test]
async fn reversing_a_reversal_is_forbidden() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    repo.post_operation(operation(TransactionKind::Topup, user, 1000))
        .await
        .unwrap();
    let charge = repo
        .post_operation(operation(TransactionKind::Charge, user, 400))
        .await
        .unwrap();
    let rev = repo
        .post_reversal(reversal(charge.transaction_id))
        .await
        .unwrap();

    let err = repo
        .post_reversal(reversal(rev.transaction_id))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "REVERSAL_FORBIDDEN_TYPE");
}

#[tokio::test]
async fn reversing_a_missing_transaction_is_not_found() {
    let (repo, _db) = setup().await;

    let err = repo
        .post_reversal(reversal(TransactionId::new()))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "TX_NOT_FOUND");
}

#[tokio::test]
async fn reversing_a_spent_topup_is_insufficient_funds() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    let topup = repo
        .post_operation(operation(TransactionKind::Topup, user, 1000))
        .await
        .unwrap();
    repo.post_operation(operation(TransactionKind::Charge, user, 400))
        .await
        .unwrap();

    // Undoing the topup would pull 1000 from a wallet holding 600.
    let err = repo
        .post_reversal(reversal(topup.transaction_id))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INSUFFICIENT_FUNDS");
    assert_eq!(balance_of(&repo, user).await, 600);
}

#[tokio::test]
async fn bonus_composition_matches_worked_example() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    repo.post_operation(operation(TransactionKind::Topup, user, 1000))
        .await
        .unwrap();
    let charge = repo
        .post_operation(operation(TransactionKind::Charge, user, 400))
        .await
        .unwrap();
    repo.post_operation(operation(TransactionKind::Bonus, user, 50))
        .await
        .unwrap();

    repo.post_reversal(reversal(charge.transaction_id))
        .await
        .unwrap();

    // 1000 - 400 + 50 + 400: the bonus granted in between stays.
    assert_eq!(balance_of(&repo, user).await, 1050);
}

#[tokio::test]
async fn concurrent_charges_allow_exactly_one_winner() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    repo.post_operation(operation(TransactionKind::Topup, user, 500))
        .await
        .unwrap();

    // Two simultaneous charges for the full balance: one must win, one
    // must fail with INSUFFICIENT_FUNDS, and the balance must never go
    // negative.
    let tasks = (0..2).map(|_| {
        let repo = repo.clone();
        tokio::spawn(async move {
            repo.post_operation(operation(TransactionKind::Charge, user, 500))
                .await
        })
    });
    let outcomes: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let successes = outcomes.iter().filter(|r| r.is_ok()).count();
    let rejections = outcomes
        .iter()
        .filter(|r| {
            matches!(r, Err(err) if err.error_code() == "INSUFFICIENT_FUNDS")
        })
        .count();

    assert_eq!(successes, 1);
    assert_eq!(rejections, 1);
    assert_eq!(balance_of(&repo, user).await, 0);
}

#[tokio::test]
async fn get_transaction_returns_the_balanced_pair() {
    let (repo, _db) = setup().await;
    let user = UserId::new();

    let receipt = repo
        .post_operation(operation(TransactionKind::Topup, user, 1000))
        .await
        .unwrap();
    let stored = repo.get_transaction(receipt.transaction_id).await.unwrap();

    assert_eq!(stored.entries.len(), 2);
    let debit = &stored.entries[0];
    let credit = &stored.entries[1];
    assert_eq!(
        debit.side,
        cortado_db::entities::sea_orm_active_enums::EntrySide::Debit
    );
    assert_eq!(
        credit.side,
        cortado_db::entities::sea_orm_active_enums::EntrySide::Credit
    );
    assert_eq!(debit.amount_minor, credit.amount_minor);
    assert_eq!(debit.amount_minor, 1000);
    assert_eq!(credit.user_id, Some(user.into_inner()));
}

#[tokio::test]
async fn missing_transaction_lookup_is_not_found() {
    let (repo, _db) = setup().await;
    let err = repo.get_transaction(TransactionId::new()).await.unwrap_err();
    assert_eq!(err.error_code(), "TX_NOT_FOUND");
}

#[tokio::test]
async fn listing_pages_newest_first_without_gaps() {
    let (repo, _db) = setup().await;
    let user = UserId::new();
    let other = UserId::new();

    let mut posted = Vec::new();
    for i in 1..=5 {
        let receipt = repo
            .post_operation(operation(TransactionKind::Topup, user, i * 100))
            .await
            .unwrap();
        posted.push(receipt.transaction_id.into_inner());
    }
    repo.post_operation(operation(TransactionKind::Topup, other, 999))
        .await
        .unwrap();

    // First page: 2 requested, 3 fetched to signal another page.
    let page = repo
        .list_transactions(Some(user), 2, None)
        .await
        .unwrap();
    assert_eq!(page.len(), 3);
    assert_eq!(page[0].id, posted[4]);
    assert_eq!(page[1].id, posted[3]);

    // Walk the rest from the cursor; the other customer never appears.
    let rest = repo
        .list_transactions(Some(user), 10, Some(posted[3]))
        .await
        .unwrap();
    let rest_ids: Vec<Uuid> = rest.iter().map(|t| t.id).collect();
    assert_eq!(rest_ids, vec![posted[2], posted[1], posted[0]]);

    // Unfiltered listing sees both customers' transactions.
    let all = repo.list_transactions(None, 10, None).await.unwrap();
    assert_eq!(all.len(), 6);
}
