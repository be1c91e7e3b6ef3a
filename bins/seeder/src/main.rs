//! Database seeder for Cortado development and testing.
//!
//! Posts a small demo ledger for one customer wallet: a topup, a charge,
//! and a bonus. The idempotency keys are fixed, so re-running the seeder
//! replays the stored results instead of posting duplicates.
//!
//! Usage: cargo run --bin seeder

use serde_json::json;
use uuid::Uuid;

use cortado_core::idempotency::IdempotentRequest;
use cortado_core::ledger::TransactionKind;
use cortado_db::LedgerRepository;
use cortado_db::repositories::ledger::OperationInput;
use cortado_shared::types::{MinorUnits, UserId};

/// Demo customer ID (consistent for all seeds)
const DEMO_USER_ID: &str = "00000000-0000-0000-0000-000000000002";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    println!("Connecting to database...");
    let db = cortado_db::connect(&database_url)
        .await
        .expect("Failed to connect to database");
    let repo = LedgerRepository::new(db);

    let user = demo_user_id();

    println!("Seeding demo topup (1000 minor units)...");
    seed_operation(&repo, TransactionKind::Topup, user, 1000, "seed-topup-001").await;

    println!("Seeding demo charge (400 minor units)...");
    seed_operation(&repo, TransactionKind::Charge, user, 400, "seed-charge-001").await;

    println!("Seeding demo bonus (50 minor units)...");
    seed_operation(&repo, TransactionKind::Bonus, user, 50, "seed-bonus-001").await;

    match repo.get_balance(user).await {
        Ok(view) => println!("Demo wallet balance: {} minor units", view.balance),
        Err(e) => eprintln!("Failed to read demo balance: {e}"),
    }

    println!("Seeding complete!");
}

fn demo_user_id() -> UserId {
    UserId::from_uuid(Uuid::parse_str(DEMO_USER_ID).unwrap())
}

/// Posts one demo operation under a fixed idempotency key.
async fn seed_operation(
    repo: &LedgerRepository,
    kind: TransactionKind,
    user: UserId,
    amount: i64,
    seed_key: &str,
) {
    let operation = match kind {
        TransactionKind::Topup => "topup",
        TransactionKind::Charge => "charge",
        TransactionKind::Bonus => "bonus",
        TransactionKind::Reversal => unreachable!("the seeder posts no reversals"),
    };
    let payload = json!({
        "user_id": user.to_string(),
        "amount_minor": amount,
    });

    let idempotency = IdempotentRequest::new(seed_key, operation, &payload)
        .expect("seed idempotency key is valid");

    let input = OperationInput {
        kind,
        user_id: user,
        amount: MinorUnits::new(amount),
        note: Some("development seed data".to_string()),
        actor_id: None,
        idempotency,
    };

    match repo.post_operation(input).await {
        Ok(receipt) if receipt.replayed => {
            println!("  Already posted as {}, skipping...", receipt.transaction_id);
        }
        Ok(receipt) => println!("  Posted transaction {}", receipt.transaction_id),
        Err(e) => eprintln!("  Failed to post {operation}: {e}"),
    }
}
