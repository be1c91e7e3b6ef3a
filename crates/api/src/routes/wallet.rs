//! Wallet routes: topup, charge, bonus, and balance lookup.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::error::ledger_error_response;
use crate::extractors;
use crate::AppState;
use cortado_core::idempotency::IdempotentRequest;
use cortado_core::ledger::TransactionKind;
use cortado_db::LedgerRepository;
use cortado_db::repositories::ledger::OperationInput;
use cortado_shared::types::{MinorUnits, UserId};

/// Creates the wallet routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallet/topup", post(topup))
        .route("/wallet/charge", post(charge))
        .route("/wallet/bonus", post(bonus))
        .route("/wallet/{user_id}/balance", get(get_balance))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for topping up or charging a wallet.
#[derive(Debug, Serialize, Deserialize)]
pub struct MoveMoneyRequest {
    /// Customer whose wallet is affected.
    pub user_id: Uuid,
    /// Positive amount in minor units.
    pub amount_minor: i64,
    /// Optional note.
    pub note: Option<String>,
}

/// Request body for granting a bonus.
#[derive(Debug, Serialize, Deserialize)]
pub struct BonusRequest {
    /// Customer receiving the bonus.
    pub user_id: Uuid,
    /// Positive amount in minor units.
    pub amount_minor: i64,
    /// Why the bonus was granted.
    pub reason: String,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/wallet/topup` - Add money to a customer wallet.
async fn topup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MoveMoneyRequest>,
) -> Response {
    post_operation(
        &state,
        &headers,
        TransactionKind::Topup,
        &body,
        body.user_id,
        body.amount_minor,
        body.note.clone(),
    )
    .await
}

/// POST `/wallet/charge` - Charge a customer wallet at point-of-sale.
async fn charge(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<MoveMoneyRequest>,
) -> Response {
    post_operation(
        &state,
        &headers,
        TransactionKind::Charge,
        &body,
        body.user_id,
        body.amount_minor,
        body.note.clone(),
    )
    .await
}

/// POST `/wallet/bonus` - Grant promotional credit to a customer wallet.
async fn bonus(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<BonusRequest>,
) -> Response {
    post_operation(
        &state,
        &headers,
        TransactionKind::Bonus,
        &body,
        body.user_id,
        body.amount_minor,
        Some(body.reason.clone()),
    )
    .await
}

/// GET `/wallet/{user_id}/balance` - Current wallet balance.
async fn get_balance(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> Response {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.get_balance(UserId::from_uuid(user_id)).await {
        Ok(view) => (
            StatusCode::OK,
            Json(json!({
                "balance_minor": view.balance,
                "updated_at": view.updated_at.map(|at| at.to_rfc3339()),
            })),
        )
            .into_response(),
        Err(err) => ledger_error_response(&err),
    }
}

/// Shared posting path for the three money-moving wallet operations.
///
/// The idempotency fingerprint covers the operation name plus the request
/// body as received, so a retried request replays and a reused key with a
/// different body is rejected.
async fn post_operation<P: Serialize>(
    state: &AppState,
    headers: &HeaderMap,
    kind: TransactionKind,
    payload: &P,
    user_id: Uuid,
    amount_minor: i64,
    note: Option<String>,
) -> Response {
    let operation = match kind {
        TransactionKind::Topup => "topup",
        TransactionKind::Charge => "charge",
        TransactionKind::Bonus => "bonus",
        TransactionKind::Reversal => unreachable!("reversals have their own route"),
    };
    let idempotency = match extractors::idempotency_key(headers)
        .and_then(|key| IdempotentRequest::new(&key, operation, payload))
    {
        Ok(idempotency) => idempotency,
        Err(err) => return ledger_error_response(&err),
    };

    let repo = LedgerRepository::new((*state.db).clone());
    let input = OperationInput {
        kind,
        user_id: UserId::from_uuid(user_id),
        amount: MinorUnits::new(amount_minor),
        note,
        actor_id: extractors::actor_id(headers),
        idempotency,
    };

    match repo.post_operation(input).await {
        Ok(receipt) => {
            let status = if receipt.replayed {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            (status, Json(json!({ "tx_id": receipt.transaction_id }))).into_response()
        }
        Err(err) => ledger_error_response(&err),
    }
}
