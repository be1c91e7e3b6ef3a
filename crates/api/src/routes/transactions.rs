//! Transaction routes: lookup, listing, and reversal.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
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
use cortado_core::ledger::LedgerError;
use cortado_db::LedgerRepository;
use cortado_db::entities::sea_orm_active_enums::{AccountCode, EntrySide, TransactionKind};
use cortado_db::entities::{ledger_entries, ledger_transactions};
use cortado_db::repositories::ledger::ReversalInput;
use cortado_shared::types::{CursorPage, CursorQuery, TransactionId, UserId};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions/{tx_id}", get(get_transaction))
        .route("/transactions/{tx_id}/reversal", post(create_reversal))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Restrict to transactions touching this customer's wallet.
    pub user_id: Option<Uuid>,
    /// Page size (default 20, max 100).
    pub limit: Option<u64>,
    /// Opaque cursor from a previous page.
    pub cursor: Option<String>,
}

/// Response for a transaction header.
#[derive(Debug, Serialize)]
pub struct TransactionView {
    /// Transaction ID.
    pub id: Uuid,
    /// Transaction kind.
    pub kind: TransactionKind,
    /// The transaction this one reverses, if any.
    pub reversal_of: Option<Uuid>,
    /// Staff member or admin who performed the operation.
    pub actor_id: Option<Uuid>,
    /// Note or reason supplied by the caller.
    pub note: Option<String>,
    /// Business date.
    pub posted_on: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl From<ledger_transactions::Model> for TransactionView {
    fn from(model: ledger_transactions::Model) -> Self {
        Self {
            id: model.id,
            kind: model.kind,
            reversal_of: model.reversal_of,
            actor_id: model.actor_id,
            note: model.note,
            posted_on: model.posted_on.to_string(),
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Response for one half of a transaction's entry pair.
#[derive(Debug, Serialize)]
pub struct EntryView {
    /// Entry ID.
    pub id: Uuid,
    /// Account the entry posts to.
    pub account_code: AccountCode,
    /// Customer key for per-customer accounts.
    pub user_id: Option<Uuid>,
    /// Debit or credit.
    pub side: EntrySide,
    /// Positive amount in minor units.
    pub amount_minor: i64,
}

impl From<ledger_entries::Model> for EntryView {
    fn from(model: ledger_entries::Model) -> Self {
        Self {
            id: model.id,
            account_code: model.account_code,
            user_id: model.user_id,
            side: model.side,
            amount_minor: model.amount_minor,
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/transactions` - List transactions newest-first, cursor-paginated.
async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
) -> Response {
    let paging = CursorQuery {
        limit: query.limit,
        cursor: query.cursor,
    };
    let cursor = match paging.decode_cursor() {
        Ok(cursor) => cursor,
        Err(_) => {
            return ledger_error_response(&LedgerError::Validation(
                "invalid pagination cursor".to_string(),
            ));
        }
    };
    let limit = paging.page_size();

    let repo = LedgerRepository::new((*state.db).clone());
    match repo
        .list_transactions(query.user_id.map(UserId::from_uuid), limit, cursor)
        .await
    {
        Ok(models) => {
            let page = CursorPage::from_overfetch(models, limit, |model| model.id);
            let transactions: Vec<TransactionView> =
                page.data.into_iter().map(TransactionView::from).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "transactions": transactions,
                    "next_cursor": page.next_cursor,
                    "has_more": page.has_more,
                })),
            )
                .into_response()
        }
        Err(err) => ledger_error_response(&err),
    }
}

/// GET `/transactions/{tx_id}` - Fetch a transaction with its entry pair.
async fn get_transaction(State(state): State<AppState>, Path(tx_id): Path<Uuid>) -> Response {
    let repo = LedgerRepository::new((*state.db).clone());

    match repo.get_transaction(TransactionId::from_uuid(tx_id)).await {
        Ok(found) => {
            let entries: Vec<EntryView> = found.entries.into_iter().map(EntryView::from).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "transaction": TransactionView::from(found.transaction),
                    "entries": entries,
                })),
            )
                .into_response()
        }
        Err(err) => ledger_error_response(&err),
    }
}

/// POST `/transactions/{tx_id}/reversal` - Reverse an existing transaction.
async fn create_reversal(
    State(state): State<AppState>,
    Path(tx_id): Path<Uuid>,
    headers: HeaderMap,
) -> Response {
    let idempotency = match extractors::idempotency_key(&headers)
        .and_then(|key| IdempotentRequest::new(&key, "reversal", &json!({ "tx_id": tx_id })))
    {
        Ok(idempotency) => idempotency,
        Err(err) => return ledger_error_response(&err),
    };

    let repo = LedgerRepository::new((*state.db).clone());
    let input = ReversalInput {
        target: TransactionId::from_uuid(tx_id),
        actor_id: extractors::actor_id(&headers),
        idempotency,
    };

    match repo.post_reversal(input).await {
        Ok(receipt) => {
            let status = if receipt.replayed {
                StatusCode::OK
            } else {
                StatusCode::CREATED
            };
            (
                status,
                Json(json!({ "reversal_tx_id": receipt.transaction_id })),
            )
                .into_response()
        }
        Err(err) => ledger_error_response(&err),
    }
}
