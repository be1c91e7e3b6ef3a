//! Dev-only maintenance routes, gated by the `dev_endpoints` feature flag.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tracing::warn;

use crate::error::ledger_error_response;
use crate::AppState;
use cortado_core::ledger::LedgerError;
use cortado_db::TrialBalanceRepository;

/// Creates the dev maintenance routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/dev/rebuild-balances", post(rebuild_balances))
}

/// POST `/dev/rebuild-balances` - Recompute every cached balance from the
/// entry log, then report a fresh trial balance.
///
/// The balance cache is derived data; this endpoint exists to restore it
/// after manual intervention in a development database.
async fn rebuild_balances(State(state): State<AppState>) -> Response {
    if !state.features.dev_endpoints {
        warn!("rejected dev endpoint call outside development");
        return ledger_error_response(&LedgerError::ForbiddenDevEndpoint);
    }

    let repo = TrialBalanceRepository::new((*state.db).clone());
    let rebuilt = match repo.rebuild_balances().await {
        Ok(rows) => rows,
        Err(err) => return ledger_error_response(&err),
    };

    match repo.run(None).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "rebuilt_rows": rebuilt,
                "trial_balance": {
                    "status": result.status,
                    "sum_debit_minor": result.sum_debit,
                    "sum_credit_minor": result.sum_credit,
                    "delta_minor": result.delta,
                    "as_of": result.as_of.to_string(),
                },
            })),
        )
            .into_response(),
        Err(err) => ledger_error_response(&err),
    }
}
