//! Trial balance route.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::error::ledger_error_response;
use crate::AppState;
use cortado_db::TrialBalanceRepository;

/// Creates the trial balance routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/trial-balance/run", post(run_trial_balance))
}

/// Query parameters for a trial balance run.
#[derive(Debug, Deserialize)]
pub struct RunQuery {
    /// Sum entries dated on or before this date; whole ledger when absent.
    pub as_of: Option<NaiveDate>,
}

/// POST `/trial-balance/run` - Reconcile debits against credits.
///
/// Read-only with respect to the ledger; persists the day's snapshot.
async fn run_trial_balance(
    State(state): State<AppState>,
    Query(query): Query<RunQuery>,
) -> Response {
    let repo = TrialBalanceRepository::new((*state.db).clone());

    match repo.run(query.as_of).await {
        Ok(result) => (
            StatusCode::OK,
            Json(json!({
                "status": result.status,
                "sum_debit_minor": result.sum_debit,
                "sum_credit_minor": result.sum_credit,
                "delta_minor": result.delta,
                "as_of": result.as_of.to_string(),
            })),
        )
            .into_response(),
        Err(err) => ledger_error_response(&err),
    }
}
