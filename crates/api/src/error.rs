//! Error-to-response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use cortado_core::ledger::LedgerError;

/// Renders a ledger error as the stable `{error, message}` JSON body.
///
/// Callers branch on the `error` code, never on the message text.
/// Internal failures are logged and their details withheld from the body;
/// invariant breaks are additionally logged at error level because they
/// are operator alerts, not user outcomes.
pub fn ledger_error_response(err: &LedgerError) -> Response {
    if err.is_alert() {
        error!(code = err.error_code(), detail = %err, "ledger invariant broken");
    }

    let status = StatusCode::from_u16(err.http_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let message = match err {
        LedgerError::Database(_) => {
            error!(detail = %err, "database failure");
            "An internal error occurred".to_string()
        }
        other => other.to_string(),
    };

    (
        status,
        Json(json!({
            "error": err.error_code(),
            "message": message,
        })),
    )
        .into_response()
}
