//! Header plumbing for mutating routes.
//!
//! The idempotency key travels out-of-band in the `Idempotency-Key`
//! header and is required on every money-moving route; the optional
//! `X-Actor-Id` header records which staff member performed an operation.

use axum::http::HeaderMap;
use uuid::Uuid;

use cortado_core::idempotency::validate_key;
use cortado_core::ledger::LedgerError;

/// Header carrying the client's idempotency key.
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";
/// Header carrying the acting staff member's id.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";

/// Extracts and validates the required idempotency key.
pub fn idempotency_key(headers: &HeaderMap) -> Result<String, LedgerError> {
    let key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            LedgerError::Validation("missing Idempotency-Key header".to_string())
        })?;
    validate_key(key)?;
    Ok(key.to_string())
}

/// Extracts the optional actor id; a malformed value is ignored rather
/// than failing the operation.
pub fn actor_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(ACTOR_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse().ok())
}
