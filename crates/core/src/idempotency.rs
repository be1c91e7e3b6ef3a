//! Request fingerprinting for idempotent replay.
//!
//! Every money-moving operation carries a caller-supplied idempotency key.
//! The key maps to a SHA-256 fingerprint of the operation name and its
//! canonical JSON payload; a replay with the same key and fingerprint
//! returns the stored result, while the same key with a different
//! fingerprint is a caller error, not a retry.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::ledger::LedgerError;

/// Maximum accepted idempotency key length.
pub const MAX_KEY_LENGTH: usize = 255;

/// An idempotency key plus the fingerprint of the request it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdempotentRequest {
    /// The caller-supplied key, validated.
    pub key: String,
    /// Hex SHA-256 of operation name + canonical payload.
    pub fingerprint: String,
}

impl IdempotentRequest {
    /// Builds a validated request identity from a key and payload.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty, oversized, or non-visible-ASCII
    /// key, or when the payload cannot be serialized.
    pub fn new<P: Serialize>(
        key: &str,
        operation: &str,
        payload: &P,
    ) -> Result<Self, LedgerError> {
        validate_key(key)?;
        Ok(Self {
            key: key.to_string(),
            fingerprint: fingerprint(operation, payload)?,
        })
    }
}

/// Validates the syntactic shape of an idempotency key.
pub fn validate_key(key: &str) -> Result<(), LedgerError> {
    if key.is_empty() {
        return Err(LedgerError::Validation(
            "idempotency key must not be empty".to_string(),
        ));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(LedgerError::Validation(format!(
            "idempotency key exceeds {MAX_KEY_LENGTH} characters"
        )));
    }
    if !key.chars().all(|c| c.is_ascii_graphic()) {
        return Err(LedgerError::Validation(
            "idempotency key must be visible ASCII".to_string(),
        ));
    }
    Ok(())
}

/// Computes the hex SHA-256 fingerprint of an operation and its payload.
///
/// The operation name is hashed alongside the payload so two different
/// operations with coincidentally equal bodies do not collide under one key.
pub fn fingerprint<P: Serialize>(operation: &str, payload: &P) -> Result<String, LedgerError> {
    let body = serde_json::to_vec(payload)
        .map_err(|e| LedgerError::Validation(format!("unserializable request payload: {e}")))?;

    let mut hasher = Sha256::new();
    hasher.update(operation.as_bytes());
    hasher.update([0u8]);
    hasher.update(&body);
    Ok(hex_encode(&hasher.finalize()))
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Payload<'a> {
        user_id: &'a str,
        amount_minor: i64,
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let payload = Payload {
            user_id: "u-1",
            amount_minor: 1000,
        };
        let a = fingerprint("topup", &payload).unwrap();
        let b = fingerprint("topup", &payload).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_varies_with_payload() {
        let a = fingerprint(
            "topup",
            &Payload {
                user_id: "u-1",
                amount_minor: 1000,
            },
        )
        .unwrap();
        let b = fingerprint(
            "topup",
            &Payload {
                user_id: "u-1",
                amount_minor: 1001,
            },
        )
        .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_varies_with_operation() {
        let payload = Payload {
            user_id: "u-1",
            amount_minor: 1000,
        };
        assert_ne!(
            fingerprint("topup", &payload).unwrap(),
            fingerprint("charge", &payload).unwrap()
        );
    }

    #[test]
    fn test_key_validation() {
        assert!(validate_key("retry-2026-08-04-001").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("has space").is_err());
        assert!(validate_key(&"k".repeat(MAX_KEY_LENGTH + 1)).is_err());
        assert!(validate_key(&"k".repeat(MAX_KEY_LENGTH)).is_ok());
    }

    #[test]
    fn test_request_builds_with_valid_key() {
        let req = IdempotentRequest::new(
            "client-key-1",
            "topup",
            &Payload {
                user_id: "u-1",
                amount_minor: 1000,
            },
        )
        .unwrap();
        assert_eq!(req.key, "client-key-1");
        assert_eq!(req.fingerprint.len(), 64);
    }
}
