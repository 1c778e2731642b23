use serde_json::Value;
use subtle::ConstantTimeEq;

use crate::domain::error::RelayError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureReason {
    MissingToken,
    InvalidToken,
}

/// Checks the `verification_token` of a decoded payload against the shared
/// secret. The comparison is exact: no trimming, no case folding.
pub fn verify_payload_token(payload: &Value, expected: &str) -> Result<(), AuthFailureReason> {
    let provided = payload.get("verification_token").and_then(Value::as_str);
    verify_token(provided, expected)
}

fn verify_token(provided: Option<&str>, expected: &str) -> Result<(), AuthFailureReason> {
    let Some(provided) = provided else {
        return Err(AuthFailureReason::MissingToken);
    };

    if provided.as_bytes().ct_eq(expected.as_bytes()).into() {
        Ok(())
    } else {
        Err(AuthFailureReason::InvalidToken)
    }
}

impl From<AuthFailureReason> for RelayError {
    fn from(_: AuthFailureReason) -> Self {
        Self::TokenMismatch
    }
}
