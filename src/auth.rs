use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use subtle::ConstantTimeEq;

use crate::error::AppError;
use crate::AppState;

/// Extractor that validates the `X-API-Key` header against the
/// configured shared secret. Use as a handler parameter to require auth
/// on a route.
pub struct RequireApiKey;

/// Constant-time key comparison to prevent timing attacks. Does not
/// short-circuit on the first mismatched byte.
pub(crate) fn key_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

impl FromRequestParts<AppState> for RequireApiKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let supplied = parts
            .headers
            .get("x-api-key")
            .and_then(|v| v.to_str().ok());

        match supplied {
            Some(key) if key_eq(key, &state.config.api_key) => Ok(RequireApiKey),
            _ => Err(AppError::Unauthorized),
        }
    }
}
