use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::auth::RequireApiKey;
use crate::compose::ResponseShape;
use crate::error::AppError;
use crate::AppState;

/// GET /v1/random/dual — flattened attestation.
pub async fn random_dual(
    State(state): State<AppState>,
    _auth: RequireApiKey,
) -> Result<impl IntoResponse, AppError> {
    let response = state.composer.attest(ResponseShape::Dual).await?;
    Ok(Json(response))
}

/// GET /v1/random/full — nested attestation with the payload preserved.
pub async fn random_full(
    State(state): State<AppState>,
    _auth: RequireApiKey,
) -> Result<impl IntoResponse, AppError> {
    let response = state.composer.attest(ResponseShape::Full).await?;
    Ok(Json(response))
}
