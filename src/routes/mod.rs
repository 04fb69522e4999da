pub mod health;
pub mod random;

use axum::http::Uri;
use axum::routing::get;
use axum::Router;

use crate::error::AppError;
use crate::AppState;

pub fn build_router() -> Router<AppState> {
    Router::new()
        // Unauthenticated health endpoints
        .route("/", get(health::root))
        .route("/version", get(health::version))
        // Authenticated attestation endpoints
        .route("/v1/random/dual", get(random::random_dual))
        .route("/v1/random/full", get(random::random_full))
        .fallback(catch_all)
}

async fn catch_all(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}
