use axum::response::IntoResponse;
use axum::Json;

/// GET / → {}
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({}))
}

/// GET /version → {"name": "...", "version": "...", "paths": [...]}
pub async fn version() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "paths": ["/v1/random/dual", "/v1/random/full"],
    }))
}
