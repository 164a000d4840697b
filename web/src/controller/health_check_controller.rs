use axum::http::StatusCode;
use axum::response::IntoResponse;

/// GET the API router's liveness status
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "healthy")
}
