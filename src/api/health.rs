use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use sea_orm::DatabaseConnection;
use serde_json::json;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Database is unreachable")
    )
)]
pub async fn health_check(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    let (status, db_status) = match db.ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            tracing::error!("Health check failed to reach the database: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    (
        status,
        Json(json!({
            "status": if status.is_success() { "ok" } else { "degraded" },
            "database": db_status,
            "service": "audiobooks",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}
