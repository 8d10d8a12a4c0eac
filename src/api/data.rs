use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use super::error_response;
use crate::domain::DomainError;
use crate::infrastructure::AppState;

/// Cache lifetime of the data document, one day.
const DATA_JSON_MAX_AGE: &str = "max-age=86400";

#[utoipa::path(
    get,
    path = "/api/data.json",
    responses(
        (status = 200, description = "Last generated data document"),
        (status = 404, description = "No document generated yet")
    )
)]
pub async fn get_data_json(State(state): State<AppState>) -> Response {
    match state.snapshots.load().await {
        Ok(Some(bytes)) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/json"),
                (header::CACHE_CONTROL, DATA_JSON_MAX_AGE),
                (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            ],
            bytes,
        )
            .into_response(),
        Ok(None) => error_response(DomainError::NotFound("data.json".to_string())),
        Err(e) => error_response(e),
    }
}
