use axum::{extract::State, response::Response};
use sea_orm::DatabaseConnection;

use super::json_or_error;
use crate::services::tag_service;

#[utoipa::path(
    get,
    path = "/api/tags",
    responses(
        (status = 200, description = "All tags ordered by name")
    )
)]
pub async fn list_tags(State(db): State<DatabaseConnection>) -> Response {
    json_or_error(tag_service::list_tags(&db).await)
}
