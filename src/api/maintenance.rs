//! Hooks triggered by the periodic scheduler. Each answers `204` on success.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::error_response;
use crate::infrastructure::AppState;
use crate::services::{export_service, indexing_service, tag_service};

#[utoipa::path(
    post,
    path = "/api/maintenance/push-search-index",
    responses(
        (status = 204, description = "Search index replaced"),
        (status = 502, description = "Search service failed"),
        (status = 503, description = "Search keys are not set")
    )
)]
pub async fn push_search_index(State(state): State<AppState>) -> Response {
    let index = match state.require_search() {
        Ok(index) => index,
        Err(e) => return error_response(e),
    };
    match indexing_service::push_search_index(state.db(), index.as_ref()).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/maintenance/generate-data-json",
    responses(
        (status = 204, description = "Data document regenerated")
    )
)]
pub async fn generate_data_json(State(state): State<AppState>) -> Response {
    match export_service::generate_snapshot(state.db(), &state.snapshots).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}

#[utoipa::path(
    post,
    path = "/api/maintenance/update-read-by-author-tag",
    responses(
        (status = 204, description = "Tag membership recomputed"),
        (status = 500, description = "Tag cytaje-autar is missing from DB")
    )
)]
pub async fn update_read_by_author_tag(State(state): State<AppState>) -> Response {
    match tag_service::update_read_by_author_tag(state.db()).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(e),
    }
}
