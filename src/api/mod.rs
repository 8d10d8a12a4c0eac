pub mod books;
pub mod catalog;
pub mod data;
pub mod health;
pub mod maintenance;
pub mod people;
pub mod search;
pub mod sitemap;
pub mod stats;
pub mod tag;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;

use crate::domain::DomainError;
use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Catalog
        .route("/home", get(catalog::home))
        .route("/catalog", get(catalog::catalog))
        .route("/catalog/:tag_slug", get(catalog::catalog_for_tag))
        .route("/tags", get(tag::list_tags))
        .route("/books/:slug", get(books::book_detail))
        .route("/people/:slug", get(people::person_detail))
        .route("/search", get(search::search))
        .route("/stats/birthdays", get(stats::birthdays))
        .route("/sitemap.txt", get(sitemap::sitemap))
        // Data export
        .route("/data.json", get(data::get_data_json))
        // Maintenance hooks, called by the scheduler
        .route(
            "/maintenance/push-search-index",
            get(maintenance::push_search_index).post(maintenance::push_search_index),
        )
        .route(
            "/maintenance/generate-data-json",
            get(maintenance::generate_data_json).post(maintenance::generate_data_json),
        )
        .route(
            "/maintenance/update-read-by-author-tag",
            get(maintenance::update_read_by_author_tag)
                .post(maintenance::update_read_by_author_tag),
        )
        .with_state(state)
}

/// JSON error response for a failed operation.
pub fn error_response(err: DomainError) -> Response {
    let status = match &err {
        DomainError::NotFound(_) => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::External(_) => StatusCode::BAD_GATEWAY,
        DomainError::Database(_) | DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!("Request rejected: {}", err);
    }

    (status, Json(json!({ "error": err.to_string() }))).into_response()
}

/// `200 OK` with the JSON body, or the mapped error.
pub fn json_or_error<T: serde::Serialize>(result: Result<T, DomainError>) -> Response {
    match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => error_response(e),
    }
}
