use axum::{
    extract::{Query, State},
    response::Response,
};
use serde::Deserialize;

use super::{error_response, json_or_error};
use crate::infrastructure::AppState;
use crate::services::search_service::{self, SearchResponse};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    query: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/search",
    params(("query" = Option<String>, Query, description = "Free-text query")),
    responses(
        (status = 200, description = "Books and people in relevance order"),
        (status = 502, description = "Search service failed"),
        (status = 503, description = "Search is not configured")
    )
)]
pub async fn search(State(state): State<AppState>, Query(params): Query<SearchQuery>) -> Response {
    let query = params.query.unwrap_or_default().trim().to_string();
    if query.is_empty() {
        return json_or_error(Ok(SearchResponse {
            query,
            results: Vec::new(),
        }));
    }

    let index = match state.require_search() {
        Ok(index) => index,
        Err(e) => return error_response(e),
    };

    let results = search_service::search(state.db(), index.as_ref(), &query).await;
    json_or_error(results.map(|results| SearchResponse { query, results }))
}
