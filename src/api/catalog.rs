use axum::{
    extract::{OriginalUri, Path, State},
    response::Response,
};
use sea_orm::DatabaseConnection;

use super::json_or_error;
use crate::services::catalog_service;
use crate::services::pagination::QueryParams;

#[utoipa::path(
    get,
    path = "/api/home",
    responses(
        (status = 200, description = "Promoted, recent and showcased books")
    )
)]
pub async fn home(State(db): State<DatabaseConnection>) -> Response {
    json_or_error(catalog_service::get_home_page(&db).await)
}

#[utoipa::path(
    get,
    path = "/api/catalog",
    params(
        ("page" = Option<String>, Query, description = "1-based page number"),
        ("lang" = Option<String>, Query, description = "Narration language, case-insensitive"),
        ("paid" = Option<String>, Query, description = "\"true\" for paid, \"false\" for free"),
        ("links" = Option<String>, Query, description = "Comma-separated link type names")
    ),
    responses(
        (status = 200, description = "One page of active books")
    )
)]
pub async fn catalog(State(db): State<DatabaseConnection>, OriginalUri(uri): OriginalUri) -> Response {
    let params = QueryParams::parse(uri.query());
    json_or_error(catalog_service::get_catalog_page(&db, None, uri.path(), &params).await)
}

#[utoipa::path(
    get,
    path = "/api/catalog/{tag_slug}",
    params(
        ("tag_slug" = String, Path, description = "Tag slug"),
        ("page" = Option<String>, Query, description = "1-based page number"),
        ("lang" = Option<String>, Query, description = "Narration language, case-insensitive"),
        ("paid" = Option<String>, Query, description = "\"true\" for paid, \"false\" for free"),
        ("links" = Option<String>, Query, description = "Comma-separated link type names")
    ),
    responses(
        (status = 200, description = "One page of active books with the tag"),
        (status = 404, description = "Tag not found")
    )
)]
pub async fn catalog_for_tag(
    State(db): State<DatabaseConnection>,
    Path(tag_slug): Path<String>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let params = QueryParams::parse(uri.query());
    json_or_error(
        catalog_service::get_catalog_page(&db, Some(&tag_slug), uri.path(), &params).await,
    )
}
