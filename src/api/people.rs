use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;

use super::json_or_error;
use crate::services::link_filter::parse_link_types;
use crate::services::person_service;

#[derive(Debug, Deserialize)]
pub struct PersonQuery {
    links: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/people/{slug}",
    params(
        ("slug" = String, Path, description = "Person slug"),
        ("links" = Option<String>, Query, description = "Comma-separated link type names")
    ),
    responses(
        (status = 200, description = "Person with authored, translated and narrated books"),
        (status = 404, description = "Person not found")
    )
)]
pub async fn person_detail(
    State(db): State<DatabaseConnection>,
    Path(slug): Path<String>,
    Query(query): Query<PersonQuery>,
) -> Response {
    let link_types = parse_link_types(query.links.as_deref());
    json_or_error(person_service::get_person_detail(&db, &slug, link_types.as_deref()).await)
}
