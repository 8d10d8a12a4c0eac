use axum::{
    extract::{Path, State},
    response::Response,
};
use sea_orm::DatabaseConnection;

use super::json_or_error;
use crate::services::book_service;

#[utoipa::path(
    get,
    path = "/api/books/{slug}",
    params(("slug" = String, Path, description = "Book slug")),
    responses(
        (status = 200, description = "Book with authors, narrations and tags"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn book_detail(State(db): State<DatabaseConnection>, Path(slug): Path<String>) -> Response {
    json_or_error(book_service::get_book_detail(&db, &slug).await)
}
