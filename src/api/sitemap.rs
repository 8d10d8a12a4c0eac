//! Plain-text sitemap of every public page.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use sea_orm::{EntityTrait, QueryOrder};

use super::error_response;
use crate::domain::DomainError;
use crate::infrastructure::AppState;
use crate::models::{book, person, tag};
use crate::services::active_books;

const STATIC_PAGES: [&str; 4] = ["/", "/about", "/catalog", "/articles"];

/// Absolute URLs of the static pages, then books, people and tags.
pub fn sitemap_urls(
    origin: &str,
    book_slugs: &[String],
    person_slugs: &[String],
    tag_slugs: &[String],
) -> Vec<String> {
    let dynamic = book_slugs
        .iter()
        .map(|slug| format!("/books/{}", urlencoding::encode(slug)))
        .chain(
            person_slugs
                .iter()
                .map(|slug| format!("/person/{}", urlencoding::encode(slug))),
        )
        .chain(
            tag_slugs
                .iter()
                .map(|slug| format!("/catalog/{}", urlencoding::encode(slug))),
        );

    STATIC_PAGES
        .iter()
        .map(|page| page.to_string())
        .chain(dynamic)
        .map(|page| format!("{}{}", origin, page))
        .collect()
}

/// Site origin from configuration, else from the request's `Host`.
fn request_origin(state: &AppState, headers: &HeaderMap) -> String {
    if let Some(site_url) = &state.config.site_url {
        return site_url.clone();
    }
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{}", host)
}

async fn load_slugs(state: &AppState) -> Result<(Vec<String>, Vec<String>, Vec<String>), DomainError> {
    let db = state.db();
    let books = active_books()
        .order_by_asc(book::Column::Id)
        .all(db)
        .await?;
    let people = person::Entity::find()
        .order_by_asc(person::Column::Id)
        .all(db)
        .await?;
    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Id)
        .all(db)
        .await?;

    Ok((
        books.into_iter().map(|b| b.slug).collect(),
        people.into_iter().map(|p| p.slug).collect(),
        tags.into_iter().map(|t| t.slug).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/sitemap.txt",
    responses(
        (status = 200, description = "Absolute URLs of public pages, one per line", body = String, content_type = "text/plain")
    )
)]
pub async fn sitemap(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (books, people, tags) = match load_slugs(&state).await {
        Ok(slugs) => slugs,
        Err(e) => return error_response(e),
    };
    let origin = request_origin(&state, &headers);
    let body = sitemap_urls(&origin, &books, &people, &tags).join("\n");

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
