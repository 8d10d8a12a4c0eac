//! Search Service - resolves index hits to catalog entities
//!
//! The index returns `(model, objectID)` pairs ranked by relevance. Books and
//! people are loaded with one query each and re-emitted in hit order.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use uuid::Uuid;

use super::book_service::{BookCard, PersonRef};
use super::link_filter::active_books;
use crate::domain::{DomainError, SearchHit, SearchIndex};
use crate::models::{book, person};

/// Hits requested from the index.
pub const MAX_HITS: usize = 100;
/// Results returned to the caller.
pub const MAX_RESULTS: usize = 50;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "object", rename_all = "lowercase")]
pub enum SearchResult {
    Book(BookCard),
    Person(person::Model),
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchResult>,
}

/// Re-emit loaded entities in hit order, keeping at most [`MAX_RESULTS`].
/// Hits whose entity is not loaded, or of an unknown model, are skipped.
pub fn merge_hits(
    hits: &[SearchHit],
    books: &HashMap<String, BookCard>,
    people: &HashMap<String, person::Model>,
) -> Vec<SearchResult> {
    hits.iter()
        .take(MAX_RESULTS)
        .filter_map(|hit| {
            let result = match hit.model.as_str() {
                "book" => books.get(&hit.object_id).cloned().map(SearchResult::Book),
                "person" => people.get(&hit.object_id).cloned().map(SearchResult::Person),
                other => {
                    tracing::warn!(
                        "Got unexpected model from search '{}' (objectID={})",
                        other,
                        hit.object_id
                    );
                    return None;
                }
            };
            if result.is_none() {
                tracing::warn!(
                    "Search hit {} '{}' is missing from DB",
                    hit.model,
                    hit.object_id
                );
            }
            result
        })
        .collect()
}

/// UUIDs of the hits of one model. Malformed ids are dropped.
fn hit_uuids(hits: &[SearchHit], model: &str) -> Vec<Uuid> {
    hits.iter()
        .filter(|hit| hit.model == model)
        .filter_map(|hit| match Uuid::parse_str(&hit.object_id) {
            Ok(uuid) => Some(uuid),
            Err(_) => {
                tracing::warn!("Search hit has malformed objectID '{}'", hit.object_id);
                None
            }
        })
        .collect()
}

async fn load_books(
    db: &DatabaseConnection,
    uuids: Vec<Uuid>,
) -> Result<HashMap<String, BookCard>, DomainError> {
    if uuids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = active_books()
        .filter(book::Column::Uuid.is_in(uuids))
        .order_by_asc(book::Column::Id)
        .find_also_linked(book::BookToAuthors)
        .all(db)
        .await?;

    let mut cards: HashMap<String, BookCard> = HashMap::new();
    for (book, author) in rows {
        let card = cards.entry(book.uuid.to_string()).or_insert_with(|| BookCard {
            uuid: book.uuid,
            title: book.title.clone(),
            title_ru: book.title_ru.clone(),
            slug: book.slug.clone(),
            cover_image: book.cover_image.clone(),
            date: book.date,
            duration_sec: book.duration_sec,
            authors: Vec::new(),
        });
        if let Some(author) = author {
            card.authors.push(PersonRef::from(&author));
        }
    }
    Ok(cards)
}

async fn load_people(
    db: &DatabaseConnection,
    uuids: Vec<Uuid>,
) -> Result<HashMap<String, person::Model>, DomainError> {
    if uuids.is_empty() {
        return Ok(HashMap::new());
    }
    let people = person::Entity::find()
        .filter(person::Column::Uuid.is_in(uuids))
        .all(db)
        .await?;
    Ok(people.into_iter().map(|p| (p.uuid.to_string(), p)).collect())
}

/// Run `query` against the index and resolve the hits.
pub async fn search(
    db: &DatabaseConnection,
    index: &dyn SearchIndex,
    query: &str,
) -> Result<Vec<SearchResult>, DomainError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let mut hits = index.search(query, MAX_HITS).await?;
    hits.truncate(MAX_RESULTS);
    tracing::info!("Search '{}' returned {} hits", query, hits.len());

    let books = load_books(db, hit_uuids(&hits, "book")).await?;
    let people = load_people(db, hit_uuids(&hits, "person")).await?;

    Ok(merge_hits(&hits, &books, &people))
}
