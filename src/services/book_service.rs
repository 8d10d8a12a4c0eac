//! Book Service - book cards for listings and the book detail page
//!
//! Related people are loaded in bulk (junction rows, then one query for the
//! people) so a page of books costs a fixed number of queries.

use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::models::{
    book, book_authors, link, link_type, narration, narration_narrators, person, tag, Language,
};

/// Minimal person data shown next to a book.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonRef {
    pub name: String,
    pub name_ru: Option<String>,
    pub slug: String,
}

impl From<&person::Model> for PersonRef {
    fn from(person: &person::Model) -> Self {
        Self {
            name: person.name.clone(),
            name_ru: person.name_ru.clone(),
            slug: person.slug.clone(),
        }
    }
}

/// A book as shown in listings.
#[derive(Debug, Clone, Serialize)]
pub struct BookCard {
    pub uuid: Uuid,
    pub title: String,
    pub title_ru: Option<String>,
    pub slug: String,
    pub cover_image: Option<String>,
    pub date: chrono::NaiveDate,
    pub duration_sec: Option<i64>,
    pub authors: Vec<PersonRef>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkView {
    pub url: String,
    pub link_type: String,
    pub caption: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NarrationView {
    pub uuid: Uuid,
    pub language: Language,
    pub language_name: &'static str,
    pub paid: bool,
    pub narrators: Vec<PersonRef>,
    pub links: Vec<LinkView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookDetail {
    pub book: book::Model,
    pub authors: Vec<PersonRef>,
    pub translators: Vec<PersonRef>,
    pub narrations: Vec<NarrationView>,
    pub tags: Vec<tag::Model>,
    /// Language shared by every narration, if there is exactly one.
    pub single_language: Option<Language>,
    pub show_russian_title: bool,
}

/// People by internal id.
pub async fn people_by_id(
    db: &DatabaseConnection,
    ids: Vec<i32>,
) -> Result<HashMap<i32, person::Model>, DomainError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let people = person::Entity::find()
        .filter(person::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(people.into_iter().map(|p| (p.id, p)).collect())
}

/// Authors of each of the given books, keyed by book id.
pub async fn authors_by_book(
    db: &DatabaseConnection,
    book_ids: &[i32],
) -> Result<HashMap<i32, Vec<person::Model>>, DomainError> {
    if book_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = book_authors::Entity::find()
        .filter(book_authors::Column::BookId.is_in(book_ids.to_vec()))
        .all(db)
        .await?;
    let people = people_by_id(db, rows.iter().map(|r| r.person_id).collect()).await?;

    let mut by_book: HashMap<i32, Vec<person::Model>> = HashMap::new();
    for row in rows {
        if let Some(person) = people.get(&row.person_id) {
            by_book.entry(row.book_id).or_default().push(person.clone());
        }
    }
    Ok(by_book)
}

/// Turn books into listing cards, keeping their order.
pub async fn book_cards(
    db: &DatabaseConnection,
    books: Vec<book::Model>,
) -> Result<Vec<BookCard>, DomainError> {
    let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
    let mut authors = authors_by_book(db, &ids).await?;

    Ok(books
        .into_iter()
        .map(|book| {
            let book_authors = authors.remove(&book.id).unwrap_or_default();
            BookCard {
                uuid: book.uuid,
                title: book.title,
                title_ru: book.title_ru,
                slug: book.slug,
                cover_image: book.cover_image,
                date: book.date,
                duration_sec: book.duration_sec,
                authors: book_authors.iter().map(PersonRef::from).collect(),
            }
        })
        .collect())
}

/// The common language of all narrations, `None` if empty or mixed.
pub fn single_language(languages: &[Language]) -> Option<Language> {
    let first = *languages.first()?;
    languages.iter().all(|l| *l == first).then_some(first)
}

/// Detail page of an active book.
pub async fn get_book_detail(db: &DatabaseConnection, slug: &str) -> Result<BookDetail, DomainError> {
    let book = book::Entity::find()
        .filter(book::Column::Slug.eq(slug))
        .filter(book::Column::Status.eq(book::BookStatus::Active))
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Book '{}'", slug)))?;

    let authors = book.find_linked(book::BookToAuthors).all(db).await?;
    let translators = book.find_linked(book::BookToTranslators).all(db).await?;
    let tags = book
        .find_related(tag::Entity)
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?;

    let narrations = book
        .find_related(narration::Entity)
        .order_by_asc(narration::Column::Id)
        .all(db)
        .await?;
    let narration_ids: Vec<i32> = narrations.iter().map(|n| n.id).collect();

    let narrator_rows = narration_narrators::Entity::find()
        .filter(narration_narrators::Column::NarrationId.is_in(narration_ids.clone()))
        .all(db)
        .await?;
    let narrators = people_by_id(db, narrator_rows.iter().map(|r| r.person_id).collect()).await?;

    let links = link::Entity::find()
        .find_also_related(link_type::Entity)
        .filter(link::Column::NarrationId.is_in(narration_ids))
        .order_by_asc(link::Column::Id)
        .all(db)
        .await?;

    let languages: Vec<Language> = narrations.iter().map(|n| n.language).collect();
    let single_language = single_language(&languages);

    let narrations = narrations
        .into_iter()
        .map(|narration| NarrationView {
            uuid: narration.uuid,
            language: narration.language,
            language_name: narration.language.human_name(),
            paid: narration.paid,
            narrators: narrator_rows
                .iter()
                .filter(|row| row.narration_id == narration.id)
                .filter_map(|row| narrators.get(&row.person_id))
                .map(PersonRef::from)
                .collect(),
            links: links
                .iter()
                .filter(|(link, _)| link.narration_id == narration.id)
                .map(|(link, link_type)| LinkView {
                    url: link.url.clone(),
                    link_type: link_type.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
                    caption: link_type.as_ref().map(|t| t.caption.clone()).unwrap_or_default(),
                    icon: link_type.as_ref().and_then(|t| t.icon.clone()),
                })
                .collect(),
        })
        .collect();

    tracing::debug!("Loaded book detail for {}", slug);

    Ok(BookDetail {
        book,
        authors: authors.iter().map(PersonRef::from).collect(),
        translators: translators.iter().map(PersonRef::from).collect(),
        narrations,
        tags,
        single_language,
        show_russian_title: single_language == Some(Language::Russian),
    })
}
