//! Person Service - person detail page and the set of active people

use std::collections::HashSet;

use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use super::book_service::{book_cards, BookCard};
use super::link_filter::{active_books, filter_books, filter_narrations};
use crate::domain::DomainError;
use crate::models::{book, book_authors, book_translators, narration, narration_narrators, person};

fn active_book_ids() -> SelectStatement {
    Query::select()
        .column(book::Column::Id)
        .from(book::Entity)
        .and_where(book::Column::Status.eq(book::BookStatus::Active))
        .to_owned()
}

/// People linked to at least one active book as author, translator or
/// narrator, ordered by id.
pub async fn active_people(db: &DatabaseConnection) -> Result<Vec<person::Model>, DomainError> {
    let authors = Query::select()
        .column(book_authors::Column::PersonId)
        .from(book_authors::Entity)
        .and_where(book_authors::Column::BookId.in_subquery(active_book_ids()))
        .to_owned();
    let translators = Query::select()
        .column(book_translators::Column::PersonId)
        .from(book_translators::Entity)
        .and_where(book_translators::Column::BookId.in_subquery(active_book_ids()))
        .to_owned();
    let narrators = Query::select()
        .column(narration_narrators::Column::PersonId)
        .from(narration_narrators::Entity)
        .and_where(
            narration_narrators::Column::NarrationId.in_subquery(
                Query::select()
                    .column(narration::Column::Id)
                    .from(narration::Entity)
                    .and_where(narration::Column::BookId.in_subquery(active_book_ids()))
                    .to_owned(),
            ),
        )
        .to_owned();

    let people = person::Entity::find()
        .filter(
            Condition::any()
                .add(person::Column::Id.in_subquery(authors))
                .add(person::Column::Id.in_subquery(translators))
                .add(person::Column::Id.in_subquery(narrators)),
        )
        .order_by_asc(person::Column::Id)
        .all(db)
        .await?;
    Ok(people)
}

#[derive(Debug, Clone, Serialize)]
pub struct PersonDetail {
    pub person: person::Model,
    pub authored_books: Vec<BookCard>,
    pub translated_books: Vec<BookCard>,
    pub narrated_books: Vec<BookCard>,
}

/// Detail page of a person. Only active books are listed, each list
/// narrowed by `link_types` when given.
pub async fn get_person_detail(
    db: &DatabaseConnection,
    slug: &str,
    link_types: Option<&[String]>,
) -> Result<PersonDetail, DomainError> {
    let person = person::Entity::find()
        .filter(person::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("Person '{}'", slug)))?;

    let authored = filter_books(
        active_books().filter(
            book::Column::Id.in_subquery(
                Query::select()
                    .column(book_authors::Column::BookId)
                    .from(book_authors::Entity)
                    .and_where(book_authors::Column::PersonId.eq(person.id))
                    .to_owned(),
            ),
        ),
        link_types,
    )
    .order_by_desc(book::Column::Date)
    .all(db)
    .await?;

    let translated = filter_books(
        active_books().filter(
            book::Column::Id.in_subquery(
                Query::select()
                    .column(book_translators::Column::BookId)
                    .from(book_translators::Entity)
                    .and_where(book_translators::Column::PersonId.eq(person.id))
                    .to_owned(),
            ),
        ),
        link_types,
    )
    .order_by_desc(book::Column::Date)
    .all(db)
    .await?;

    let narrations = filter_narrations(
        narration::Entity::find().filter(
            narration::Column::Id.in_subquery(
                Query::select()
                    .column(narration_narrators::Column::NarrationId)
                    .from(narration_narrators::Entity)
                    .and_where(narration_narrators::Column::PersonId.eq(person.id))
                    .to_owned(),
            ),
        ),
        link_types,
    )
    .order_by_asc(narration::Column::Id)
    .all(db)
    .await?;

    // One entry per book even if the person narrated it more than once.
    let mut seen = HashSet::new();
    let book_ids: Vec<i32> = narrations
        .iter()
        .map(|n| n.book_id)
        .filter(|id| seen.insert(*id))
        .collect();
    let mut narrated = active_books()
        .filter(book::Column::Id.is_in(book_ids.clone()))
        .all(db)
        .await?;
    narrated.sort_by_key(|b| book_ids.iter().position(|id| *id == b.id));

    tracing::debug!(
        "Person {}: {} authored, {} translated, {} narrated",
        slug,
        authored.len(),
        translated.len(),
        narrated.len()
    );

    Ok(PersonDetail {
        person,
        authored_books: book_cards(db, authored).await?,
        translated_books: book_cards(db, translated).await?,
        narrated_books: book_cards(db, narrated).await?,
    })
}
