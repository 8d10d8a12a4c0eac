//! Indexing Service - pushes the searchable catalog to the search index

use sea_orm::{DatabaseConnection, QueryOrder};

use super::book_service::authors_by_book;
use super::link_filter::active_books;
use super::person_service::active_people;
use crate::domain::search::{BookRecord, PersonRecord};
use crate::domain::{DomainError, IndexRecord, SearchIndex};
use crate::models::book;

/// One record per active book and per active person.
pub async fn build_index_records(db: &DatabaseConnection) -> Result<Vec<IndexRecord>, DomainError> {
    let books = active_books()
        .order_by_asc(book::Column::Id)
        .all(db)
        .await?;
    let ids: Vec<i32> = books.iter().map(|b| b.id).collect();
    let mut authors = authors_by_book(db, &ids).await?;

    let mut records: Vec<IndexRecord> = books
        .into_iter()
        .map(|book| {
            let book_authors = authors.remove(&book.id).unwrap_or_default();
            IndexRecord::Book(BookRecord {
                object_id: book.uuid.to_string(),
                model: "book".to_string(),
                title: book.title,
                title_ru: book.title_ru,
                slug: book.slug,
                authors: book_authors.iter().map(|a| a.name.clone()).collect(),
                authors_ru: book_authors.iter().map(|a| a.name_ru.clone()).collect(),
            })
        })
        .collect();

    records.extend(active_people(db).await?.into_iter().map(|person| {
        IndexRecord::Person(PersonRecord {
            object_id: person.uuid.to_string(),
            model: "person".to_string(),
            name: person.name,
            name_ru: person.name_ru,
            slug: person.slug,
        })
    }));

    Ok(records)
}

/// Replace the index content with the current catalog. Returns the number
/// of records pushed.
pub async fn push_search_index(
    db: &DatabaseConnection,
    index: &dyn SearchIndex,
) -> Result<usize, DomainError> {
    let records = build_index_records(db).await?;
    let count = records.len();
    tracing::info!("Pushing {} objects to the search index...", count);

    index.replace_all(records).await?;

    tracing::info!("Search index push completed");
    Ok(count)
}
