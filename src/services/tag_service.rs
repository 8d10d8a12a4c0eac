//! Tag Service - tag listing and the computed "read by author" tag

use std::collections::{BTreeSet, HashMap, HashSet};

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use crate::domain::DomainError;
use crate::models::{book_authors, book_tags, narration, narration_narrators, tag};

/// Slug of the tag for books narrated by one of their authors.
pub const READ_BY_AUTHOR_TAG: &str = "cytaje-autar";

pub async fn list_tags(db: &DatabaseConnection) -> Result<Vec<tag::Model>, DomainError> {
    Ok(tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?)
}

/// Books where some narration has a narrator who also authored the book.
///
/// `authors` are `(book_id, person_id)`, `narration_books` maps narration id
/// to book id and `narrators` are `(narration_id, person_id)`.
pub fn books_read_by_author(
    authors: &HashSet<(i32, i32)>,
    narration_books: &HashMap<i32, i32>,
    narrators: &[(i32, i32)],
) -> BTreeSet<i32> {
    narrators
        .iter()
        .filter_map(|(narration_id, person_id)| {
            let book_id = *narration_books.get(narration_id)?;
            authors.contains(&(book_id, *person_id)).then_some(book_id)
        })
        .collect()
}

/// Recompute the membership of the read-by-author tag over all books.
/// Returns the number of tagged books.
pub async fn update_read_by_author_tag(db: &DatabaseConnection) -> Result<usize, DomainError> {
    let tag = tag::Entity::find()
        .filter(tag::Column::Slug.eq(READ_BY_AUTHOR_TAG))
        .one(db)
        .await?
        .ok_or_else(|| {
            DomainError::Internal(format!("Tag {} is missing from DB", READ_BY_AUTHOR_TAG))
        })?;

    let txn = db.begin().await?;

    let authors: HashSet<(i32, i32)> = book_authors::Entity::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|r| (r.book_id, r.person_id))
        .collect();
    let narration_books: HashMap<i32, i32> = narration::Entity::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|n| (n.id, n.book_id))
        .collect();
    let narrators: Vec<(i32, i32)> = narration_narrators::Entity::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|r| (r.narration_id, r.person_id))
        .collect();

    let book_ids = books_read_by_author(&authors, &narration_books, &narrators);

    book_tags::Entity::delete_many()
        .filter(book_tags::Column::TagId.eq(tag.id))
        .exec(&txn)
        .await?;

    if !book_ids.is_empty() {
        book_tags::Entity::insert_many(book_ids.iter().map(|book_id| book_tags::ActiveModel {
            book_id: Set(*book_id),
            tag_id: Set(tag.id),
        }))
        .exec_without_returning(&txn)
        .await?;
    }

    txn.commit().await?;

    tracing::info!("Tag {} now covers {} books", READ_BY_AUTHOR_TAG, book_ids.len());
    Ok(book_ids.len())
}
