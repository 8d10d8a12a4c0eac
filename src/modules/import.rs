//! Loads an exported data document back into the database.
//!
//! Link types and tags are matched by id, people, books and narrations by
//! UUID. Matching rows are updated, others inserted, and the relations of
//! every imported book and narration are replaced by the document's. The
//! whole import runs in one transaction.
#![allow(clippy::needless_update)] // SeaORM ActiveModels require ..Default::default()

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;

use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::DomainError;
use crate::models::{
    book, book_authors, book_tags, book_translators, link, link_type, narration,
    narration_narrators, person, tag, BookStatus,
};
use crate::services::export_service::{
    ExportBook, ExportDocument, ExportLinkType, ExportNarration, ExportPerson, ExportTag,
};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub link_types: usize,
    pub tags: usize,
    pub people: usize,
    pub books: usize,
    pub narrations: usize,
    pub links: usize,
    /// References to people, tags or link types absent from the document and the DB.
    pub skipped_references: usize,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} link types, {} tags, {} people, {} books, {} narrations, {} links ({} skipped references)",
            self.link_types,
            self.tags,
            self.people,
            self.books,
            self.narrations,
            self.links,
            self.skipped_references
        )
    }
}

pub fn parse_document(content: &[u8]) -> Result<ExportDocument, DomainError> {
    serde_json::from_slice(content)
        .map_err(|e| DomainError::Validation(format!("Invalid data document: {}", e)))
}

pub async fn import_file(db: &DatabaseConnection, path: &Path) -> Result<ImportSummary, DomainError> {
    let content = tokio::fs::read(path).await?;
    let document = parse_document(&content)?;
    import_document(db, &document).await
}

pub async fn import_document(
    db: &DatabaseConnection,
    document: &ExportDocument,
) -> Result<ImportSummary, DomainError> {
    let txn = db.begin().await?;
    let mut summary = ImportSummary::default();

    for link_type in &document.link_types {
        upsert_link_type(&txn, link_type).await?;
        summary.link_types += 1;
    }
    for tag in &document.tags {
        upsert_tag(&txn, tag).await?;
        summary.tags += 1;
    }

    let mut person_ids: HashMap<Uuid, i32> = person::Entity::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|p| (p.uuid, p.id))
        .collect();
    for person in &document.people {
        let id = upsert_person(&txn, person, person_ids.get(&person.uuid).copied()).await?;
        person_ids.insert(person.uuid, id);
        summary.people += 1;
    }

    let tag_ids: HashSet<i32> = tag::Entity::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();
    let link_type_ids: HashSet<i32> = link_type::Entity::find()
        .all(&txn)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    let refs = References {
        person_ids: &person_ids,
        tag_ids: &tag_ids,
        link_type_ids: &link_type_ids,
    };

    for book in &document.books {
        import_book(&txn, book, &refs, &mut summary).await?;
    }

    txn.commit().await?;
    tracing::info!("Imported data document: {}", summary);
    Ok(summary)
}

/// Ids known to the database while importing books.
struct References<'a> {
    person_ids: &'a HashMap<Uuid, i32>,
    tag_ids: &'a HashSet<i32>,
    link_type_ids: &'a HashSet<i32>,
}

impl References<'_> {
    /// Internal ids of `uuids`, deduplicated, skipping unknown ones.
    fn people(&self, uuids: &[Uuid], summary: &mut ImportSummary) -> Vec<i32> {
        let mut seen = HashSet::new();
        uuids
            .iter()
            .filter_map(|uuid| match self.person_ids.get(uuid) {
                Some(id) => Some(*id),
                None => {
                    tracing::warn!("Skipping reference to unknown person {}", uuid);
                    summary.skipped_references += 1;
                    None
                }
            })
            .filter(|id| seen.insert(*id))
            .collect()
    }
}

async fn upsert_link_type(txn: &DatabaseTransaction, t: &ExportLinkType) -> Result<(), DomainError> {
    let exists = link_type::Entity::find_by_id(t.id).one(txn).await?.is_some();
    let model = link_type::ActiveModel {
        id: Set(t.id),
        name: Set(t.name.clone()),
        caption: Set(t.caption.clone()),
        icon: Set(t.icon.clone()),
    };
    if exists {
        model.update(txn).await?;
    } else {
        model.insert(txn).await?;
    }
    Ok(())
}

async fn upsert_tag(txn: &DatabaseTransaction, t: &ExportTag) -> Result<(), DomainError> {
    let exists = tag::Entity::find_by_id(t.id).one(txn).await?.is_some();
    let model = tag::ActiveModel {
        id: Set(t.id),
        name: Set(t.name.clone()),
        slug: Set(t.slug.clone()),
    };
    if exists {
        model.update(txn).await?;
    } else {
        model.insert(txn).await?;
    }
    Ok(())
}

async fn upsert_person(
    txn: &DatabaseTransaction,
    p: &ExportPerson,
    existing_id: Option<i32>,
) -> Result<i32, DomainError> {
    let model = person::ActiveModel {
        id: existing_id.map(Set).unwrap_or(NotSet),
        uuid: Set(p.uuid),
        name: Set(p.name.clone()),
        name_ru: Set(p.name_ru.clone()),
        slug: Set(p.slug.clone()),
        gender: Set(p.gender),
        date_of_birth: Set(p.date_of_birth),
        description: Set(p.description.clone()),
        description_source: Set(p.description_source.clone()),
        photo: Set(p.photo.clone()),
        photo_source: Set(p.photo_source.clone()),
    };
    let saved = match existing_id {
        Some(_) => model.update(txn).await?,
        None => model.insert(txn).await?,
    };
    Ok(saved.id)
}

async fn import_book(
    txn: &DatabaseTransaction,
    b: &ExportBook,
    refs: &References<'_>,
    summary: &mut ImportSummary,
) -> Result<(), DomainError> {
    let existing = book::Entity::find()
        .filter(book::Column::Uuid.eq(b.uuid))
        .one(txn)
        .await?;

    let model = book::ActiveModel {
        id: existing.as_ref().map(|e| Set(e.id)).unwrap_or(NotSet),
        uuid: Set(b.uuid),
        title: Set(b.title.clone()),
        title_ru: Set(b.title_ru.clone()),
        description: Set(b.description.clone()),
        description_source: Set(b.description_source.clone()),
        slug: Set(b.slug.clone()),
        cover_image: Set(b.cover_image.clone()),
        cover_image_source: Set(b.cover_image_source.clone()),
        date: Set(b.date),
        duration_sec: Set(b.duration_sec),
        // Only active books are exported.
        status: Set(BookStatus::Active),
        promoted: Set(existing.as_ref().is_some_and(|e| e.promoted)),
    };
    let saved = match existing {
        Some(_) => model.update(txn).await?,
        None => model.insert(txn).await?,
    };
    let book_id = saved.id;

    book_authors::Entity::delete_many()
        .filter(book_authors::Column::BookId.eq(book_id))
        .exec(txn)
        .await?;
    let authors: Vec<book_authors::ActiveModel> = refs
        .people(&b.authors, summary)
        .into_iter()
        .map(|person_id| book_authors::ActiveModel {
            book_id: Set(book_id),
            person_id: Set(person_id),
        })
        .collect();
    if !authors.is_empty() {
        book_authors::Entity::insert_many(authors)
            .exec_without_returning(txn)
            .await?;
    }

    book_translators::Entity::delete_many()
        .filter(book_translators::Column::BookId.eq(book_id))
        .exec(txn)
        .await?;
    let translators: Vec<book_translators::ActiveModel> = refs
        .people(&b.translators, summary)
        .into_iter()
        .map(|person_id| book_translators::ActiveModel {
            book_id: Set(book_id),
            person_id: Set(person_id),
        })
        .collect();
    if !translators.is_empty() {
        book_translators::Entity::insert_many(translators)
            .exec_without_returning(txn)
            .await?;
    }

    book_tags::Entity::delete_many()
        .filter(book_tags::Column::BookId.eq(book_id))
        .exec(txn)
        .await?;
    let mut seen_tags = HashSet::new();
    let mut tags = Vec::new();
    for tag_id in &b.tag {
        if !refs.tag_ids.contains(tag_id) {
            tracing::warn!("Book {} references unknown tag {}", b.slug, tag_id);
            summary.skipped_references += 1;
        } else if seen_tags.insert(*tag_id) {
            tags.push(book_tags::ActiveModel {
                book_id: Set(book_id),
                tag_id: Set(*tag_id),
            });
        }
    }
    if !tags.is_empty() {
        book_tags::Entity::insert_many(tags)
            .exec_without_returning(txn)
            .await?;
    }

    remove_stale_narrations(txn, book_id, b).await?;
    for narration in &b.narrations {
        import_narration(txn, book_id, narration, refs, summary).await?;
    }

    summary.books += 1;
    Ok(())
}

/// Delete narrations of `book_id` the document no longer lists, with their
/// links and narrator rows.
async fn remove_stale_narrations(
    txn: &DatabaseTransaction,
    book_id: i32,
    b: &ExportBook,
) -> Result<(), DomainError> {
    let kept: HashSet<Uuid> = b.narrations.iter().map(|n| n.uuid).collect();
    let stale: Vec<i32> = narration::Entity::find()
        .filter(narration::Column::BookId.eq(book_id))
        .all(txn)
        .await?
        .into_iter()
        .filter(|n| !kept.contains(&n.uuid))
        .map(|n| n.id)
        .collect();
    if stale.is_empty() {
        return Ok(());
    }

    link::Entity::delete_many()
        .filter(link::Column::NarrationId.is_in(stale.clone()))
        .exec(txn)
        .await?;
    narration_narrators::Entity::delete_many()
        .filter(narration_narrators::Column::NarrationId.is_in(stale.clone()))
        .exec(txn)
        .await?;
    narration::Entity::delete_many()
        .filter(narration::Column::Id.is_in(stale.clone()))
        .exec(txn)
        .await?;

    tracing::info!("Removed {} narrations of book {} missing from the document", stale.len(), b.slug);
    Ok(())
}

async fn import_narration(
    txn: &DatabaseTransaction,
    book_id: i32,
    n: &ExportNarration,
    refs: &References<'_>,
    summary: &mut ImportSummary,
) -> Result<(), DomainError> {
    let existing = narration::Entity::find()
        .filter(narration::Column::Uuid.eq(n.uuid))
        .one(txn)
        .await?;

    let model = narration::ActiveModel {
        id: existing.as_ref().map(|e| Set(e.id)).unwrap_or(NotSet),
        uuid: Set(n.uuid),
        book_id: Set(book_id),
        language: Set(n.language),
        paid: Set(n.paid),
    };
    let saved = match existing {
        Some(_) => model.update(txn).await?,
        None => model.insert(txn).await?,
    };
    let narration_id = saved.id;

    narration_narrators::Entity::delete_many()
        .filter(narration_narrators::Column::NarrationId.eq(narration_id))
        .exec(txn)
        .await?;
    let narrators: Vec<narration_narrators::ActiveModel> = refs
        .people(&n.narrators, summary)
        .into_iter()
        .map(|person_id| narration_narrators::ActiveModel {
            narration_id: Set(narration_id),
            person_id: Set(person_id),
        })
        .collect();
    if !narrators.is_empty() {
        narration_narrators::Entity::insert_many(narrators)
            .exec_without_returning(txn)
            .await?;
    }

    link::Entity::delete_many()
        .filter(link::Column::NarrationId.eq(narration_id))
        .exec(txn)
        .await?;
    for l in &n.links {
        if !refs.link_type_ids.contains(&l.url_type) {
            tracing::warn!("Link {} references unknown link type {}", l.url, l.url_type);
            summary.skipped_references += 1;
            continue;
        }
        link::ActiveModel {
            url: Set(l.url.clone()),
            narration_id: Set(narration_id),
            link_type_id: Set(l.url_type),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        summary.links += 1;
    }

    summary.narrations += 1;
    Ok(())
}
