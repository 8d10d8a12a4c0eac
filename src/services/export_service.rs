//! Export Service - the public data document
//!
//! Active books (with their narrations, links and narrators), active people,
//! all link types and all tags. People are referenced by UUID, tags and
//! link types by id. The same records are read back by the importer.

use std::collections::HashMap;

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::link_filter::active_books;
use super::person_service::active_people;
use crate::domain::DomainError;
use crate::infrastructure::snapshot_store::SnapshotStore;
use crate::models::{
    book, book_authors, book_tags, book_translators, link, link_type, narration, narration_narrators,
    person, tag, Gender, Language,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportLink {
    pub url: String,
    /// Id of the link type.
    pub url_type: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportNarration {
    pub uuid: Uuid,
    pub language: Language,
    pub paid: bool,
    pub narrators: Vec<Uuid>,
    pub links: Vec<ExportLink>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBook {
    pub uuid: Uuid,
    pub title: String,
    #[serde(default)]
    pub title_ru: Option<String>,
    pub description: String,
    pub description_source: String,
    pub date: NaiveDate,
    pub authors: Vec<Uuid>,
    pub translators: Vec<Uuid>,
    pub slug: String,
    pub cover_image: Option<String>,
    pub cover_image_source: String,
    /// Tag ids.
    pub tag: Vec<i32>,
    /// Plain number of seconds.
    pub duration_sec: Option<i64>,
    pub narrations: Vec<ExportNarration>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPerson {
    pub uuid: Uuid,
    pub name: String,
    #[serde(default)]
    pub name_ru: Option<String>,
    pub description: String,
    pub description_source: String,
    pub photo: Option<String>,
    pub photo_source: String,
    pub slug: String,
    pub gender: Gender,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportLinkType {
    pub id: i32,
    pub name: String,
    pub caption: String,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTag {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub books: Vec<ExportBook>,
    pub people: Vec<ExportPerson>,
    pub link_types: Vec<ExportLinkType>,
    pub tags: Vec<ExportTag>,
}

impl From<person::Model> for ExportPerson {
    fn from(p: person::Model) -> Self {
        Self {
            uuid: p.uuid,
            name: p.name,
            name_ru: p.name_ru,
            description: p.description,
            description_source: p.description_source,
            photo: p.photo,
            photo_source: p.photo_source,
            slug: p.slug,
            gender: p.gender,
            date_of_birth: p.date_of_birth,
        }
    }
}

/// Group `(key, value)` pairs, keeping encounter order within a key.
fn group<K: std::hash::Hash + Eq, V>(pairs: impl Iterator<Item = (K, V)>) -> HashMap<K, Vec<V>> {
    let mut grouped: HashMap<K, Vec<V>> = HashMap::new();
    for (key, value) in pairs {
        grouped.entry(key).or_default().push(value);
    }
    grouped
}

pub async fn build_export(db: &DatabaseConnection) -> Result<ExportDocument, DomainError> {
    let books = active_books().order_by_asc(book::Column::Id).all(db).await?;
    let book_ids: Vec<i32> = books.iter().map(|b| b.id).collect();

    let person_uuids: HashMap<i32, Uuid> = person::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|p| (p.id, p.uuid))
        .collect();
    let uuid_of = |id: i32| person_uuids.get(&id).copied();

    let authors = group(
        book_authors::Entity::find()
            .filter(book_authors::Column::BookId.is_in(book_ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .filter_map(|r| Some((r.book_id, uuid_of(r.person_id)?))),
    );
    let translators = group(
        book_translators::Entity::find()
            .filter(book_translators::Column::BookId.is_in(book_ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .filter_map(|r| Some((r.book_id, uuid_of(r.person_id)?))),
    );
    let tags_of_book = group(
        book_tags::Entity::find()
            .filter(book_tags::Column::BookId.is_in(book_ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .map(|r| (r.book_id, r.tag_id)),
    );

    let narrations = narration::Entity::find()
        .filter(narration::Column::BookId.is_in(book_ids))
        .order_by_asc(narration::Column::Id)
        .all(db)
        .await?;
    let narration_ids: Vec<i32> = narrations.iter().map(|n| n.id).collect();
    let narrators = group(
        narration_narrators::Entity::find()
            .filter(narration_narrators::Column::NarrationId.is_in(narration_ids.clone()))
            .all(db)
            .await?
            .into_iter()
            .filter_map(|r| Some((r.narration_id, uuid_of(r.person_id)?))),
    );
    let mut links = group(
        link::Entity::find()
            .filter(link::Column::NarrationId.is_in(narration_ids))
            .order_by_asc(link::Column::Id)
            .all(db)
            .await?
            .into_iter()
            .map(|l| {
                (
                    l.narration_id,
                    ExportLink {
                        url: l.url,
                        url_type: l.link_type_id,
                    },
                )
            }),
    );

    let mut narrations_of_book = group(narrations.into_iter().map(|n| {
        let export = ExportNarration {
            uuid: n.uuid,
            language: n.language,
            paid: n.paid,
            narrators: narrators.get(&n.id).cloned().unwrap_or_default(),
            links: links.remove(&n.id).unwrap_or_default(),
        };
        (n.book_id, export)
    }));

    let books = books
        .into_iter()
        .map(|b| ExportBook {
            uuid: b.uuid,
            authors: authors.get(&b.id).cloned().unwrap_or_default(),
            translators: translators.get(&b.id).cloned().unwrap_or_default(),
            tag: tags_of_book.get(&b.id).cloned().unwrap_or_default(),
            narrations: narrations_of_book.remove(&b.id).unwrap_or_default(),
            title: b.title,
            title_ru: b.title_ru,
            description: b.description,
            description_source: b.description_source,
            date: b.date,
            slug: b.slug,
            cover_image: b.cover_image,
            cover_image_source: b.cover_image_source,
            duration_sec: b.duration_sec,
        })
        .collect();

    let people = active_people(db)
        .await?
        .into_iter()
        .map(ExportPerson::from)
        .collect();

    let link_types = link_type::Entity::find()
        .order_by_asc(link_type::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|t| ExportLinkType {
            id: t.id,
            name: t.name,
            caption: t.caption,
            icon: t.icon,
        })
        .collect();

    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|t| ExportTag {
            id: t.id,
            name: t.name,
            slug: t.slug,
        })
        .collect();

    Ok(ExportDocument {
        books,
        people,
        link_types,
        tags,
    })
}

/// Pretty-printed JSON with 4-space indentation, non-ASCII kept as is.
pub fn render(document: &ExportDocument) -> Result<Vec<u8>, DomainError> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    document.serialize(&mut serializer)?;
    Ok(out)
}

/// Build the document and replace the stored snapshot with it.
pub async fn generate_snapshot(
    db: &DatabaseConnection,
    store: &SnapshotStore,
) -> Result<ExportDocument, DomainError> {
    let document = build_export(db).await?;
    store.save(render(&document)?).await?;

    tracing::info!(
        "Generated data snapshot: {} books, {} people, {} link types, {} tags",
        document.books.len(),
        document.people.len(),
        document.link_types.len(),
        document.tags.len()
    );
    Ok(document)
}
