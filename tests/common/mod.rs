#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use audiobooks::config::Config;
use audiobooks::domain::{DomainError, IndexRecord, SearchHit, SearchIndex};
use audiobooks::models::{
    book, book_authors, book_tags, book_translators, link, link_type, narration,
    narration_narrators, person, tag, BookStatus, Gender, Language,
};
use audiobooks::{db, server, AppState};
use axum::{
    body::Body,
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test database
pub async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

pub fn test_config(data_dir: &Path) -> Config {
    let data_dir = data_dir.to_string_lossy().to_string();
    Config::from_lookup(move |key| match key {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "DATA_DIR" => Some(data_dir.clone()),
        _ => None,
    })
}

/// State over a fresh database, without search, storing snapshots in a temp dir.
pub async fn setup_test_state() -> (AppState, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db = setup_test_db().await;
    let state = AppState::new(db, test_config(dir.path())).expect("Failed to build state");
    (state, dir)
}

pub fn app(state: &AppState) -> Router {
    server::build_router(state.clone())
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub async fn create_person(db: &DatabaseConnection, name: &str, slug: &str) -> person::Model {
    create_person_born(db, name, slug, None).await
}

pub async fn create_person_born(
    db: &DatabaseConnection,
    name: &str,
    slug: &str,
    date_of_birth: Option<NaiveDate>,
) -> person::Model {
    person::ActiveModel {
        uuid: Set(uuid::Uuid::new_v4()),
        name: Set(name.to_string()),
        name_ru: Set(None),
        slug: Set(slug.to_string()),
        gender: Set(Gender::Male),
        date_of_birth: Set(date_of_birth),
        description: Set(String::new()),
        description_source: Set(String::new()),
        photo: Set(None),
        photo_source: Set(String::new()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create person")
}

pub async fn create_book(
    db: &DatabaseConnection,
    title: &str,
    slug: &str,
    date: NaiveDate,
    status: BookStatus,
) -> book::Model {
    book::ActiveModel {
        uuid: Set(uuid::Uuid::new_v4()),
        title: Set(title.to_string()),
        title_ru: Set(None),
        description: Set(String::new()),
        description_source: Set(String::new()),
        slug: Set(slug.to_string()),
        cover_image: Set(None),
        cover_image_source: Set(String::new()),
        date: Set(date),
        duration_sec: Set(Some(3600)),
        status: Set(status),
        promoted: Set(false),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create book")
}

pub async fn create_active_book(db: &DatabaseConnection, slug: &str, date: NaiveDate) -> book::Model {
    create_book(db, slug, slug, date, BookStatus::Active).await
}

pub async fn add_author(db: &DatabaseConnection, book_id: i32, person_id: i32) {
    book_authors::Entity::insert(book_authors::ActiveModel {
        book_id: Set(book_id),
        person_id: Set(person_id),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to add author");
}

pub async fn add_translator(db: &DatabaseConnection, book_id: i32, person_id: i32) {
    book_translators::Entity::insert(book_translators::ActiveModel {
        book_id: Set(book_id),
        person_id: Set(person_id),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to add translator");
}

pub async fn create_narration(
    db: &DatabaseConnection,
    book_id: i32,
    language: Language,
    paid: bool,
) -> narration::Model {
    narration::ActiveModel {
        uuid: Set(uuid::Uuid::new_v4()),
        book_id: Set(book_id),
        language: Set(language),
        paid: Set(paid),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create narration")
}

pub async fn add_narrator(db: &DatabaseConnection, narration_id: i32, person_id: i32) {
    narration_narrators::Entity::insert(narration_narrators::ActiveModel {
        narration_id: Set(narration_id),
        person_id: Set(person_id),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to add narrator");
}

pub async fn create_link_type(db: &DatabaseConnection, name: &str) -> link_type::Model {
    link_type::ActiveModel {
        name: Set(name.to_string()),
        caption: Set(name.to_uppercase()),
        icon: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create link type")
}

pub async fn add_link(db: &DatabaseConnection, narration_id: i32, link_type_id: i32, url: &str) {
    link::ActiveModel {
        narration_id: Set(narration_id),
        url: Set(url.to_string()),
        link_type_id: Set(link_type_id),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to add link");
}

pub async fn create_tag(db: &DatabaseConnection, name: &str, slug: &str) -> tag::Model {
    tag::ActiveModel {
        name: Set(name.to_string()),
        slug: Set(slug.to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to create tag")
}

pub async fn tag_book(db: &DatabaseConnection, book_id: i32, tag_id: i32) {
    book_tags::Entity::insert(book_tags::ActiveModel {
        book_id: Set(book_id),
        tag_id: Set(tag_id),
    })
    .exec_without_returning(db)
    .await
    .expect("Failed to tag book");
}

pub async fn send(app: Router, method: Method, uri: &str) -> (StatusCode, HeaderMap, Vec<u8>) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "audiobooks.test")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = send(app, Method::GET, uri).await;
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("Response is not JSON")
    };
    (status, json)
}

/// Slugs of the `books` array of a listing response.
pub fn slugs(books: &Value) -> Vec<String> {
    books
        .as_array()
        .expect("books array")
        .iter()
        .map(|b| b["slug"].as_str().unwrap().to_string())
        .collect()
}

/// In-memory search backend returning canned hits and recording pushes.
#[derive(Default)]
pub struct FakeIndex {
    pub hits: Vec<SearchHit>,
    pub pushed: Mutex<Vec<IndexRecord>>,
    pub queries: Mutex<Vec<(String, usize)>>,
}

impl FakeIndex {
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Default::default()
        }
    }
}

#[async_trait]
impl SearchIndex for FakeIndex {
    async fn search(&self, query: &str, max_hits: usize) -> Result<Vec<SearchHit>, DomainError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), max_hits));
        Ok(self.hits.iter().take(max_hits).cloned().collect())
    }

    async fn replace_all(&self, records: Vec<IndexRecord>) -> Result<(), DomainError> {
        *self.pushed.lock().unwrap() = records;
        Ok(())
    }
}
