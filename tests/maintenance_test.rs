mod common;

use std::sync::Arc;

use audiobooks::domain::IndexRecord;
use audiobooks::models::{BookStatus, Language};
use axum::http::{Method, StatusCode};
use common::*;

const TAG_ROUTE: &str = "/api/maintenance/update-read-by-author-tag";

async fn read_by_author_slugs(state: &audiobooks::AppState) -> Vec<String> {
    let (status, json) = get_json(app(state), "/api/catalog/cytaje-autar").await;
    assert_eq!(status, StatusCode::OK);
    let mut found = slugs(&json["books"]);
    found.sort();
    found
}

#[tokio::test]
async fn test_read_by_author_tag_missing_is_server_error() {
    let (state, _dir) = setup_test_state().await;

    let (status, _, body) = send(app(&state), Method::POST, TAG_ROUTE).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Tag cytaje-autar is missing from DB"));
}

#[tokio::test]
async fn test_read_by_author_tag_recompute() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();
    let tag = create_tag(db, "Чытае аўтар", "cytaje-autar").await;

    let kolas = create_person(db, "Якуб Колас", "jakub-kolas").await;
    let reader = create_person(db, "Алена Крывая", "alena-kryvaja").await;

    // Narrated by its author.
    let own = create_active_book(db, "own-voice", date(2021, 1, 1)).await;
    add_author(db, own.id, kolas.id).await;
    let n = create_narration(db, own.id, Language::Belarusian, false).await;
    add_narrator(db, n.id, kolas.id).await;

    // Narrated by someone else, but wrongly tagged beforehand.
    let other = create_active_book(db, "other-voice", date(2022, 1, 1)).await;
    add_author(db, other.id, kolas.id).await;
    let n = create_narration(db, other.id, Language::Belarusian, false).await;
    add_narrator(db, n.id, reader.id).await;
    tag_book(db, other.id, tag.id).await;

    // Author narrates one of two narrations.
    let mixed = create_active_book(db, "mixed-voices", date(2023, 1, 1)).await;
    add_author(db, mixed.id, reader.id).await;
    let n = create_narration(db, mixed.id, Language::Belarusian, false).await;
    add_narrator(db, n.id, kolas.id).await;
    let n = create_narration(db, mixed.id, Language::Russian, true).await;
    add_narrator(db, n.id, reader.id).await;

    assert_eq!(read_by_author_slugs(&state).await, vec!["other-voice"]);

    let (status, _, _) = send(app(&state), Method::GET, TAG_ROUTE).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(read_by_author_slugs(&state).await, vec!["mixed-voices", "own-voice"]);

    // Running again changes nothing.
    let (status, _, _) = send(app(&state), Method::POST, TAG_ROUTE).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(read_by_author_slugs(&state).await, vec!["mixed-voices", "own-voice"]);
}

#[tokio::test]
async fn test_push_search_index_without_config_is_unavailable() {
    let (state, _dir) = setup_test_state().await;

    let (status, _, body) =
        send(app(&state), Method::POST, "/api/maintenance/push-search-index").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("Search keys are not set"));
}

#[tokio::test]
async fn test_push_search_index_sends_active_catalog() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();

    let author = create_person(db, "Якуб Колас", "jakub-kolas").await;
    create_person(db, "Нікога", "nikoha").await;
    let book = create_active_book(db, "novaja-ziamlia", date(2021, 3, 4)).await;
    add_author(db, book.id, author.id).await;
    create_book(db, "Hidden", "hidden", date(2022, 1, 1), BookStatus::Hidden).await;

    let index = Arc::new(FakeIndex::default());
    let state = state.with_search(index.clone());

    let (status, _, _) = send(app(&state), Method::GET, "/api/maintenance/push-search-index").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let pushed = index.pushed.lock().unwrap().clone();
    assert_eq!(pushed.len(), 2);
    match &pushed[0] {
        IndexRecord::Book(record) => {
            assert_eq!(record.object_id, book.uuid.to_string());
            assert_eq!(record.model, "book");
            assert_eq!(record.slug, "novaja-ziamlia");
            assert_eq!(record.authors, vec!["Якуб Колас".to_string()]);
        }
        other => panic!("expected a book record, got {:?}", other),
    }
    match &pushed[1] {
        IndexRecord::Person(record) => {
            assert_eq!(record.object_id, author.uuid.to_string());
            assert_eq!(record.model, "person");
        }
        other => panic!("expected a person record, got {:?}", other),
    }
}
