mod common;

use std::sync::Arc;
use std::time::Duration;

use audiobooks::config::SearchConfig;
use audiobooks::domain::search::{BookRecord, PersonRecord};
use audiobooks::domain::{DomainError, IndexRecord, SearchHit, SearchIndex};
use audiobooks::models::BookStatus;
use audiobooks::modules::integrations::AlgoliaClient;
use axum::http::StatusCode;
use common::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_empty_query_returns_no_results_without_search_config() {
    let (state, _dir) = setup_test_state().await;

    let (status, json) = get_json(app(&state), "/api/search?query=%20%20").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query"], "");
    assert_eq!(json["results"], json!([]));

    let (status, _) = get_json(app(&state), "/api/search").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_search_without_config_is_unavailable() {
    let (state, _dir) = setup_test_state().await;

    let (status, json) = get_json(app(&state), "/api/search?query=kolas").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(json["error"].as_str().unwrap().contains("Search keys are not set"));
}

#[tokio::test]
async fn test_search_resolves_hits_in_relevance_order() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();

    let author = create_person(db, "Якуб Колас", "jakub-kolas").await;
    let narrator = create_person(db, "Алена Крывая", "alena-kryvaja").await;
    let first = create_active_book(db, "novaja-ziamlia", date(2021, 3, 4)).await;
    let second = create_active_book(db, "symon-muzyka", date(2022, 6, 11)).await;
    let hidden = create_book(db, "Hidden", "hidden", date(2022, 1, 1), BookStatus::Hidden).await;
    add_author(db, first.id, author.id).await;

    let index = Arc::new(FakeIndex::with_hits(vec![
        SearchHit::new("person", narrator.uuid.to_string()),
        SearchHit::new("book", uuid::Uuid::new_v4().to_string()),
        SearchHit::new("book", second.uuid.to_string()),
        SearchHit::new("article", "42"),
        SearchHit::new("book", hidden.uuid.to_string()),
        SearchHit::new("book", "not-a-uuid"),
        SearchHit::new("book", first.uuid.to_string()),
    ]));
    let state = state.with_search(index.clone());

    let (status, json) = get_json(app(&state), "/api/search?query=kolas").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["query"], "kolas");

    let results = json["results"].as_array().unwrap();
    let kinds: Vec<&str> = results.iter().map(|r| r["type"].as_str().unwrap()).collect();
    let found: Vec<&str> = results
        .iter()
        .map(|r| r["object"]["slug"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["person", "book", "book"]);
    assert_eq!(found, vec!["alena-kryvaja", "symon-muzyka", "novaja-ziamlia"]);
    assert_eq!(results[2]["object"]["authors"][0]["slug"], "jakub-kolas");

    let queries = index.queries.lock().unwrap().clone();
    assert_eq!(queries, vec![("kolas".to_string(), 100)]);
}

#[tokio::test]
async fn test_search_keeps_at_most_fifty_results() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();

    let mut hits = Vec::new();
    for i in 0..60 {
        let person = create_person(db, &format!("Person {}", i), &format!("person-{}", i)).await;
        hits.push(SearchHit::new("person", person.uuid.to_string()));
    }
    let state = state.with_search(Arc::new(FakeIndex::with_hits(hits)));

    let (status, json) = get_json(app(&state), "/api/search?query=person").await;
    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 50);
    assert_eq!(results[0]["object"]["slug"], "person-0");
    assert_eq!(results[49]["object"]["slug"], "person-49");
}

fn mock_config(server: &MockServer) -> SearchConfig {
    SearchConfig {
        application_id: "TESTAPP".to_string(),
        index: "books".to_string(),
        search_key: Some("search-key".to_string()),
        modify_key: Some("modify-key".to_string()),
        host: Some(server.uri()),
    }
}

fn mock_client(config: SearchConfig) -> AlgoliaClient {
    AlgoliaClient::new(config)
        .unwrap()
        .with_timings(3, Duration::from_millis(1), Duration::from_millis(1))
}

#[tokio::test]
async fn test_algolia_search_sends_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/books/query"))
        .and(header("X-Algolia-Application-Id", "TESTAPP"))
        .and(header("X-Algolia-API-Key", "search-key"))
        .and(body_partial_json(json!({ "query": "kolas", "hitsPerPage": 100 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": [
                { "objectID": "a", "model": "book", "title": "Новая зямля" },
                { "objectID": "b", "model": "person", "name": "Якуб Колас" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(mock_config(&server));
    let hits = client.search("kolas", 100).await.unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].object_id, "a");
    assert_eq!(hits[0].model, "book");
    assert_eq!(hits[1].model, "person");
}

#[tokio::test]
async fn test_algolia_search_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/books/query"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/books/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "hits": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = mock_client(mock_config(&server));
    let hits = client.search("kolas", 100).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_algolia_search_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/1/indexes/books/query"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = mock_client(mock_config(&server));
    let result = client.search("kolas", 100).await;
    assert!(matches!(result, Err(DomainError::External(_))));
}

#[tokio::test]
async fn test_algolia_replace_all_swaps_index() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1/indexes/books/operation"))
        .and(header("X-Algolia-API-Key", "modify-key"))
        .and(body_partial_json(json!({ "operation": "copy" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "taskID": 1 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/1/indexes/books_tmp_[0-9a-f]+/batch$"))
        .and(body_partial_json(json!({
            "requests": [
                { "action": "addObject", "body": { "objectID": "b1", "model": "book" } },
                { "action": "addObject", "body": { "objectID": "p1", "model": "person" } }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "taskID": 2 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/1/indexes/books_tmp_[0-9a-f]+/operation$"))
        .and(body_partial_json(json!({ "operation": "move", "destination": "books" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "taskID": 3 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/1/indexes/[^/]+/task/[0-9]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "published" })))
        .expect(3)
        .mount(&server)
        .await;

    let records = vec![
        IndexRecord::Book(BookRecord {
            object_id: "b1".to_string(),
            model: "book".to_string(),
            title: "Новая зямля".to_string(),
            title_ru: None,
            slug: "novaja-ziamlia".to_string(),
            authors: vec!["Якуб Колас".to_string()],
            authors_ru: vec![None],
        }),
        IndexRecord::Person(PersonRecord {
            object_id: "p1".to_string(),
            model: "person".to_string(),
            name: "Якуб Колас".to_string(),
            name_ru: None,
            slug: "jakub-kolas".to_string(),
        }),
    ];

    let client = mock_client(mock_config(&server));
    client.replace_all(records).await.unwrap();
}

#[tokio::test]
async fn test_algolia_replace_all_requires_modify_key() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = SearchConfig {
        modify_key: None,
        ..mock_config(&server)
    };
    let client = mock_client(config);

    let result = client.replace_all(Vec::new()).await;
    assert!(matches!(result, Err(DomainError::Configuration(_))));
}
