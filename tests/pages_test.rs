mod common;

use audiobooks::models::{BookStatus, Language};
use axum::http::{header, Method, StatusCode};
use chrono::Datelike;
use common::*;
use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

#[tokio::test]
async fn test_health_check() {
    let (state, _dir) = setup_test_state().await;

    let (status, json) = get_json(app(&state), "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["database"], "ok");
    assert_eq!(json["service"], "audiobooks");
}

#[tokio::test]
async fn test_home_page_sections() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();

    let proza = create_tag(db, "Сучасная проза", "sucasnaja-proza").await;
    create_tag(db, "Іншае", "inshaje").await;

    let mut books = Vec::new();
    for day in 1..=8 {
        books.push(create_active_book(db, &format!("book-{}", day), date(2022, 5, day)).await);
    }
    let mut promo = books[0].clone().into_active_model();
    promo.promoted = Set(true);
    promo.update(db).await.unwrap();
    tag_book(db, books[1].id, proza.id).await;

    let hidden = create_book(db, "Hidden", "hidden", date(2023, 1, 1), BookStatus::Hidden).await;
    tag_book(db, hidden.id, proza.id).await;

    let (status, json) = get_json(app(&state), "/api/home").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(slugs(&json["promo_books"]), vec!["book-1"]);
    assert_eq!(
        slugs(&json["recently_added_books"]),
        vec!["book-8", "book-7", "book-6", "book-5", "book-4", "book-3"]
    );

    // Only showcased tags that exist are rendered.
    let shelves = json["tags_to_render"].as_array().unwrap();
    assert_eq!(shelves.len(), 1);
    assert_eq!(shelves[0]["slug"], "sucasnaja-proza");
    assert_eq!(slugs(&shelves[0]["books"]), vec!["book-2"]);
}

#[tokio::test]
async fn test_book_detail() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();

    let author = create_person(db, "Якуб Колас", "jakub-kolas").await;
    let translator = create_person(db, "Перакладчык", "pierakladcyk").await;
    let narrator = create_person(db, "Алена Крывая", "alena-kryvaja").await;
    let youtube = create_link_type(db, "youtube").await;
    let tag = create_tag(db, "Класікі", "klasiki").await;

    let book = create_active_book(db, "novaja-ziamlia", date(2021, 3, 4)).await;
    add_author(db, book.id, author.id).await;
    add_translator(db, book.id, translator.id).await;
    tag_book(db, book.id, tag.id).await;
    let narration = create_narration(db, book.id, Language::Russian, false).await;
    add_narrator(db, narration.id, narrator.id).await;
    add_link(db, narration.id, youtube.id, "https://youtube.com/watch?v=1").await;

    let (status, json) = get_json(app(&state), "/api/books/novaja-ziamlia").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["book"]["slug"], "novaja-ziamlia");
    assert_eq!(json["authors"][0]["slug"], "jakub-kolas");
    assert_eq!(json["translators"][0]["slug"], "pierakladcyk");
    assert_eq!(json["tags"][0]["slug"], "klasiki");
    assert_eq!(json["single_language"], "RUSSIAN");
    assert_eq!(json["show_russian_title"], true);

    let narration_json = &json["narrations"][0];
    assert_eq!(narration_json["narrators"][0]["slug"], "alena-kryvaja");
    assert_eq!(narration_json["links"][0]["link_type"], "youtube");
    assert_eq!(narration_json["links"][0]["url"], "https://youtube.com/watch?v=1");
}

#[tokio::test]
async fn test_book_detail_mixed_languages() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();

    let book = create_active_book(db, "vianok", date(2023, 1, 20)).await;
    create_narration(db, book.id, Language::Belarusian, false).await;
    create_narration(db, book.id, Language::Russian, true).await;

    let (status, json) = get_json(app(&state), "/api/books/vianok").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["single_language"].is_null());
    assert_eq!(json["show_russian_title"], false);
    assert_eq!(json["narrations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_book_detail_not_found() {
    let (state, _dir) = setup_test_state().await;
    create_book(state.db(), "Hidden", "hidden", date(2020, 1, 1), BookStatus::Hidden).await;

    let (status, _) = get_json(app(&state), "/api/books/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get_json(app(&state), "/api/books/hidden").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_person_detail_lists_roles() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();

    let kolas = create_person(db, "Якуб Колас", "jakub-kolas").await;
    let knihi = create_link_type(db, "knihi_com").await;
    let youtube = create_link_type(db, "youtube").await;

    let written = create_active_book(db, "written", date(2020, 1, 1)).await;
    add_author(db, written.id, kolas.id).await;
    let n = create_narration(db, written.id, Language::Belarusian, false).await;
    add_link(db, n.id, knihi.id, "https://knihi.com/written").await;

    let translated = create_active_book(db, "translated", date(2021, 1, 1)).await;
    add_translator(db, translated.id, kolas.id).await;
    let n = create_narration(db, translated.id, Language::Belarusian, false).await;
    add_link(db, n.id, youtube.id, "https://youtube.com/translated").await;

    // Narrated twice, listed once.
    let narrated = create_active_book(db, "narrated", date(2022, 1, 1)).await;
    for (language, link_type) in [(Language::Belarusian, &knihi), (Language::Russian, &youtube)] {
        let n = create_narration(db, narrated.id, language, false).await;
        add_narrator(db, n.id, kolas.id).await;
        add_link(db, n.id, link_type.id, "https://example.org/narrated").await;
    }

    let hidden = create_book(db, "Hidden", "hidden", date(2023, 1, 1), BookStatus::Hidden).await;
    add_author(db, hidden.id, kolas.id).await;

    let (status, json) = get_json(app(&state), "/api/people/jakub-kolas").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["person"]["slug"], "jakub-kolas");
    assert_eq!(slugs(&json["authored_books"]), vec!["written"]);
    assert_eq!(slugs(&json["translated_books"]), vec!["translated"]);
    assert_eq!(slugs(&json["narrated_books"]), vec!["narrated"]);

    let (_, json) = get_json(app(&state), "/api/people/jakub-kolas?links=youtube").await;
    assert!(slugs(&json["authored_books"]).is_empty());
    assert_eq!(slugs(&json["translated_books"]), vec!["translated"]);
    assert_eq!(slugs(&json["narrated_books"]), vec!["narrated"]);

    // An empty `links` matches no provider, narrations included.
    let (status, json) = get_json(app(&state), "/api/people/jakub-kolas?links=").await;
    assert_eq!(status, StatusCode::OK);
    assert!(slugs(&json["authored_books"]).is_empty());
    assert!(slugs(&json["translated_books"]).is_empty());
    assert!(slugs(&json["narrated_books"]).is_empty());

    let (status, _) = get_json(app(&state), "/api/people/nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_birthdays_with_contribution_counts() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();

    let today = chrono::Local::now().date_naive();
    let born_today = today.with_year(1960).unwrap_or(date(1960, 2, 28));

    let celebrant = create_person_born(db, "Юбіляр", "jubiliar", Some(born_today)).await;
    create_person(db, "Без даты", "bez-daty").await;
    for i in 1..=40u32 {
        let born = date(1950, 1 + i % 12, 1 + i % 28);
        create_person_born(db, &format!("Person {}", i), &format!("person-{}", i), Some(born)).await;
    }

    let first = create_active_book(db, "first", date(2020, 1, 1)).await;
    let second = create_active_book(db, "second", date(2021, 1, 1)).await;
    add_author(db, first.id, celebrant.id).await;
    add_author(db, second.id, celebrant.id).await;
    add_translator(db, second.id, celebrant.id).await;
    let n = create_narration(db, first.id, Language::Belarusian, false).await;
    add_narrator(db, n.id, celebrant.id).await;

    let (status, json) = get_json(app(&state), "/api/stats/birthdays").await;
    assert_eq!(status, StatusCode::OK);

    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 30);
    assert!(entries.iter().all(|e| e["person"]["slug"] != "bez-daty"));

    let top = &entries[0];
    assert_eq!(top["person"]["slug"], "jubiliar");
    assert_eq!(top["days_left"], 0);
    assert_eq!(top["age"], today.year() - 1960);
    assert_eq!(top["books_authored"], 2);
    assert_eq!(top["books_translated"], 1);
    assert_eq!(top["narrations"], 1);

    let days: Vec<i64> = entries.iter().map(|e| e["days_left"].as_i64().unwrap()).collect();
    assert!(days.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn test_sitemap_lists_public_pages() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();
    create_active_book(db, "novaja-ziamlia", date(2021, 3, 4)).await;
    create_book(db, "Hidden", "hidden", date(2022, 1, 1), BookStatus::Hidden).await;
    create_person(db, "Якуб Колас", "jakub-kolas").await;
    create_tag(db, "Проза", "proza").await;

    let (status, headers, body) = send(app(&state), Method::GET, "/api/sitemap.txt").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let text = String::from_utf8(body).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines,
        vec![
            "http://audiobooks.test/",
            "http://audiobooks.test/about",
            "http://audiobooks.test/catalog",
            "http://audiobooks.test/articles",
            "http://audiobooks.test/books/novaja-ziamlia",
            "http://audiobooks.test/person/jakub-kolas",
            "http://audiobooks.test/catalog/proza",
        ]
    );
}

#[tokio::test]
async fn test_tags_are_listed_by_name() {
    let (state, _dir) = setup_test_state().await;
    let db = state.db();
    create_tag(db, "Проза", "proza").await;
    create_tag(db, "Дзецям", "dzieciam").await;

    let (status, json) = get_json(app(&state), "/api/tags").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["slug"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["dzieciam", "proza"]);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let (state, _dir) = setup_test_state().await;
    let (status, _, _) = send(app(&state), Method::GET, "/api/unknown").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}


#[tokio::test]
async fn test_serve_fails_when_port_is_taken() {
    let (state, _dir) = setup_test_state().await;
    let taken = std::net::TcpListener::bind(("0.0.0.0", 0)).unwrap();
    let port = taken.local_addr().unwrap().port();

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        audiobooks::server::serve(state, port),
    )
    .await
    .expect("serve should return instead of listening elsewhere");

    let err = result.unwrap_err();
    assert!(err.contains(&port.to_string()), "{}", err);
}
