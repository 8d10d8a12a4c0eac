//! Catalog Service - filtered, paginated book listings and the home page
//!
//! Every filter is an independent `books.id IN (...)` condition, so
//! combining them is an AND and a book never appears twice.

use sea_orm::sea_query::{Query, SelectStatement};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Iterable, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use serde::Serialize;

use super::book_service::{book_cards, BookCard};
use super::link_filter::{active_books, filter_books, parse_link_types};
use super::pagination::{related_pages, PageInfo, Paginator, QueryParams, RelatedPages};
use crate::domain::DomainError;
use crate::models::{book, book_tags, narration, tag, Language};

pub const BOOKS_PER_PAGE: u64 = 16;
pub const RECENT_BOOKS_ON_HOME: u64 = 6;

/// Tags given their own shelf on the home page.
pub const TAGS_TO_SHOW_ON_MAIN_PAGE: [&str; 3] = [
    "Сучасная проза",
    "Класікі беларускай літаратуры",
    "Дзецям і падлеткам",
];

/// One entry of a filter drop-down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl FilterOption {
    fn new(value: &str, label: &str, selected: bool) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
            selected,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub books: Vec<BookCard>,
    pub page: PageInfo,
    pub related_pages: RelatedPages,
    pub selected_tag: Option<tag::Model>,
    pub tags: Vec<tag::Model>,
    /// Current query string without `page`, `?`-prefixed or empty.
    pub query_params: String,
    pub language_options: Vec<FilterOption>,
    pub price_options: Vec<FilterOption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TagShelf {
    pub name: String,
    pub slug: String,
    pub books: Vec<BookCard>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub promo_books: Vec<BookCard>,
    pub recently_added_books: Vec<BookCard>,
    pub tags_to_render: Vec<TagShelf>,
}

/// `SELECT book_tags.book_id` for one tag.
pub fn books_with_tag(tag_id: i32) -> SelectStatement {
    Query::select()
        .column(book_tags::Column::BookId)
        .from(book_tags::Entity)
        .and_where(book_tags::Column::TagId.eq(tag_id))
        .to_owned()
}

fn books_with_narrations(condition: sea_orm::sea_query::SimpleExpr) -> SelectStatement {
    Query::select()
        .column(narration::Column::BookId)
        .from(narration::Entity)
        .and_where(condition)
        .to_owned()
}

/// Value of a parameter, treating an empty string as absent.
fn non_empty<'a>(params: &'a QueryParams, key: &str) -> Option<&'a str> {
    params.get(key).filter(|v| !v.is_empty())
}

pub fn language_options(selected: Option<&str>) -> Vec<FilterOption> {
    let selected = selected.map(str::to_lowercase);
    let mut options = vec![FilterOption::new("", "любая", selected.is_none())];
    for language in Language::iter() {
        let value = language.code().to_lowercase();
        let is_selected = selected.as_deref() == Some(value.as_str());
        options.push(FilterOption::new(&value, language.human_name(), is_selected));
    }
    options
}

pub fn price_options(selected: Option<&str>) -> Vec<FilterOption> {
    vec![
        FilterOption::new("", "усе", selected.is_none()),
        FilterOption::new("true", "платныя", selected == Some("true")),
        FilterOption::new("false", "бясплатныя", selected == Some("false")),
    ]
}

/// One page of the catalog, optionally restricted to the tag `tag_slug`.
///
/// `path` is the request path the page links are built on.
pub async fn get_catalog_page(
    db: &DatabaseConnection,
    tag_slug: Option<&str>,
    path: &str,
    params: &QueryParams,
) -> Result<CatalogPage, DomainError> {
    let tags = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(db)
        .await?;

    let selected_tag = match tag_slug {
        Some(slug) => Some(
            tags.iter()
                .find(|t| t.slug == slug)
                .cloned()
                .ok_or_else(|| DomainError::NotFound(format!("Tag '{}'", slug)))?,
        ),
        None => None,
    };

    let link_types = parse_link_types(params.get("links"));
    let mut query = filter_books(active_books(), link_types.as_deref());

    if let Some(tag) = &selected_tag {
        query = query.filter(book::Column::Id.in_subquery(books_with_tag(tag.id)));
    }

    let lang = non_empty(params, "lang");
    if let Some(code) = lang {
        query = match Language::from_code(code) {
            Some(language) => query.filter(book::Column::Id.in_subquery(books_with_narrations(
                narration::Column::Language.eq(language),
            ))),
            None => {
                tracing::debug!("Unknown language filter '{}'", code);
                query.filter(book::Column::Id.is_in(Vec::<i32>::new()))
            }
        };
    }

    let paid = non_empty(params, "paid");
    if let Some(paid) = paid {
        query = query.filter(book::Column::Id.in_subquery(books_with_narrations(
            narration::Column::Paid.eq(paid == "true"),
        )));
    }

    let query = query
        .order_by_desc(book::Column::Date)
        .order_by_desc(book::Column::Id);

    let count = query.clone().count(db).await?;
    let page = Paginator::new(count, BOOKS_PER_PAGE).page(params.get("page"));

    let books = query
        .offset(page.offset())
        .limit(page.per_page)
        .all(db)
        .await?;

    tracing::info!(
        "Catalog page {}/{} ({} matching books, tag={:?}, lang={:?}, paid={:?}, links={:?})",
        page.number,
        page.num_pages,
        count,
        tag_slug,
        lang,
        paid,
        link_types
    );

    Ok(CatalogPage {
        books: book_cards(db, books).await?,
        related_pages: related_pages(path, params, &page),
        page,
        selected_tag,
        tags,
        query_params: params.without("page").to_query_string(),
        language_options: language_options(lang),
        price_options: price_options(paid),
    })
}

/// Data of the start page.
pub async fn get_home_page(db: &DatabaseConnection) -> Result<HomePage, DomainError> {
    let promo = active_books()
        .filter(book::Column::Promoted.eq(true))
        .order_by_desc(book::Column::Date)
        .all(db)
        .await?;

    let recent = active_books()
        .order_by_desc(book::Column::Date)
        .order_by_desc(book::Column::Id)
        .limit(RECENT_BOOKS_ON_HOME)
        .all(db)
        .await?;

    let showcase_tags = tag::Entity::find()
        .filter(tag::Column::Name.is_in(TAGS_TO_SHOW_ON_MAIN_PAGE))
        .all(db)
        .await?;

    let mut tags_to_render = Vec::with_capacity(showcase_tags.len());
    for name in TAGS_TO_SHOW_ON_MAIN_PAGE {
        let Some(tag) = showcase_tags.iter().find(|t| t.name == name) else {
            tracing::warn!("Home page tag '{}' is missing from DB", name);
            continue;
        };
        let books = active_books()
            .filter(book::Column::Id.in_subquery(books_with_tag(tag.id)))
            .order_by_desc(book::Column::Date)
            .all(db)
            .await?;
        tags_to_render.push(TagShelf {
            name: tag.name.clone(),
            slug: tag.slug.clone(),
            books: book_cards(db, books).await?,
        });
    }

    Ok(HomePage {
        promo_books: book_cards(db, promo).await?,
        recently_added_books: book_cards(db, recent).await?,
        tags_to_render,
    })
}
