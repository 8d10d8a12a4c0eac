//! Narrowing books and narrations by the providers hosting them.
//!
//! `?links=knihi_com,youtube` keeps only entries with at least one link whose
//! type name is in the list. Without the parameter the query is returned
//! untouched; an empty or unknown name matches nothing.

use sea_orm::sea_query::{Expr, Query, SelectStatement};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Select};

use crate::models::{book, link, link_type, narration};

/// Split the raw `links` parameter into link type names.
pub fn parse_link_types(raw: Option<&str>) -> Option<Vec<String>> {
    raw.map(|raw| raw.split(',').map(|name| name.trim().to_string()).collect())
}

/// `SELECT links.narration_id` for links of the given types.
fn narrations_with_link_types(link_types: &[String]) -> SelectStatement {
    Query::select()
        .column((link::Entity, link::Column::NarrationId))
        .from(link::Entity)
        .inner_join(
            link_type::Entity,
            Expr::col((link_type::Entity, link_type::Column::Id))
                .equals((link::Entity, link::Column::LinkTypeId)),
        )
        .and_where(Expr::col((link_type::Entity, link_type::Column::Name)).is_in(link_types.to_vec()))
        .to_owned()
}

/// Keep books having a narration with a link of one of `link_types`.
pub fn filter_books(
    query: Select<book::Entity>,
    link_types: Option<&[String]>,
) -> Select<book::Entity> {
    let Some(link_types) = link_types else {
        return query;
    };

    let books_with_links = Query::select()
        .column(narration::Column::BookId)
        .from(narration::Entity)
        .and_where(narration::Column::Id.in_subquery(narrations_with_link_types(link_types)))
        .to_owned();

    query.filter(book::Column::Id.in_subquery(books_with_links))
}

/// Keep narrations having a link of one of `link_types`.
pub fn filter_narrations(
    query: Select<narration::Entity>,
    link_types: Option<&[String]>,
) -> Select<narration::Entity> {
    match link_types {
        Some(link_types) => query.filter(
            narration::Column::Id.in_subquery(narrations_with_link_types(link_types)),
        ),
        None => query,
    }
}

/// Books of the catalog that a user may see.
pub fn active_books() -> Select<book::Entity> {
    book::Entity::find().filter(book::Column::Status.eq(book::BookStatus::Active))
}
