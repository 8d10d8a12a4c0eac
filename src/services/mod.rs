//! Services Layer
//!
//! Catalog logic independent of the HTTP layer. Handlers and the command
//! line both call into these functions.

pub mod birthday_service;
pub mod book_service;
pub mod catalog_service;
pub mod export_service;
pub mod indexing_service;
pub mod link_filter;
pub mod pagination;
pub mod person_service;
pub mod search_service;
pub mod tag_service;

pub use link_filter::active_books;
pub use pagination::{PageInfo, Paginator, QueryParams, RelatedPages};
