pub mod book;
pub mod book_authors;
pub mod book_tags;
pub mod book_translators;
pub mod language;
pub mod link;
pub mod link_type;
pub mod narration;
pub mod narration_narrators;
pub mod person;
pub mod tag;

pub use book::BookStatus;
pub use language::Language;
pub use person::Gender;
