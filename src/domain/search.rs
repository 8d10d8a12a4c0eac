//! Contract of the hosted full-text search index.
//!
//! The index stores one flat record per searchable entity. Implementations
//! live in `modules::integrations`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::DomainError;

/// One ranked hit returned by the search index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "objectID")]
    pub object_id: String,
    /// Entity kind; anything other than `book`/`person` is ignored downstream.
    #[serde(default)]
    pub model: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl SearchHit {
    pub fn new(model: &str, object_id: impl Into<String>) -> Self {
        Self {
            object_id: object_id.into(),
            model: model.to_string(),
            fields: serde_json::Map::new(),
        }
    }
}

/// Record pushed to the index for an active book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub model: String,
    pub title: String,
    pub title_ru: Option<String>,
    pub slug: String,
    pub authors: Vec<String>,
    pub authors_ru: Vec<Option<String>>,
}

/// Record pushed to the index for a person with at least one active book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRecord {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub model: String,
    pub name: String,
    pub name_ru: Option<String>,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexRecord {
    Book(BookRecord),
    Person(PersonRecord),
}

#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Run a free-text query, returning at most `max_hits` hits by relevance.
    async fn search(&self, query: &str, max_hits: usize) -> Result<Vec<SearchHit>, DomainError>;

    /// Replace the whole content of the index with `records`.
    async fn replace_all(&self, records: Vec<IndexRecord>) -> Result<(), DomainError>;
}
