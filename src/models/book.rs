use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "HIDDEN")]
    Hidden,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    pub title: String,
    pub title_ru: Option<String>,
    pub description: String,
    pub description_source: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub cover_image: Option<String>,
    pub cover_image_source: String,
    pub date: Date,
    pub duration_sec: Option<i64>,
    pub status: BookStatus,
    pub promoted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::narration::Entity")]
    Narrations,
}

impl Related<super::narration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Narrations.def()
    }
}

impl Related<super::tag::Entity> for Entity {
    fn to() -> RelationDef {
        super::book_tags::Relation::Tag.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::book_tags::Relation::Book.def().rev())
    }
}

/// Book -> authors, through `book_authors`.
#[derive(Debug)]
pub struct BookToAuthors;

impl Linked for BookToAuthors {
    type FromEntity = Entity;
    type ToEntity = super::person::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            super::book_authors::Relation::Book.def().rev(),
            super::book_authors::Relation::Person.def(),
        ]
    }
}

/// Book -> translators, through `book_translators`.
#[derive(Debug)]
pub struct BookToTranslators;

impl Linked for BookToTranslators {
    type FromEntity = Entity;
    type ToEntity = super::person::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            super::book_translators::Relation::Book.def().rev(),
            super::book_translators::Relation::Person.def(),
        ]
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_active(&self) -> bool {
        self.status == BookStatus::Active
    }

    pub fn duration(&self) -> Option<chrono::Duration> {
        self.duration_sec.map(chrono::Duration::seconds)
    }
}
