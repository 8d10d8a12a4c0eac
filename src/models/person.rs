use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    #[sea_orm(string_value = "MALE")]
    Male,
    #[sea_orm(string_value = "FEMALE")]
    Female,
    #[sea_orm(string_value = "PLURAL")]
    Plural,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "people")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    pub name: String,
    pub name_ru: Option<String>,
    #[sea_orm(unique)]
    pub slug: String,
    pub gender: Gender,
    pub date_of_birth: Option<Date>,
    pub description: String,
    pub description_source: String,
    pub photo: Option<String>,
    pub photo_source: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

/// Person -> authored books, through `book_authors`.
#[derive(Debug)]
pub struct PersonToAuthoredBooks;

impl Linked for PersonToAuthoredBooks {
    type FromEntity = Entity;
    type ToEntity = super::book::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            super::book_authors::Relation::Person.def().rev(),
            super::book_authors::Relation::Book.def(),
        ]
    }
}

/// Person -> translated books, through `book_translators`.
#[derive(Debug)]
pub struct PersonToTranslatedBooks;

impl Linked for PersonToTranslatedBooks {
    type FromEntity = Entity;
    type ToEntity = super::book::Entity;

    fn link(&self) -> Vec<RelationDef> {
        vec![
            super::book_translators::Relation::Person.def().rev(),
            super::book_translators::Relation::Book.def(),
        ]
    }
}

impl Related<super::narration::Entity> for Entity {
    fn to() -> RelationDef {
        super::narration_narrators::Relation::Narration.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::narration_narrators::Relation::Person.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
