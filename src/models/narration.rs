use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::language::Language;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "narrations")]
pub struct Model {
    #[sea_orm(primary_key)]
    #[serde(skip)]
    pub id: i32,
    #[sea_orm(unique)]
    pub uuid: Uuid,
    pub book_id: i32,
    pub language: Language,
    pub paid: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Book,
    #[sea_orm(has_many = "super::link::Entity")]
    Links,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::link::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Links.def()
    }
}

impl Related<super::person::Entity> for Entity {
    fn to() -> RelationDef {
        super::narration_narrators::Relation::Person.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::narration_narrators::Relation::Narration.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
