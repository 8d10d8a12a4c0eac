use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub narration_id: i32,
    pub url: String,
    pub link_type_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::narration::Entity",
        from = "Column::NarrationId",
        to = "super::narration::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Narration,
    #[sea_orm(
        belongs_to = "super::link_type::Entity",
        from = "Column::LinkTypeId",
        to = "super::link_type::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    LinkType,
}

impl Related<super::narration::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Narration.def()
    }
}

impl Related<super::link_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LinkType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
