use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "faulty_part_images")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub faulty_part_id: i32,
    pub image: String,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::faulty_part::Entity",
        from = "Column::FaultyPartId",
        to = "super::faulty_part::Column::Id",
        on_delete = "Cascade"
    )]
    FaultyPart,
}

impl Related<super::faulty_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FaultyPart.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
