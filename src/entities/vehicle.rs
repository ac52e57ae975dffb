use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "vehicles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub car_number: String,
    pub brand: String,
    pub kilometers: i32,
    pub cylinder_count: i32,
    pub mesures: String,
    pub ligne: String,
    pub entry_date: Date,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::faulty_part::Entity")]
    FaultyPart,
    #[sea_orm(has_many = "super::vehicle_image::Entity")]
    VehicleImage,
    #[sea_orm(has_many = "super::wheel_image::Entity")]
    WheelImage,
    #[sea_orm(has_many = "super::vehicle_document::Entity")]
    VehicleDocument,
}

impl Related<super::faulty_part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FaultyPart.def()
    }
}

impl Related<super::vehicle_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleImage.def()
    }
}

impl Related<super::wheel_image::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WheelImage.def()
    }
}

impl Related<super::vehicle_document::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::VehicleDocument.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
