use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Deserialize, Serialize)]
#[sea_orm(table_name = "cycles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub control_type: ControlType,
    pub date: Date,
    #[sea_orm(unique)]
    pub cycle_id: String,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(
    EnumIter, DeriveActiveEnum, Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize,
    utoipa::ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ControlType {
    #[sea_orm(string_value = "mutation")]
    Mutation,
    #[sea_orm(string_value = "parc_neuf")]
    ParcNeuf,
    #[sea_orm(string_value = "duplicata")]
    Duplicata,
}

impl ControlType {
    /// Stored value, also used as the leading storage path segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlType::Mutation => "mutation",
            ControlType::ParcNeuf => "parc_neuf",
            ControlType::Duplicata => "duplicata",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "mutation" => Some(ControlType::Mutation),
            "parc_neuf" => Some(ControlType::ParcNeuf),
            "duplicata" => Some(ControlType::Duplicata),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cycle_attachment::Entity")]
    Attachment,
}

impl Related<super::cycle_attachment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attachment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
