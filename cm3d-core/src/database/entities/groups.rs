use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Experimental treatment group of a study
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub study_id: i32,
    pub model: Option<String>,
    pub duration: Option<String>,
    pub protein_treatment: Option<String>,
    pub additional_supplementation: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::studies::Entity",
        from = "Column::StudyId",
        to = "super::studies::Column::Id",
        on_delete = "Cascade"
    )]
    Studies,
    #[sea_orm(has_many = "super::biological_replicas::Entity")]
    BiologicalReplicas,
}

impl Related<super::studies::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Studies.def()
    }
}

impl Related<super::biological_replicas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BiologicalReplicas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
