use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One observed value for a biological replica.
///
/// `test_type` is the suffix of the `Test-` sheet the row came from. `data` holds
/// every extra column of that sheet as a JSON object (column name -> scalar).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "measurements")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub biological_replica_id: i32,
    pub method: Option<String>,
    pub time_point: Option<String>,
    #[sea_orm(column_type = "Double", nullable)]
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub measurement: Option<String>,
    pub test_type: String,
    #[sea_orm(column_type = "Json")]
    pub data: Json,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::biological_replicas::Entity",
        from = "Column::BiologicalReplicaId",
        to = "super::biological_replicas::Column::Id",
        on_delete = "Cascade"
    )]
    BiologicalReplicas,
}

impl Related<super::biological_replicas::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BiologicalReplicas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
