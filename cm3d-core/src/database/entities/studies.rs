use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One experimental study, created from the `Study` sheet of an uploaded workbook.
///
/// `uploaded_file` keeps the original workbook bytes for re-download; it is never
/// part of query output.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "studies")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub authors: String,
    pub date_input: Date,
    #[serde(skip)]
    #[sea_orm(column_type = "Binary(BlobSize::Blob(None))", nullable)]
    pub uploaded_file: Option<Vec<u8>>,
    pub added_by: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::groups::Entity")]
    Groups,
}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Groups.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
