use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Studies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Studies::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Studies::Title).string().not_null())
                    .col(ColumnDef::new(Studies::Authors).string().not_null())
                    .col(ColumnDef::new(Studies::DateInput).date().not_null())
                    .col(ColumnDef::new(Studies::UploadedFile).binary().null())
                    .col(ColumnDef::new(Studies::AddedBy).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Groups::StudyId).integer().not_null())
                    .col(ColumnDef::new(Groups::Model).string().null())
                    .col(ColumnDef::new(Groups::Duration).string().null())
                    .col(ColumnDef::new(Groups::ProteinTreatment).string().null())
                    .col(
                        ColumnDef::new(Groups::AdditionalSupplementation)
                            .string()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_groups_study")
                            .from(Groups::Table, Groups::StudyId)
                            .to(Studies::Table, Studies::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BiologicalReplicas::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BiologicalReplicas::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BiologicalReplicas::GroupId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BiologicalReplicas::CellName).string().null())
                    .col(
                        ColumnDef::new(BiologicalReplicas::CellOrigin)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BiologicalReplicas::ReceptorExpression)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BiologicalReplicas::MediaComposition)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BiologicalReplicas::PassageNumber)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BiologicalReplicas::Morphology)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(BiologicalReplicas::PatientCharacteristics)
                            .string()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_biological_replicas_group")
                            .from(BiologicalReplicas::Table, BiologicalReplicas::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Measurements::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Measurements::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Measurements::BiologicalReplicaId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Measurements::Method).string().null())
                    .col(ColumnDef::new(Measurements::TimePoint).string().null())
                    .col(ColumnDef::new(Measurements::Value).double().null())
                    .col(ColumnDef::new(Measurements::Unit).string().null())
                    .col(ColumnDef::new(Measurements::Measurement).string().null())
                    .col(ColumnDef::new(Measurements::TestType).string().not_null())
                    .col(ColumnDef::new(Measurements::Data).json().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_measurements_biological_replica")
                            .from(Measurements::Table, Measurements::BiologicalReplicaId)
                            .to(BiologicalReplicas::Table, BiologicalReplicas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Measurements::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BiologicalReplicas::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Studies::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Studies {
    Table,
    Id,
    Title,
    Authors,
    DateInput,
    UploadedFile,
    AddedBy,
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    Id,
    StudyId,
    Model,
    Duration,
    ProteinTreatment,
    AdditionalSupplementation,
}

#[derive(DeriveIden)]
enum BiologicalReplicas {
    Table,
    Id,
    GroupId,
    CellName,
    CellOrigin,
    ReceptorExpression,
    MediaComposition,
    PassageNumber,
    Morphology,
    PatientCharacteristics,
}

#[derive(DeriveIden)]
enum Measurements {
    Table,
    Id,
    BiologicalReplicaId,
    Method,
    TimePoint,
    Value,
    Unit,
    Measurement,
    TestType,
    Data,
}
