use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_groups_study")
                    .table(Groups::Table)
                    .col(Groups::StudyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_biological_replicas_group")
                    .table(BiologicalReplicas::Table)
                    .col(BiologicalReplicas::GroupId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_measurements_biological_replica")
                    .table(Measurements::Table)
                    .col(Measurements::BiologicalReplicaId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_measurements_test_type")
                    .table(Measurements::Table)
                    .col(Measurements::TestType)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in [
            "idx_measurements_test_type",
            "idx_measurements_biological_replica",
            "idx_biological_replicas_group",
            "idx_groups_study",
        ] {
            manager
                .drop_index(Index::drop().name(name).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    StudyId,
}

#[derive(DeriveIden)]
enum BiologicalReplicas {
    Table,
    GroupId,
}

#[derive(DeriveIden)]
enum Measurements {
    Table,
    BiologicalReplicaId,
    TestType,
}
