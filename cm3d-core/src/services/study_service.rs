use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, TransactionTrait,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::database::entities::{biological_replicas, groups, measurements, studies};
use crate::database::store::Store;
use crate::errors::StoreError;
use crate::ingest::StudyGraph;

/// Number of rows stored below one study
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StudyCounts {
    pub groups: u64,
    pub biological_replicas: u64,
    pub measurements: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct PersistedStudy {
    pub id: i32,
    pub counts: StudyCounts,
}

/// A study row without the uploaded workbook
#[derive(Clone, Debug, PartialEq, FromQueryResult, Serialize)]
pub struct StudyListing {
    pub id: i32,
    pub title: String,
    pub authors: String,
    pub date_input: chrono::NaiveDate,
    pub added_by: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct StudyUpdate {
    pub title: Option<String>,
    pub authors: Option<String>,
}

impl StudyUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.authors.is_none()
    }
}

/// Writes study graphs and administers stored studies.
///
/// Writes go through the store's read-write handle; lookups and counts use the
/// read-only handle.
pub struct StudyService {
    store: Store,
}

impl StudyService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Insert the whole graph in one transaction.
    ///
    /// Any failure drops the transaction, which rolls back every row written so far.
    pub async fn persist(&self, graph: &StudyGraph) -> Result<PersistedStudy, StoreError> {
        let txn = self.store.writer().begin().await?;

        let study = studies::ActiveModel {
            title: Set(graph.study.title.clone()),
            authors: Set(graph.study.authors.clone()),
            date_input: Set(graph.study.date_input),
            uploaded_file: Set(graph.study.uploaded_file.clone()),
            added_by: Set(graph.study.added_by.clone()),
            ..Default::default()
        };
        let study_id = studies::Entity::insert(study).exec(&txn).await?.last_insert_id;

        let mut counts = StudyCounts::default();
        for group in &graph.groups {
            let active = groups::ActiveModel {
                study_id: Set(study_id),
                model: Set(group.model.clone()),
                duration: Set(group.duration.clone()),
                protein_treatment: Set(group.protein_treatment.clone()),
                additional_supplementation: Set(group.additional_supplementation.clone()),
                ..Default::default()
            };
            let group_id = groups::Entity::insert(active).exec(&txn).await?.last_insert_id;
            counts.groups += 1;

            for replica in &group.biological_replicas {
                let active = biological_replicas::ActiveModel {
                    group_id: Set(group_id),
                    cell_name: Set(replica.cell_name.clone()),
                    cell_origin: Set(replica.cell_origin.clone()),
                    receptor_expression: Set(replica.receptor_expression.clone()),
                    media_composition: Set(replica.media_composition.clone()),
                    passage_number: Set(replica.passage_number),
                    morphology: Set(replica.morphology.clone()),
                    patient_characteristics: Set(replica.patient_characteristics.clone()),
                    ..Default::default()
                };
                let replica_id = biological_replicas::Entity::insert(active)
                    .exec(&txn)
                    .await?
                    .last_insert_id;
                counts.biological_replicas += 1;

                for measurement in &replica.measurements {
                    let active = measurements::ActiveModel {
                        biological_replica_id: Set(replica_id),
                        method: Set(measurement.method.clone()),
                        time_point: Set(measurement.time_point.clone()),
                        value: Set(measurement.value),
                        unit: Set(measurement.unit.clone()),
                        measurement: Set(measurement.measurement.clone()),
                        test_type: Set(measurement.test_type.clone()),
                        data: Set(Value::Object(measurement.data.clone())),
                        ..Default::default()
                    };
                    measurements::Entity::insert(active).exec(&txn).await?;
                    counts.measurements += 1;
                }
            }
        }

        txn.commit().await?;
        info!(
            "Committed study {} ('{}') with {} groups, {} biological replicas, {} measurements",
            study_id,
            graph.study.title,
            counts.groups,
            counts.biological_replicas,
            counts.measurements
        );

        Ok(PersistedStudy {
            id: study_id,
            counts,
        })
    }

    /// Count what is stored below a study, read back through the read-only handle
    pub async fn summary(&self, study_id: i32) -> Result<StudyCounts, StoreError> {
        let db = self.store.reader();
        self.require(study_id).await?;

        let groups = groups::Entity::find()
            .filter(groups::Column::StudyId.eq(study_id))
            .count(db)
            .await?;

        let biological_replicas = biological_replicas::Entity::find()
            .join(JoinType::InnerJoin, biological_replicas::Relation::Groups.def())
            .filter(groups::Column::StudyId.eq(study_id))
            .count(db)
            .await?;

        let measurements = measurements::Entity::find()
            .join(
                JoinType::InnerJoin,
                measurements::Relation::BiologicalReplicas.def(),
            )
            .join(JoinType::InnerJoin, biological_replicas::Relation::Groups.def())
            .filter(groups::Column::StudyId.eq(study_id))
            .count(db)
            .await?;

        Ok(StudyCounts {
            groups,
            biological_replicas,
            measurements,
        })
    }

    pub async fn list(&self) -> Result<Vec<StudyListing>, StoreError> {
        let studies = studies::Entity::find()
            .select_only()
            .columns([
                studies::Column::Id,
                studies::Column::Title,
                studies::Column::Authors,
                studies::Column::DateInput,
                studies::Column::AddedBy,
            ])
            .order_by_asc(studies::Column::Id)
            .into_model::<StudyListing>()
            .all(self.store.reader())
            .await?;
        Ok(studies)
    }

    pub async fn get(&self, study_id: i32) -> Result<studies::Model, StoreError> {
        studies::Entity::find_by_id(study_id)
            .one(self.store.reader())
            .await?
            .ok_or(StoreError::StudyNotFound(study_id))
    }

    /// The workbook bytes the study was created from
    pub async fn uploaded_file(&self, study_id: i32) -> Result<Vec<u8>, StoreError> {
        self.get(study_id)
            .await?
            .uploaded_file
            .ok_or(StoreError::NoUploadedFile(study_id))
    }

    pub async fn update(
        &self,
        study_id: i32,
        changes: StudyUpdate,
    ) -> Result<studies::Model, StoreError> {
        let existing = studies::Entity::find_by_id(study_id)
            .one(self.store.writer())
            .await?
            .ok_or(StoreError::StudyNotFound(study_id))?;
        if changes.is_empty() {
            return Ok(existing);
        }

        let mut active: studies::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(authors) = changes.authors {
            active.authors = Set(authors);
        }
        let updated = active.update(self.store.writer()).await?;
        info!("Updated study {}", study_id);
        Ok(updated)
    }

    /// Delete a study; its groups, replicas and measurements go with it
    pub async fn delete(&self, study_id: i32) -> Result<(), StoreError> {
        let result = studies::Entity::delete_by_id(study_id)
            .exec(self.store.writer())
            .await?;
        if result.rows_affected == 0 {
            return Err(StoreError::StudyNotFound(study_id));
        }
        info!("Deleted study {}", study_id);
        Ok(())
    }

    async fn require(&self, study_id: i32) -> Result<(), StoreError> {
        let found = studies::Entity::find_by_id(study_id)
            .select_only()
            .column(studies::Column::Id)
            .into_tuple::<i32>()
            .one(self.store.reader())
            .await?;
        debug!("Looked up study {}: {}", study_id, found.is_some());
        found.map(|_| ()).ok_or(StoreError::StudyNotFound(study_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_utils::setup_test_store;
    use crate::ingest::{NewBiologicalReplica, NewGroup, NewMeasurement, NewStudy};
    use chrono::NaiveDate;
    use serde_json::{json, Map};

    fn graph() -> StudyGraph {
        let mut data = Map::new();
        data.insert("Plate".to_string(), json!(2));
        StudyGraph {
            study: NewStudy {
                title: "T1".to_string(),
                authors: "A1".to_string(),
                date_input: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
                uploaded_file: Some(vec![1, 2, 3]),
                added_by: None,
            },
            groups: vec![
                NewGroup {
                    model: Some("m".to_string()),
                    biological_replicas: vec![NewBiologicalReplica {
                        cell_name: Some("C1".to_string()),
                        passage_number: Some(4),
                        measurements: vec![
                            NewMeasurement {
                                value: Some(5.0),
                                test_type: "Assay".to_string(),
                                data,
                                ..Default::default()
                            },
                            NewMeasurement {
                                value: Some(6.0),
                                test_type: "Assay".to_string(),
                                ..Default::default()
                            },
                        ],
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                NewGroup::default(),
            ],
        }
    }

    #[tokio::test]
    async fn test_persist_and_summary() {
        let service = StudyService::new(setup_test_store().await);
        let persisted = service.persist(&graph()).await.unwrap();

        let expected = StudyCounts {
            groups: 2,
            biological_replicas: 1,
            measurements: 2,
        };
        assert_eq!(persisted.counts, expected);
        assert_eq!(service.summary(persisted.id).await.unwrap(), expected);
    }

    #[tokio::test]
    async fn test_list_and_uploaded_file() {
        let service = StudyService::new(setup_test_store().await);
        let first = service.persist(&graph()).await.unwrap();
        let mut second = graph();
        second.study.title = "T2".to_string();
        second.study.uploaded_file = None;
        let second = service.persist(&second).await.unwrap();

        let listed = service.list().await.unwrap();
        let titles: Vec<_> = listed.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["T1", "T2"]);

        assert_eq!(service.uploaded_file(first.id).await.unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            service.uploaded_file(second.id).await,
            Err(StoreError::NoUploadedFile(_))
        ));
    }

    #[tokio::test]
    async fn test_update_study() {
        let service = StudyService::new(setup_test_store().await);
        let persisted = service.persist(&graph()).await.unwrap();

        let updated = service
            .update(
                persisted.id,
                StudyUpdate {
                    title: Some("Renamed".to_string()),
                    authors: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.authors, "A1");
    }

    #[tokio::test]
    async fn test_delete_cascades() {
        let service = StudyService::new(setup_test_store().await);
        let persisted = service.persist(&graph()).await.unwrap();

        service.delete(persisted.id).await.unwrap();
        assert!(service.get(persisted.id).await.unwrap_err().is_not_found());

        let db = service.store.reader();
        assert_eq!(groups::Entity::find().count(db).await.unwrap(), 0);
        assert_eq!(biological_replicas::Entity::find().count(db).await.unwrap(), 0);
        assert_eq!(measurements::Entity::find().count(db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_study() {
        let service = StudyService::new(setup_test_store().await);
        assert!(matches!(
            service.delete(99).await,
            Err(StoreError::StudyNotFound(99))
        ));
        assert!(matches!(
            service.summary(99).await,
            Err(StoreError::StudyNotFound(99))
        ));
    }
}
