use cm3d::errors::StoreError;
use cm3d::ingest::{load_all, IngestOptions};
use cm3d::query::get_denormalised;
use cm3d::services::StudyService;
use cm3d_test_utils::fixtures::{branching_study_workbook, single_study_workbook};
use cm3d_test_utils::{TempWorkdir, TestDb};
use sea_orm::ConnectionTrait;

#[tokio::test]
async fn test_failed_persist_leaves_nothing_behind() {
    let store = TestDb::new_in_memory().connect().await.unwrap();
    let graph = load_all(&branching_study_workbook("Doomed"), &IngestOptions::default()).unwrap();

    // measurement inserts fail after the study, groups and replicas are written
    store
        .writer()
        .execute_unprepared("DROP TABLE measurements")
        .await
        .unwrap();

    let err = StudyService::new(store.clone())
        .persist(&graph)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Database(_)));

    let studies = store
        .reader()
        .query_one(sea_orm::Statement::from_string(
            sea_orm::DbBackend::Sqlite,
            "SELECT COUNT(*) AS n FROM studies",
        ))
        .await
        .unwrap()
        .unwrap()
        .try_get::<i64>("", "n")
        .unwrap();
    assert_eq!(studies, 0);
}

#[tokio::test]
async fn test_file_store_reader_is_read_only() {
    let dir = TempWorkdir::new().unwrap();
    let path = dir.database_path();
    let store = TestDb::new_file(path.to_string_lossy())
        .connect()
        .await
        .unwrap();

    let graph = load_all(&single_study_workbook("T1", "A1"), &IngestOptions::default()).unwrap();
    let persisted = StudyService::new(store.clone()).persist(&graph).await.unwrap();
    assert_eq!(persisted.counts.measurements, 1);

    assert_eq!(get_denormalised(&store).await.unwrap().len(), 1);
    assert!(store
        .reader()
        .execute_unprepared("DELETE FROM studies")
        .await
        .is_err());
}

#[tokio::test]
async fn test_summary_matches_graph() {
    let store = TestDb::new_in_memory().connect().await.unwrap();
    let graph = load_all(&branching_study_workbook("T2"), &IngestOptions::default()).unwrap();
    let service = StudyService::new(store);

    let persisted = service.persist(&graph).await.unwrap();
    let summary = service.summary(persisted.id).await.unwrap();

    assert_eq!(summary.groups as usize, graph.group_count());
    assert_eq!(summary.biological_replicas as usize, graph.biological_replica_count());
    assert_eq!(summary.measurements as usize, graph.measurement_count());
}
