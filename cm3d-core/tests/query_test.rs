use cm3d::errors::QueryError;
use cm3d::ingest::{
    load_all, IngestOptions, NewBiologicalReplica, NewGroup, NewMeasurement, NewStudy, StudyGraph,
};
use cm3d::query::{get_denormalised, get_filtered};
use cm3d::services::StudyService;
use cm3d::Store;
use cm3d_test_utils::fixtures::{branching_study_workbook, single_study_workbook};
use cm3d_test_utils::TestDb;
use serde_json::json;

async fn store_with(workbooks: &[cm3d::workbook::Workbook]) -> (Store, Vec<i32>) {
    let store = TestDb::new_in_memory().connect().await.unwrap();
    let service = StudyService::new(store.clone());
    let mut ids = Vec::new();
    for workbook in workbooks {
        let graph = load_all(workbook, &IngestOptions::default()).unwrap();
        ids.push(service.persist(&graph).await.unwrap().id);
    }
    (store, ids)
}

#[tokio::test]
async fn test_single_study_round_trip() {
    let (store, _) = store_with(&[single_study_workbook("T1", "A1")]).await;

    let set = get_denormalised(&store).await.unwrap();
    assert_eq!(set.len(), 1);

    let row = &set.records[0];
    assert_eq!(row.get("study.title"), Some(&json!("T1")));
    assert_eq!(row.get("study.authors"), Some(&json!("A1")));
    assert_eq!(row.get("group.model"), Some(&json!("m")));
    assert_eq!(row.get("biological_replica.cell_name"), Some(&json!("C1")));
    assert_eq!(
        row.get("measurement.value").and_then(|v| v.as_f64()),
        Some(5.0)
    );
    assert!(!row.contains_key("study.uploaded_file"));
}

#[tokio::test]
async fn test_row_count_follows_join_cardinality() {
    let (store, _) = store_with(&[branching_study_workbook("Branching")]).await;

    // replica 1 has two measurements, replicas 2-4 have none
    let set = get_denormalised(&store).await.unwrap();
    assert_eq!(set.len(), 5);

    let without_measurement = set
        .iter()
        .filter(|r| !r.contains_key("measurement.id"))
        .count();
    assert_eq!(without_measurement, 3);
}

#[tokio::test]
async fn test_study_without_groups_yields_one_row() {
    let store = TestDb::new_in_memory().connect().await.unwrap();
    let graph = StudyGraph {
        study: NewStudy {
            title: "Empty".to_string(),
            authors: "Nobody".to_string(),
            date_input: chrono::NaiveDate::from_ymd_opt(2024, 2, 3).unwrap(),
            uploaded_file: None,
            added_by: None,
        },
        groups: Vec::new(),
    };
    StudyService::new(store.clone()).persist(&graph).await.unwrap();

    let set = get_denormalised(&store).await.unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.records[0].get("study.date_input"), Some(&json!("2024-02-03")));
    assert!(set.columns.iter().all(|c| c.starts_with("study.")));
}

#[tokio::test]
async fn test_filter_by_title() {
    let (store, ids) = store_with(&[
        single_study_workbook("T1", "A1"),
        branching_study_workbook("T2"),
    ])
    .await;

    let set = get_filtered(&store, "study.title = 'T2'", false).await.unwrap();
    assert_eq!(set.len(), 5);
    assert!(set.iter().all(|r| r.get("study.id") == Some(&json!(ids[1]))));

    let none = get_filtered(&store, "study.title = 'T3'", false).await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_empty_predicate_is_rejected() {
    let (store, _) = store_with(&[single_study_workbook("T1", "A1")]).await;

    for predicate in ["", "   "] {
        let err = get_filtered(&store, predicate, true).await.unwrap_err();
        assert!(matches!(err, QueryError::EmptyPredicate));
    }
}

#[tokio::test]
async fn test_bad_predicates_fail() {
    let (store, _) = store_with(&[single_study_workbook("T1", "A1")]).await;

    let err = get_filtered(&store, "study.title = ", false).await.unwrap_err();
    assert!(matches!(err, QueryError::Syntax { .. }));

    let err = get_filtered(&store, "study.uploaded_file IS NULL", false)
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::UnknownColumn(_)));
}

#[tokio::test]
async fn test_flatten_expands_attribute_bag() {
    let (store, _) = store_with(&[branching_study_workbook("T2")]).await;

    let flat = get_filtered(&store, "measurement.id IS NOT NULL", true)
        .await
        .unwrap();
    assert_eq!(flat.len(), 2);
    assert!(flat.iter().all(|r| !r.contains_key("measurement.data")));
    assert_eq!(flat.records[0].get("measurement.data_Plate"), Some(&json!(3)));
    assert_eq!(
        flat.records[0].get("measurement.data_Operator"),
        Some(&json!("kim"))
    );
    assert!(!flat.records[1].contains_key("measurement.data_Plate"));

    let nested = get_filtered(&store, "measurement.id IS NOT NULL", false)
        .await
        .unwrap();
    assert_eq!(
        nested.records[0].get("measurement.data"),
        Some(&json!({"Plate": 3, "Operator": "kim"}))
    );
}

#[tokio::test]
async fn test_filter_on_attribute_bag_key() {
    let (store, _) = store_with(&[branching_study_workbook("T2")]).await;

    let set = get_filtered(&store, "measurement.data_Operator = 'kim'", true)
        .await
        .unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(
        set.records[0].get("measurement.value").and_then(|v| v.as_f64()),
        Some(0.5)
    );
}

#[tokio::test]
async fn test_filter_on_bag_keys_with_quotes_and_backslashes() {
    let store = TestDb::new_in_memory().connect().await.unwrap();
    let measurement = |key: &str| NewMeasurement {
        test_type: "Assay".to_string(),
        data: [(key.to_string(), json!("y"))].into_iter().collect(),
        ..Default::default()
    };
    let graph = StudyGraph {
        study: NewStudy {
            title: "Keys".to_string(),
            authors: "A".to_string(),
            date_input: chrono::NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
            uploaded_file: None,
            added_by: None,
        },
        groups: vec![NewGroup {
            biological_replicas: vec![NewBiologicalReplica {
                measurements: vec![measurement("say \"hi\""), measurement("a\\b")],
                ..Default::default()
            }],
            ..Default::default()
        }],
    };
    StudyService::new(store.clone()).persist(&graph).await.unwrap();

    let quoted = get_filtered(&store, "measurement.\"data_say \"\"hi\"\"\" = 'y'", true)
        .await
        .unwrap();
    assert_eq!(quoted.len(), 1);
    assert_eq!(quoted.records[0].get("measurement.data_say \"hi\""), Some(&json!("y")));

    let backslash = get_filtered(&store, "measurement.\"data_a\\b\" = 'y'", true)
        .await
        .unwrap();
    assert_eq!(backslash.len(), 1);
    assert_eq!(backslash.records[0].get("measurement.data_a\\b"), Some(&json!("y")));
}

#[tokio::test]
async fn test_compound_predicates() {
    let (store, _) = store_with(&[branching_study_workbook("T2")]).await;

    let set = get_filtered(
        &store,
        "group.model IN ('spheroid', 'organoid') AND NOT biological_replica.cell_name LIKE 'B%'",
        true,
    )
    .await
    .unwrap();
    // replica A with its two measurements
    assert_eq!(set.len(), 2);

    let set = get_filtered(&store, "measurement.value BETWEEN 0.6 AND 1", true)
        .await
        .unwrap();
    assert_eq!(set.len(), 1);
}

#[tokio::test]
async fn test_delete_cascades_out_of_queries() {
    let (store, ids) = store_with(&[
        single_study_workbook("T1", "A1"),
        branching_study_workbook("T2"),
    ])
    .await;

    StudyService::new(store.clone()).delete(ids[1]).await.unwrap();

    let set = get_denormalised(&store).await.unwrap();
    assert_eq!(set.len(), 1);
    assert_eq!(set.records[0].get("study.title"), Some(&json!("T1")));
    assert!(get_filtered(&store, "group.model = 'spheroid'", false)
        .await
        .unwrap()
        .is_empty());
}
