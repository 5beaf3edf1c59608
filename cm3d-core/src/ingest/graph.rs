use chrono::NaiveDate;
use serde_json::{Map, Value};

/// The entity graph built from one workbook, not yet persisted.
///
/// Children are owned by their parent; persisting the graph writes the study and
/// everything below it in one transaction.
#[derive(Clone, Debug, PartialEq)]
pub struct StudyGraph {
    pub study: NewStudy,
    pub groups: Vec<NewGroup>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewStudy {
    pub title: String,
    pub authors: String,
    pub date_input: NaiveDate,
    pub uploaded_file: Option<Vec<u8>>,
    pub added_by: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewGroup {
    pub model: Option<String>,
    pub duration: Option<String>,
    pub protein_treatment: Option<String>,
    pub additional_supplementation: Option<String>,
    pub biological_replicas: Vec<NewBiologicalReplica>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewBiologicalReplica {
    pub cell_name: Option<String>,
    pub cell_origin: Option<String>,
    pub receptor_expression: Option<String>,
    pub media_composition: Option<String>,
    pub passage_number: Option<i32>,
    pub morphology: Option<String>,
    pub patient_characteristics: Option<String>,
    pub measurements: Vec<NewMeasurement>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewMeasurement {
    pub method: Option<String>,
    pub time_point: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub measurement: Option<String>,
    pub test_type: String,
    /// Extra sheet columns, keyed by column name
    pub data: Map<String, Value>,
}

impl StudyGraph {
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn biological_replica_count(&self) -> usize {
        self.groups.iter().map(|g| g.biological_replicas.len()).sum()
    }

    pub fn measurement_count(&self) -> usize {
        self.groups
            .iter()
            .flat_map(|g| g.biological_replicas.iter())
            .map(|r| r.measurements.len())
            .sum()
    }

    /// All measurements in insertion order
    pub fn measurements(&self) -> impl Iterator<Item = &NewMeasurement> {
        self.groups
            .iter()
            .flat_map(|g| g.biological_replicas.iter())
            .flat_map(|r| r.measurements.iter())
    }
}
