//! Workbook ingestion: turns a study workbook into a linked [`StudyGraph`].
//!
//! The pipeline reads the `Study`, `Groups` and `Biological replicas` sheets
//! followed by every `Test-` sheet in workbook order. Groups and replicas are
//! cross-referenced through integer ids that are local to the workbook; those
//! ids are resolved through lookup tables that live only for one run.
//!
//! Each data sheet ends at the first row whose key cell is blank. Rows below
//! that point are ignored even when they hold values.

pub mod graph;

use std::collections::HashMap;
use std::path::Path;

use chrono::{Local, NaiveDate};
use serde_json::Map;
use tracing::{debug, info};

use crate::errors::IngestError;
use crate::workbook::{read_workbook_bytes, Cell, Sheet, Workbook};

pub use graph::{NewBiologicalReplica, NewGroup, NewMeasurement, NewStudy, StudyGraph};

pub const STUDY_SHEET: &str = "Study";
pub const GROUPS_SHEET: &str = "Groups";
pub const REPLICAS_SHEET: &str = "Biological replicas";
pub const TEST_SHEET_PREFIX: &str = "Test-";

pub const STUDY_TITLE: &str = "Study title";
pub const STUDY_AUTHOR: &str = "Author";

pub const GROUP: &str = "Group";
pub const GROUP_MODEL: &str = "Model";
pub const GROUP_DURATION: &str = "Study duration";
pub const GROUP_PROTEIN_TREATMENT: &str = "Protein treatment";
/// Header as spelled in the published input template
pub const GROUP_SUPPLEMENTATION: &str = "Additional suplementation";
const GROUP_SUPPLEMENTATION_ALT: &str = "Additional supplementation";

pub const BIOLOGICAL_REPLICA: &str = "Biological replica";
pub const REPLICA_CELL_NAME: &str = "Cell name";
pub const REPLICA_CELL_ORIGIN: &str = "Cell line origin";
pub const REPLICA_RECEPTOR_EXPRESSION: &str = "Receptor expression";
pub const REPLICA_MEDIA_COMPOSITION: &str = "Media composition";
pub const REPLICA_PASSAGE_NUMBER: &str = "Passage number";
pub const REPLICA_MORPHOLOGY: &str = "Morphology";
pub const REPLICA_PATIENT_CHARACTERISTICS: &str = "Patient characteristics";

pub const MEASUREMENT_TIMEPOINT: &str = "Timepoint";
pub const MEASUREMENT_METHOD: &str = "Method";
pub const MEASUREMENT_NAME: &str = "Measurement";
pub const MEASUREMENT_VALUE: &str = "Value";
pub const MEASUREMENT_UNITS: &str = "Units";

/// Columns of a `Test-` sheet that map to fixed measurement attributes.
/// Everything else goes into the measurement's data bag.
pub const MEASUREMENT_FIXED_COLUMNS: [&str; 6] = [
    BIOLOGICAL_REPLICA,
    MEASUREMENT_TIMEPOINT,
    MEASUREMENT_METHOD,
    MEASUREMENT_NAME,
    MEASUREMENT_VALUE,
    MEASUREMENT_UNITS,
];

pub const GROUP_COLUMNS: [&str; 5] = [
    GROUP,
    GROUP_MODEL,
    GROUP_DURATION,
    GROUP_PROTEIN_TREATMENT,
    GROUP_SUPPLEMENTATION,
];

pub const REPLICA_COLUMNS: [&str; 9] = [
    BIOLOGICAL_REPLICA,
    REPLICA_CELL_NAME,
    REPLICA_CELL_ORIGIN,
    REPLICA_RECEPTOR_EXPRESSION,
    REPLICA_MEDIA_COMPOSITION,
    REPLICA_PASSAGE_NUMBER,
    REPLICA_MORPHOLOGY,
    REPLICA_PATIENT_CHARACTERISTICS,
    GROUP,
];

/// What to do when a sheet-local id appears on more than one row
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DuplicateIdPolicy {
    /// Keep every row; references resolve to the last row carrying the id
    #[default]
    LastWriteWins,
    /// Fail with [`IngestError::DuplicateSheetId`]
    Reject,
}

#[derive(Clone, Debug)]
pub struct IngestOptions {
    pub date_input: NaiveDate,
    pub added_by: Option<String>,
    pub duplicate_ids: DuplicateIdPolicy,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            date_input: Local::now().date_naive(),
            added_by: None,
            duplicate_ids: DuplicateIdPolicy::default(),
        }
    }
}

impl IngestOptions {
    pub fn with_added_by(mut self, user: impl Into<String>) -> Self {
        self.added_by = Some(user.into());
        self
    }

    pub fn strict(mut self) -> Self {
        self.duplicate_ids = DuplicateIdPolicy::Reject;
        self
    }
}

/// Sheet-local group id -> index into `StudyGraph::groups`
pub type GroupLookup = HashMap<i64, usize>;
/// Sheet-local replica id -> (group index, replica index within that group)
pub type ReplicaLookup = HashMap<i64, (usize, usize)>;

/// Build the full study graph from a workbook.
///
/// Fails without producing a partial graph if a required sheet is missing or
/// any row references an undefined group or replica.
pub fn load_all(workbook: &Workbook, options: &IngestOptions) -> Result<StudyGraph, IngestError> {
    let study_sheet = require_sheet(workbook, STUDY_SHEET)?;
    let groups_sheet = require_sheet(workbook, GROUPS_SHEET)?;
    let replicas_sheet = require_sheet(workbook, REPLICAS_SHEET)?;

    let study = create_study(study_sheet, options)?;
    let mut graph = StudyGraph {
        study,
        groups: Vec::new(),
    };

    let groups = create_groups(groups_sheet, &mut graph, options.duplicate_ids)?;
    let replicas =
        add_biological_replicas(replicas_sheet, &mut graph, &groups, options.duplicate_ids)?;
    add_measurements(workbook, &mut graph, &replicas)?;

    info!(
        "Loaded study '{}': {} groups, {} biological replicas, {} measurements",
        graph.study.title,
        graph.group_count(),
        graph.biological_replica_count(),
        graph.measurement_count()
    );

    Ok(graph)
}

/// Read an xlsx file, build its study graph and keep the original bytes on the study
pub fn read_file(path: impl AsRef<Path>, options: &IngestOptions) -> Result<StudyGraph, IngestError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    read_bytes(bytes, options)
}

/// Like [`read_file`] for a workbook already held in memory
pub fn read_bytes(bytes: Vec<u8>, options: &IngestOptions) -> Result<StudyGraph, IngestError> {
    let workbook = read_workbook_bytes(&bytes)?;
    let mut graph = load_all(&workbook, options)?;
    graph.study.uploaded_file = Some(bytes);
    Ok(graph)
}

/// The single study row
pub fn create_study(sheet: &Sheet, options: &IngestOptions) -> Result<NewStudy, IngestError> {
    if sheet.row_count() == 0 {
        return Err(IngestError::MissingRow {
            sheet: STUDY_SHEET.to_string(),
            row: 0,
        });
    }
    require_column(sheet, STUDY_SHEET, STUDY_TITLE)?;
    require_column(sheet, STUDY_SHEET, STUDY_AUTHOR)?;

    Ok(NewStudy {
        title: required_text(sheet, STUDY_SHEET, 0, STUDY_TITLE)?,
        authors: required_text(sheet, STUDY_SHEET, 0, STUDY_AUTHOR)?,
        date_input: options.date_input,
        uploaded_file: None,
        added_by: options.added_by.clone(),
    })
}

/// Append one group per row of the Groups sheet and return the id lookup
pub fn create_groups(
    sheet: &Sheet,
    graph: &mut StudyGraph,
    policy: DuplicateIdPolicy,
) -> Result<GroupLookup, IngestError> {
    let mut lookup = GroupLookup::new();
    let rows = data_rows(sheet, GROUPS_SHEET, GROUP)?;

    for row in 0..rows {
        let sheet_id = parse_sheet_id(sheet, GROUPS_SHEET, row, GROUP)?;
        let supplementation = if sheet.has_column(GROUP_SUPPLEMENTATION) {
            GROUP_SUPPLEMENTATION
        } else {
            GROUP_SUPPLEMENTATION_ALT
        };

        graph.groups.push(NewGroup {
            model: sheet.cell(row, GROUP_MODEL).as_text(),
            duration: sheet.cell(row, GROUP_DURATION).as_text(),
            protein_treatment: sheet.cell(row, GROUP_PROTEIN_TREATMENT).as_text(),
            additional_supplementation: sheet.cell(row, supplementation).as_text(),
            biological_replicas: Vec::new(),
        });

        let index = graph.groups.len() - 1;
        record_id(&mut lookup, sheet_id, index, policy, GROUPS_SHEET, row, "Group")?;
    }

    debug!("Sheet '{}': {} groups", GROUPS_SHEET, rows);
    Ok(lookup)
}

/// Attach one replica per row to the group it names and return the id lookup
pub fn add_biological_replicas(
    sheet: &Sheet,
    graph: &mut StudyGraph,
    groups: &GroupLookup,
    policy: DuplicateIdPolicy,
) -> Result<ReplicaLookup, IngestError> {
    let mut lookup = ReplicaLookup::new();
    let rows = data_rows(sheet, REPLICAS_SHEET, BIOLOGICAL_REPLICA)?;
    if rows > 0 {
        require_column(sheet, REPLICAS_SHEET, GROUP)?;
    }

    for row in 0..rows {
        let sheet_id = parse_sheet_id(sheet, REPLICAS_SHEET, row, BIOLOGICAL_REPLICA)?;
        let group_id = sheet_id_reference(sheet, REPLICAS_SHEET, row, GROUP)?;
        let group_index =
            *groups
                .get(&group_id)
                .ok_or_else(|| IngestError::DanglingReference {
                    sheet: REPLICAS_SHEET.to_string(),
                    row,
                    target: "Group",
                    id: group_id,
                })?;

        let passage_number = optional_int(sheet, REPLICAS_SHEET, row, REPLICA_PASSAGE_NUMBER)?;
        let replicas = &mut graph.groups[group_index].biological_replicas;
        replicas.push(NewBiologicalReplica {
            cell_name: sheet.cell(row, REPLICA_CELL_NAME).as_text(),
            cell_origin: sheet.cell(row, REPLICA_CELL_ORIGIN).as_text(),
            receptor_expression: sheet.cell(row, REPLICA_RECEPTOR_EXPRESSION).as_text(),
            media_composition: sheet.cell(row, REPLICA_MEDIA_COMPOSITION).as_text(),
            passage_number,
            morphology: sheet.cell(row, REPLICA_MORPHOLOGY).as_text(),
            patient_characteristics: sheet.cell(row, REPLICA_PATIENT_CHARACTERISTICS).as_text(),
            measurements: Vec::new(),
        });

        let position = (group_index, replicas.len() - 1);
        record_id(
            &mut lookup,
            sheet_id,
            position,
            policy,
            REPLICAS_SHEET,
            row,
            "Biological replica",
        )?;
    }

    debug!("Sheet '{}': {} biological replicas", REPLICAS_SHEET, rows);
    Ok(lookup)
}

/// Attach measurements from every `Test-` sheet, in workbook order
pub fn add_measurements(
    workbook: &Workbook,
    graph: &mut StudyGraph,
    replicas: &ReplicaLookup,
) -> Result<(), IngestError> {
    for (name, sheet) in workbook.sheets() {
        let Some(test_type) = name.strip_prefix(TEST_SHEET_PREFIX) else {
            continue;
        };

        let rows = data_rows(sheet, name, BIOLOGICAL_REPLICA)?;
        let extra_columns: Vec<&str> = sheet
            .columns()
            .iter()
            .map(String::as_str)
            .filter(|column| !MEASUREMENT_FIXED_COLUMNS.contains(column))
            .collect();

        for row in 0..rows {
            let replica_id = sheet_id_reference(sheet, name, row, BIOLOGICAL_REPLICA)?;
            let (group_index, replica_index) =
                *replicas
                    .get(&replica_id)
                    .ok_or_else(|| IngestError::DanglingReference {
                        sheet: name.to_string(),
                        row,
                        target: "Biological replica",
                        id: replica_id,
                    })?;

            let mut data = Map::new();
            for column in &extra_columns {
                if let Some(value) = sheet.cell(row, column).to_json() {
                    data.insert((*column).to_string(), value);
                }
            }

            let measurement = NewMeasurement {
                method: sheet.cell(row, MEASUREMENT_METHOD).as_text(),
                time_point: sheet.cell(row, MEASUREMENT_TIMEPOINT).as_text(),
                value: optional_float(sheet, name, row, MEASUREMENT_VALUE)?,
                unit: sheet.cell(row, MEASUREMENT_UNITS).as_text(),
                measurement: sheet.cell(row, MEASUREMENT_NAME).as_text(),
                test_type: test_type.to_string(),
                data,
            };
            graph.groups[group_index].biological_replicas[replica_index]
                .measurements
                .push(measurement);
        }

        debug!("Sheet '{}': {} measurements", name, rows);
    }

    Ok(())
}

fn require_sheet<'a>(workbook: &'a Workbook, name: &str) -> Result<&'a Sheet, IngestError> {
    workbook
        .sheet(name)
        .ok_or_else(|| IngestError::MissingSheet(name.to_string()))
}

fn require_column(sheet: &Sheet, sheet_name: &str, column: &str) -> Result<(), IngestError> {
    if sheet.has_column(column) {
        Ok(())
    } else {
        Err(IngestError::MissingColumn {
            sheet: sheet_name.to_string(),
            column: column.to_string(),
        })
    }
}

/// Number of rows before the first blank key cell.
///
/// A sheet with no data rows needs no key column.
fn data_rows(sheet: &Sheet, sheet_name: &str, key: &str) -> Result<usize, IngestError> {
    if sheet.row_count() == 0 {
        return Ok(0);
    }
    require_column(sheet, sheet_name, key)?;
    Ok((0..sheet.row_count())
        .find(|&row| sheet.cell(row, key).is_blank())
        .unwrap_or(sheet.row_count()))
}

fn required_text(
    sheet: &Sheet,
    sheet_name: &str,
    row: usize,
    column: &str,
) -> Result<String, IngestError> {
    sheet
        .cell(row, column)
        .as_text()
        .ok_or_else(|| IngestError::BlankCell {
            sheet: sheet_name.to_string(),
            row,
            column: column.to_string(),
        })
}

fn invalid(sheet_name: &str, row: usize, column: &str, expected: &'static str, cell: &Cell) -> IngestError {
    IngestError::InvalidCell {
        sheet: sheet_name.to_string(),
        row,
        column: column.to_string(),
        expected,
        found: cell.describe(),
    }
}

/// The row's own id; the key cell is known to be non-blank
fn parse_sheet_id(sheet: &Sheet, sheet_name: &str, row: usize, column: &str) -> Result<i64, IngestError> {
    let cell = sheet.cell(row, column);
    cell.as_int()
        .ok_or_else(|| invalid(sheet_name, row, column, "an integer id", cell))
}

/// An id pointing at another sheet's row; must be present
fn sheet_id_reference(
    sheet: &Sheet,
    sheet_name: &str,
    row: usize,
    column: &str,
) -> Result<i64, IngestError> {
    if sheet.cell(row, column).is_blank() {
        return Err(IngestError::BlankCell {
            sheet: sheet_name.to_string(),
            row,
            column: column.to_string(),
        });
    }
    parse_sheet_id(sheet, sheet_name, row, column)
}

fn optional_int(
    sheet: &Sheet,
    sheet_name: &str,
    row: usize,
    column: &str,
) -> Result<Option<i32>, IngestError> {
    let cell = sheet.cell(row, column);
    if cell.is_blank() {
        return Ok(None);
    }
    cell.as_int()
        .and_then(|value| i32::try_from(value).ok())
        .map(Some)
        .ok_or_else(|| invalid(sheet_name, row, column, "an integer", cell))
}

fn optional_float(
    sheet: &Sheet,
    sheet_name: &str,
    row: usize,
    column: &str,
) -> Result<Option<f64>, IngestError> {
    let cell = sheet.cell(row, column);
    if cell.is_blank() {
        return Ok(None);
    }
    cell.as_float()
        .map(Some)
        .ok_or_else(|| invalid(sheet_name, row, column, "a number", cell))
}

fn record_id<T>(
    lookup: &mut HashMap<i64, T>,
    id: i64,
    entry: T,
    policy: DuplicateIdPolicy,
    sheet_name: &str,
    row: usize,
    target: &'static str,
) -> Result<(), IngestError> {
    if lookup.insert(id, entry).is_some() && policy == DuplicateIdPolicy::Reject {
        return Err(IngestError::DuplicateSheetId {
            sheet: sheet_name.to_string(),
            row,
            target,
            id,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn study_sheet(title: &str, author: &str) -> Sheet {
        Sheet::from_rows(
            [STUDY_TITLE, STUDY_AUTHOR],
            vec![vec![Cell::from(title), Cell::from(author)]],
        )
    }

    fn groups_sheet(rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet::from_rows([GROUP, GROUP_MODEL], rows)
    }

    fn replicas_sheet(rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet::from_rows([BIOLOGICAL_REPLICA, REPLICA_CELL_NAME, GROUP], rows)
    }

    fn options() -> IngestOptions {
        IngestOptions {
            date_input: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            added_by: Some("tester".to_string()),
            duplicate_ids: DuplicateIdPolicy::LastWriteWins,
        }
    }

    fn single_study() -> Workbook {
        Workbook::new()
            .with_sheet(STUDY_SHEET, study_sheet("T1", "A1"))
            .with_sheet(
                GROUPS_SHEET,
                groups_sheet(vec![vec![Cell::Int(1), Cell::from("m")]]),
            )
            .with_sheet(
                REPLICAS_SHEET,
                replicas_sheet(vec![vec![Cell::Int(1), Cell::from("C1"), Cell::Int(1)]]),
            )
            .with_sheet(
                "Test-Assay",
                Sheet::from_rows(
                    [BIOLOGICAL_REPLICA, MEASUREMENT_METHOD, MEASUREMENT_VALUE, MEASUREMENT_UNITS],
                    vec![vec![
                        Cell::Int(1),
                        Cell::from("M"),
                        Cell::Int(5),
                        Cell::from("u"),
                    ]],
                ),
            )
    }

    #[test]
    fn test_single_study_graph() {
        let graph = load_all(&single_study(), &options()).unwrap();

        assert_eq!(graph.study.title, "T1");
        assert_eq!(graph.study.authors, "A1");
        assert_eq!(graph.study.added_by.as_deref(), Some("tester"));
        assert_eq!(graph.group_count(), 1);
        assert_eq!(graph.biological_replica_count(), 1);
        assert_eq!(graph.measurement_count(), 1);

        let group = &graph.groups[0];
        assert_eq!(group.model.as_deref(), Some("m"));
        assert_eq!(group.duration, None);
        let replica = &group.biological_replicas[0];
        assert_eq!(replica.cell_name.as_deref(), Some("C1"));
        let measurement = &replica.measurements[0];
        assert_eq!(measurement.method.as_deref(), Some("M"));
        assert_eq!(measurement.value, Some(5.0));
        assert_eq!(measurement.unit.as_deref(), Some("u"));
        assert_eq!(measurement.test_type, "Assay");
        assert!(measurement.data.is_empty());
    }

    #[test]
    fn test_groups_stop_at_first_blank_key() {
        let workbook = single_study().with_sheet(
            GROUPS_SHEET,
            groups_sheet(vec![
                vec![Cell::Int(1), Cell::from("a")],
                vec![Cell::Int(2), Cell::from("b")],
                vec![Cell::Empty, Cell::from("notes")],
                vec![Cell::Int(3), Cell::from("after the gap")],
            ]),
        );

        let graph = load_all(&workbook, &options()).unwrap();
        assert_eq!(graph.group_count(), 2);
        assert!(graph
            .groups
            .iter()
            .all(|g| g.model.as_deref() != Some("after the gap")));
    }

    #[test]
    fn test_replicas_stop_at_first_blank_key() {
        let workbook = single_study().with_sheet(
            REPLICAS_SHEET,
            replicas_sheet(vec![
                vec![Cell::Int(1), Cell::from("C1"), Cell::Int(1)],
                vec![Cell::Empty, Cell::from("notes"), Cell::Empty],
                vec![Cell::Int(2), Cell::from("C2"), Cell::Int(42)],
            ]),
        );

        let graph = load_all(&workbook, &options()).unwrap();
        assert_eq!(graph.biological_replica_count(), 1);
        assert_eq!(
            graph.groups[0].biological_replicas[0].cell_name.as_deref(),
            Some("C1")
        );
    }

    #[test]
    fn test_measurements_stop_at_first_blank_key() {
        let workbook = single_study().with_sheet(
            "Test-Assay",
            Sheet::from_rows(
                [BIOLOGICAL_REPLICA, MEASUREMENT_VALUE],
                vec![
                    vec![Cell::Int(1), Cell::Float(1.5)],
                    vec![Cell::Int(1), Cell::Float(2.5)],
                    vec![Cell::Empty, Cell::from("notes")],
                    vec![Cell::Int(99), Cell::Float(3.5)],
                ],
            ),
        );

        let graph = load_all(&workbook, &options()).unwrap();
        assert_eq!(graph.measurement_count(), 2);
        assert!(graph.measurements().all(|m| m.value != Some(3.5)));
    }

    #[test]
    fn test_replica_with_unknown_group_is_dangling() {
        let workbook = single_study().with_sheet(
            REPLICAS_SHEET,
            replicas_sheet(vec![
                vec![Cell::Int(1), Cell::from("C1"), Cell::Int(1)],
                vec![Cell::Int(2), Cell::from("C2"), Cell::Int(9)],
            ]),
        );

        let err = load_all(&workbook, &options()).unwrap_err();
        match err {
            IngestError::DanglingReference {
                sheet,
                row,
                target,
                id,
            } => {
                assert_eq!(sheet, REPLICAS_SHEET);
                assert_eq!(row, 1);
                assert_eq!(target, "Group");
                assert_eq!(id, 9);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_measurement_with_unknown_replica_is_dangling() {
        let workbook = single_study().with_sheet(
            "Test-Assay",
            Sheet::from_rows(
                [BIOLOGICAL_REPLICA, MEASUREMENT_VALUE],
                vec![vec![Cell::Int(4), Cell::Float(1.0)]],
            ),
        );

        let err = load_all(&workbook, &options()).unwrap_err();
        assert_eq!(err.error_code(), "DANGLING_REFERENCE");
        assert!(err.to_string().contains("Test-Assay"));
    }

    #[test]
    fn test_missing_sheet_is_reported_by_name() {
        let mut workbook = Workbook::new().with_sheet(STUDY_SHEET, study_sheet("T", "A"));
        workbook.insert_sheet(GROUPS_SHEET, groups_sheet(vec![]));

        let err = load_all(&workbook, &options()).unwrap_err();
        assert!(matches!(err, IngestError::MissingSheet(ref s) if s == REPLICAS_SHEET));
    }

    #[test]
    fn test_empty_study_sheet() {
        let workbook = single_study().with_sheet(
            STUDY_SHEET,
            Sheet::new(vec![STUDY_TITLE.to_string(), STUDY_AUTHOR.to_string()]),
        );
        let err = load_all(&workbook, &options()).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_ROW");
    }

    #[test]
    fn test_blank_title() {
        let workbook = single_study().with_sheet(STUDY_SHEET, study_sheet(" ", "A1"));
        let err = load_all(&workbook, &options()).unwrap_err();
        assert!(matches!(err, IngestError::BlankCell { ref column, .. } if column == STUDY_TITLE));
    }

    #[test]
    fn test_extra_columns_become_data_bag() {
        let workbook = single_study().with_sheet(
            "Test-Viability",
            Sheet::from_rows(
                [BIOLOGICAL_REPLICA, MEASUREMENT_VALUE, "Plate", "Operator", "Batch"],
                vec![vec![
                    Cell::Int(1),
                    Cell::Float(0.5),
                    Cell::Int(3),
                    Cell::from("kim"),
                    Cell::Empty,
                ]],
            ),
        );

        let graph = load_all(&workbook, &options()).unwrap();
        let measurement = graph
            .measurements()
            .find(|m| m.test_type == "Viability")
            .unwrap();
        assert_eq!(measurement.data.get("Plate"), Some(&json!(3)));
        assert_eq!(measurement.data.get("Operator"), Some(&json!("kim")));
        assert!(!measurement.data.contains_key("Batch"));
        assert!(!measurement.data.contains_key(MEASUREMENT_VALUE));
    }

    #[test]
    fn test_duplicate_group_ids_last_write_wins() {
        let workbook = single_study()
            .with_sheet(
                GROUPS_SHEET,
                groups_sheet(vec![
                    vec![Cell::Int(1), Cell::from("first")],
                    vec![Cell::Int(1), Cell::from("second")],
                ]),
            );

        let graph = load_all(&workbook, &options()).unwrap();
        assert_eq!(graph.group_count(), 2);
        assert!(graph.groups[0].biological_replicas.is_empty());
        assert_eq!(graph.groups[1].model.as_deref(), Some("second"));
        assert_eq!(graph.groups[1].biological_replicas.len(), 1);
    }

    #[test]
    fn test_duplicate_group_ids_rejected_when_strict() {
        let workbook = single_study().with_sheet(
            GROUPS_SHEET,
            groups_sheet(vec![
                vec![Cell::Int(1), Cell::from("first")],
                vec![Cell::Int(1), Cell::from("second")],
            ]),
        );

        let err = load_all(&workbook, &options().strict()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::DuplicateSheetId { row: 1, id: 1, .. }
        ));
    }

    #[test]
    fn test_non_integer_id_is_invalid() {
        let workbook = single_study().with_sheet(
            GROUPS_SHEET,
            groups_sheet(vec![vec![Cell::from("one"), Cell::from("m")]]),
        );
        let err = load_all(&workbook, &options()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::InvalidCell { ref found, .. } if found == "one"
        ));
    }

    #[test]
    fn test_test_sheets_without_rows_are_skipped() {
        let workbook = single_study().with_sheet("Test-Empty", Sheet::default());
        let graph = load_all(&workbook, &options()).unwrap();
        assert_eq!(graph.measurement_count(), 1);
    }

    #[test]
    fn test_float_ids_resolve() {
        let workbook = single_study().with_sheet(
            REPLICAS_SHEET,
            replicas_sheet(vec![vec![Cell::Float(1.0), Cell::from("C1"), Cell::Float(1.0)]]),
        );
        let graph = load_all(&workbook, &options()).unwrap();
        assert_eq!(graph.biological_replica_count(), 1);
    }
}
