//! Random study workbooks and the blank input template.

use indexmap::IndexMap;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::ingest::{
    GROUPS_SHEET, GROUP_COLUMNS, MEASUREMENT_FIXED_COLUMNS, REPLICAS_SHEET, REPLICA_COLUMNS,
    STUDY_AUTHOR, STUDY_SHEET, STUDY_TITLE, TEST_SHEET_PREFIX,
};
use crate::workbook::{Cell, Sheet, Workbook};

const WORDS: &[&str] = &[
    "cell", "growth", "matrix", "hydrogel", "tumour", "stroma", "culture", "scaffold", "stiffness",
    "invasion", "spheroid", "collagen", "hypoxia", "migration", "response", "model", "density",
    "signal", "protein", "gradient",
];
const FIRST_NAMES: &[&str] = &["Ana", "Ben", "Chen", "Dara", "Eli", "Femi", "Greta", "Hiro"];
const LAST_NAMES: &[&str] = &["Silva", "Okafor", "Novak", "Laranjeira", "Moreau", "Tanaka"];
const CHOICES: &[&str] = &["abc", "def", "ghi", "jkl"];
const TESTS: &[&str] = &["Proliferation assay", "Immunofluorescence", "Protein assay"];
const MEASURED: &[&str] = &["abc", "def", "ghi", "jkl", "xyz", "qwe", "hjk"];
const UNITS: &[&str] = &["unit", "g", "mm", "cm", "nm"];
const EXTRA_COLUMNS: &[&str] = &["xyz", "ghi", "qwe", "jhk"];

fn pick<R: Rng + ?Sized>(rng: &mut R, options: &[&'static str]) -> &'static str {
    options.choose(rng).copied().unwrap_or_default()
}

fn sentence<R: Rng + ?Sized>(rng: &mut R, words: usize) -> String {
    (0..words)
        .map(|_| pick(rng, WORDS))
        .collect::<Vec<_>>()
        .join(" ")
}

/// A random workbook that ingests cleanly.
///
/// Every replica references an existing group and every measurement an
/// existing replica. `Test-` sheets may be empty; extra measurement columns are
/// sparse.
pub fn mock_study_workbook<R: Rng + ?Sized>(rng: &mut R) -> Workbook {
    let authors = (0..rng.gen_range(1..=3))
        .map(|_| format!("{} {}", pick(rng, FIRST_NAMES), pick(rng, LAST_NAMES)))
        .collect::<Vec<_>>()
        .join("; ");
    let mut title = sentence(rng, 9);
    title.push('.');
    let study = Sheet::from_rows(
        [STUDY_TITLE, STUDY_AUTHOR],
        vec![vec![Cell::from(title), Cell::from(authors)]],
    );

    let group_count: i64 = rng.gen_range(4..=14);
    let groups = Sheet::from_rows(
        GROUP_COLUMNS,
        (1..=group_count)
            .map(|id| {
                vec![
                    Cell::Int(id),
                    Cell::from(sentence(rng, 3)),
                    Cell::from(format!("{} weeks", [2, 4, 8, 12, 24][rng.gen_range(0..5)])),
                    Cell::from(sentence(rng, 3)),
                    Cell::from(pick(rng, CHOICES)),
                ]
            })
            .collect::<Vec<_>>(),
    );

    let replica_count: i64 = rng.gen_range(4..=14);
    let replicas = Sheet::from_rows(
        REPLICA_COLUMNS,
        (1..=replica_count)
            .map(|id| {
                vec![
                    Cell::Int(id),
                    Cell::from("MDA-MB-231"),
                    Cell::from(pick(rng, CHOICES)),
                    Cell::from(pick(rng, CHOICES)),
                    Cell::from(pick(rng, CHOICES)),
                    Cell::Int(rng.gen_range(1..=10)),
                    Cell::from(pick(rng, CHOICES)),
                    Cell::from(pick(rng, CHOICES)),
                    Cell::Int(rng.gen_range(1..=group_count)),
                ]
            })
            .collect::<Vec<_>>(),
    );

    let mut workbook = Workbook::new()
        .with_sheet(STUDY_SHEET, study)
        .with_sheet(GROUPS_SHEET, groups)
        .with_sheet(REPLICAS_SHEET, replicas);

    let test_count = rng.gen_range(1..=TESTS.len());
    for test in TESTS.choose_multiple(rng, test_count) {
        let sheet = mock_measurements(rng, replica_count);
        workbook.insert_sheet(format!("{TEST_SHEET_PREFIX}{test}"), sheet);
    }

    workbook
}

fn mock_measurements<R: Rng + ?Sized>(rng: &mut R, replica_count: i64) -> Sheet {
    let mut rows: Vec<IndexMap<&str, Cell>> = Vec::new();
    for _ in 0..rng.gen_range(0..=9) {
        let mut row = IndexMap::new();
        row.insert(MEASUREMENT_FIXED_COLUMNS[0], Cell::Int(rng.gen_range(1..=replica_count)));
        row.insert(MEASUREMENT_FIXED_COLUMNS[1], Cell::Int(rng.gen_range(1..=48)));
        row.insert(MEASUREMENT_FIXED_COLUMNS[2], Cell::from(sentence(rng, 3)));
        row.insert(MEASUREMENT_FIXED_COLUMNS[3], Cell::from(pick(rng, MEASURED)));
        row.insert(MEASUREMENT_FIXED_COLUMNS[4], Cell::Float(rng.gen::<f64>() * 10000.0));
        row.insert(MEASUREMENT_FIXED_COLUMNS[5], Cell::from(pick(rng, UNITS)));

        let extras = rng.gen_range(0..=2);
        for extra in EXTRA_COLUMNS.choose_multiple(rng, extras) {
            let value = rng.gen_range(0..10i64);
            row.insert(*extra, if value == 0 { Cell::Empty } else { Cell::Int(value) });
        }
        rows.push(row);
    }

    let mut columns: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if !columns.contains(key) {
                columns.push(*key);
            }
        }
    }

    Sheet::from_rows(
        columns.iter().copied(),
        rows.iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| row.get(c).cloned().unwrap_or(Cell::Empty))
                    .collect()
            })
            .collect::<Vec<Vec<Cell>>>(),
    )
}

/// The blank input template: every sheet with its header row only
pub fn template_workbook() -> Workbook {
    Workbook::new()
        .with_sheet(STUDY_SHEET, Sheet::from_rows([STUDY_TITLE, STUDY_AUTHOR], Vec::new()))
        .with_sheet(GROUPS_SHEET, Sheet::from_rows(GROUP_COLUMNS, Vec::new()))
        .with_sheet(REPLICAS_SHEET, Sheet::from_rows(REPLICA_COLUMNS, Vec::new()))
        .with_sheet(
            format!("{TEST_SHEET_PREFIX}Example"),
            Sheet::from_rows(MEASUREMENT_FIXED_COLUMNS, Vec::new()),
        )
}
