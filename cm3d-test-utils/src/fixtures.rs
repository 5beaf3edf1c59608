use std::fs;
use std::path::{Path, PathBuf};

use cm3d::ingest::{
    BIOLOGICAL_REPLICA, GROUP, GROUPS_SHEET, GROUP_MODEL, MEASUREMENT_METHOD, MEASUREMENT_UNITS,
    MEASUREMENT_VALUE, REPLICAS_SHEET, REPLICA_CELL_NAME, STUDY_AUTHOR, STUDY_SHEET, STUDY_TITLE,
};
use cm3d::workbook::{write_workbook, Cell, Sheet, Workbook};

/// One study with one group, one replica and one `Test-Assay` measurement
pub fn single_study_workbook(title: &str, author: &str) -> Workbook {
    Workbook::new()
        .with_sheet(
            STUDY_SHEET,
            Sheet::from_rows(
                [STUDY_TITLE, STUDY_AUTHOR],
                vec![vec![Cell::from(title), Cell::from(author)]],
            ),
        )
        .with_sheet(
            GROUPS_SHEET,
            Sheet::from_rows([GROUP, GROUP_MODEL], vec![vec![Cell::Int(1), Cell::from("m")]]),
        )
        .with_sheet(
            REPLICAS_SHEET,
            Sheet::from_rows(
                [BIOLOGICAL_REPLICA, REPLICA_CELL_NAME, GROUP],
                vec![vec![Cell::Int(1), Cell::from("C1"), Cell::Int(1)]],
            ),
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

/// Two groups with two replicas each; only the first replica has measurements,
/// one of which carries extra `Plate` and `Operator` columns.
pub fn branching_study_workbook(title: &str) -> Workbook {
    Workbook::new()
        .with_sheet(
            STUDY_SHEET,
            Sheet::from_rows(
                [STUDY_TITLE, STUDY_AUTHOR],
                vec![vec![Cell::from(title), Cell::from("B. Author")]],
            ),
        )
        .with_sheet(
            GROUPS_SHEET,
            Sheet::from_rows(
                [GROUP, GROUP_MODEL],
                vec![
                    vec![Cell::Int(1), Cell::from("spheroid")],
                    vec![Cell::Int(2), Cell::from("monolayer")],
                ],
            ),
        )
        .with_sheet(
            REPLICAS_SHEET,
            Sheet::from_rows(
                [BIOLOGICAL_REPLICA, REPLICA_CELL_NAME, GROUP],
                vec![
                    vec![Cell::Int(1), Cell::from("A"), Cell::Int(1)],
                    vec![Cell::Int(2), Cell::from("B"), Cell::Int(1)],
                    vec![Cell::Int(3), Cell::from("C"), Cell::Int(2)],
                    vec![Cell::Int(4), Cell::from("D"), Cell::Int(2)],
                ],
            ),
        )
        .with_sheet(
            "Test-Viability",
            Sheet::from_rows(
                [BIOLOGICAL_REPLICA, MEASUREMENT_VALUE, "Plate", "Operator"],
                vec![
                    vec![Cell::Int(1), Cell::Float(0.5), Cell::Int(3), Cell::from("kim")],
                    vec![Cell::Int(1), Cell::Float(0.75), Cell::Empty, Cell::Empty],
                ],
            ),
        )
}

pub fn workbook_bytes(workbook: &Workbook) -> anyhow::Result<Vec<u8>> {
    Ok(write_workbook(workbook)?)
}

/// Write a workbook as `<name>` inside `dir`
pub fn write_xlsx(dir: &Path, name: &str, workbook: &Workbook) -> anyhow::Result<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, workbook_bytes(workbook)?)?;
    Ok(path)
}
