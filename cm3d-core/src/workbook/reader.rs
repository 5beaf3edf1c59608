use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_from_rs, Data, Range, Reader, Xlsx};
use tracing::{debug, warn};

use super::{Cell, Sheet, Workbook};
use crate::errors::IngestError;

/// Read an xlsx file from disk
pub fn read_workbook(path: impl AsRef<Path>) -> Result<Workbook, IngestError> {
    let bytes = std::fs::read(path.as_ref())?;
    read_workbook_bytes(&bytes)
}

/// Parse xlsx bytes into a [`Workbook`]; every worksheet is kept, in file order
pub fn read_workbook_bytes(bytes: &[u8]) -> Result<Workbook, IngestError> {
    let cursor = Cursor::new(bytes);
    let mut xlsx: Xlsx<_> = open_workbook_from_rs(cursor)
        .map_err(|e| IngestError::Workbook(format!("failed to open XLSX: {}", e)))?;

    let mut workbook = Workbook::new();
    for sheet_name in xlsx.sheet_names() {
        let range = xlsx
            .worksheet_range(&sheet_name)
            .map_err(|e| IngestError::Workbook(format!("sheet '{}': {}", sheet_name, e)))?;
        debug!(
            "Sheet '{}' dimensions: {}x{}",
            sheet_name,
            range.height(),
            range.width()
        );
        workbook.insert_sheet(sheet_name.clone(), range_to_sheet(&sheet_name, &range));
    }

    Ok(workbook)
}

fn range_to_sheet(sheet_name: &str, range: &Range<Data>) -> Sheet {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Sheet::default();
    };

    let columns = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match convert_cell(cell) {
            Cell::Empty => format!("Unnamed: {}", idx),
            other => other.as_text().unwrap_or_else(|| format!("Unnamed: {}", idx)),
        })
        .collect();

    let mut sheet = Sheet::new(columns);
    for (row_idx, row) in rows.enumerate() {
        let cells = row
            .iter()
            .map(|cell| {
                if let Data::Error(e) = cell {
                    warn!(
                        "Sheet '{}' row {} holds an error cell ({:?}); reading it as blank",
                        sheet_name, row_idx, e
                    );
                }
                convert_cell(cell)
            })
            .collect();
        sheet.push_row(cells);
    }
    sheet
}

fn convert_cell(cell: &Data) -> Cell {
    match cell {
        Data::Int(i) => Cell::Int(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(value) if value.time() == chrono::NaiveTime::MIN => {
                Cell::Text(value.date().format("%Y-%m-%d").to_string())
            }
            Some(value) => Cell::Text(value.format("%Y-%m-%dT%H:%M:%S").to_string()),
            None => Cell::Float(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}
