//! In-memory view of a spreadsheet workbook.
//!
//! A [`Workbook`] maps sheet names (in file order) to [`Sheet`]s. A sheet is a
//! rectangular table: the first spreadsheet row supplies the column names and
//! every following row is a data row. Data rows are addressed 0-based.

pub mod reader;
pub mod writer;

use indexmap::IndexMap;
use serde_json::Value;

pub use reader::{read_workbook, read_workbook_bytes};
pub use writer::write_workbook;

/// A single typed spreadsheet cell
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    /// Empty cells and whitespace-only text both count as blank
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Render the cell as free text; blank cells yield `None`
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Int(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
        }
    }

    /// Read the cell as an integer. Integral floats and integer text are accepted.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Cell::Int(i) => Some(*i),
            Cell::Float(f) if f.fract() == 0.0 && f.is_finite() => Some(*f as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Cell::Int(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// JSON value preserving the cell's type; blank cells yield `None`
    pub fn to_json(&self) -> Option<Value> {
        match self {
            _ if self.is_blank() => None,
            Cell::Int(i) => Some(Value::from(*i)),
            Cell::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number),
            Cell::Text(s) => Some(Value::String(s.clone())),
            Cell::Bool(b) => Some(Value::Bool(*b)),
            Cell::Empty => None,
        }
    }

    /// Short rendering used in error messages
    pub fn describe(&self) -> String {
        match self {
            Cell::Empty => "<blank>".to_string(),
            other => other.as_text().unwrap_or_else(|| "<blank>".to_string()),
        }
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Int(value.into())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Cell::Empty)
    }
}

static EMPTY: Cell = Cell::Empty;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sheet {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Build a sheet from column names and rows; short rows are padded with blanks
    pub fn from_rows<C, R>(columns: impl IntoIterator<Item = C>, rows: R) -> Self
    where
        C: Into<String>,
        R: IntoIterator<Item = Vec<Cell>>,
    {
        let mut sheet = Self::new(columns.into_iter().map(Into::into).collect());
        for row in rows {
            sheet.push_row(row);
        }
        sheet
    }

    pub fn push_row(&mut self, mut row: Vec<Cell>) {
        if row.len() < self.columns.len() {
            row.resize(self.columns.len(), Cell::Empty);
        }
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// The cell at `row` under column `name`; absent columns and rows read as blank
    pub fn cell(&self, row: usize, name: &str) -> &Cell {
        self.column_index(name)
            .and_then(|col| self.rows.get(row).and_then(|r| r.get(col)))
            .unwrap_or(&EMPTY)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Workbook {
    sheets: IndexMap<String, Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a sheet; replaced sheets keep their original position
    pub fn insert_sheet(&mut self, name: impl Into<String>, sheet: Sheet) {
        self.sheets.insert(name.into(), sheet);
    }

    pub fn with_sheet(mut self, name: impl Into<String>, sheet: Sheet) -> Self {
        self.insert_sheet(name, sheet);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.get(name)
    }

    /// Sheets in file order
    pub fn sheets(&self) -> impl Iterator<Item = (&str, &Sheet)> {
        self.sheets.iter().map(|(name, sheet)| (name.as_str(), sheet))
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }
}
