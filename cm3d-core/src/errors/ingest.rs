//! Ingestion error types
//!
//! Every variant that points into the workbook carries the sheet name and the
//! 0-based data row index (the header row is not counted).

use thiserror::Error;

/// Workbook ingestion errors. Any of these aborts the whole ingestion run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// A required sheet is absent from the workbook
    #[error("Malformed workbook: missing sheet '{0}'")]
    MissingSheet(String),

    /// A required column is absent from a sheet
    #[error("Malformed workbook: sheet '{sheet}' has no column '{column}'")]
    MissingColumn { sheet: String, column: String },

    /// A sheet that must hold at least one data row is empty
    #[error("Malformed workbook: sheet '{sheet}' has no data row {row}")]
    MissingRow { sheet: String, row: usize },

    /// A required cell is blank
    #[error("Malformed workbook: sheet '{sheet}' row {row} column '{column}' is blank")]
    BlankCell {
        sheet: String,
        row: usize,
        column: String,
    },

    /// A cell is present but cannot be read as the required type
    #[error("Malformed workbook: sheet '{sheet}' row {row} column '{column}': expected {expected}, found '{found}'")]
    InvalidCell {
        sheet: String,
        row: usize,
        column: String,
        expected: &'static str,
        found: String,
    },

    /// A row references a Group or Biological replica id not defined in this workbook
    #[error("Dangling reference: sheet '{sheet}' row {row} references {target} {id}, which is not defined")]
    DanglingReference {
        sheet: String,
        row: usize,
        target: &'static str,
        id: i64,
    },

    /// The same sheet-local id appears twice (strict duplicate policy only)
    #[error("Duplicate id: sheet '{sheet}' row {row} redefines {target} {id}")]
    DuplicateSheetId {
        sheet: String,
        row: usize,
        target: &'static str,
        id: i64,
    },

    /// The file could not be opened as a workbook
    #[error("Unreadable workbook: {0}")]
    Workbook(String),

    /// IO error while reading the workbook file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    /// Structural problem in the submitted workbook
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            IngestError::MissingSheet(_)
                | IngestError::MissingColumn { .. }
                | IngestError::MissingRow { .. }
                | IngestError::BlankCell { .. }
                | IngestError::InvalidCell { .. }
        )
    }

    /// Caused by the workbook contents rather than the environment
    pub fn is_client_error(&self) -> bool {
        self.is_malformed()
            || matches!(
                self,
                IngestError::DanglingReference { .. }
                    | IngestError::DuplicateSheetId { .. }
                    | IngestError::Workbook(_)
            )
    }

    /// Get error code for CLI/API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            IngestError::MissingSheet(_) => "MISSING_SHEET",
            IngestError::MissingColumn { .. } => "MISSING_COLUMN",
            IngestError::MissingRow { .. } => "MISSING_ROW",
            IngestError::BlankCell { .. } => "BLANK_CELL",
            IngestError::InvalidCell { .. } => "INVALID_CELL",
            IngestError::DanglingReference { .. } => "DANGLING_REFERENCE",
            IngestError::DuplicateSheetId { .. } => "DUPLICATE_SHEET_ID",
            IngestError::Workbook(_) => "UNREADABLE_WORKBOOK",
            IngestError::Io(_) => "IO_ERROR",
        }
    }
}
