use rust_xlsxwriter::Workbook as XlsxWorkbook;

use super::{Cell, Workbook};
use crate::errors::ExportError;

/// Write a [`Workbook`] as xlsx bytes. Header cells go on the first row.
pub fn write_workbook(workbook: &Workbook) -> Result<Vec<u8>, ExportError> {
    let mut xlsx = XlsxWorkbook::new();

    for (name, sheet) in workbook.sheets() {
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(name)?;

        for (col_idx, column) in sheet.columns().iter().enumerate() {
            if !column.is_empty() {
                worksheet.write_string(0, col_idx as u16, column)?;
            }
        }

        for (row_idx, row) in sheet.rows().enumerate() {
            let xlsx_row = row_idx as u32 + 1;
            for (col_idx, cell) in row.iter().enumerate() {
                let col = col_idx as u16;
                match cell {
                    Cell::Empty => {}
                    Cell::Int(i) => {
                        worksheet.write_number(xlsx_row, col, *i as f64)?;
                    }
                    Cell::Float(f) => {
                        worksheet.write_number(xlsx_row, col, *f)?;
                    }
                    Cell::Text(s) => {
                        worksheet.write_string(xlsx_row, col, s)?;
                    }
                    Cell::Bool(b) => {
                        worksheet.write_boolean(xlsx_row, col, *b)?;
                    }
                }
            }
        }

        tracing::debug!("Wrote {} rows to sheet {}", sheet.row_count(), name);
    }

    xlsx.save_to_buffer().map_err(Into::into)
}
