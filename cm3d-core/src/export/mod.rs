pub mod csv;

pub use self::csv::{records_to_csv, CsvOptions};
