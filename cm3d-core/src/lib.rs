pub mod config;
pub mod database;
pub mod errors;
pub mod export;
pub mod ingest;
pub mod mock;
pub mod query;
pub mod services;
pub mod workbook;

pub use database::store::Store;
pub use ingest::{load_all, read_file, IngestOptions, StudyGraph};
pub use query::{get_denormalised, get_filtered, Record, RecordSet};
