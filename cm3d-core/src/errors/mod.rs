//! Domain-specific error types for cm3d-core
//!
//! Each stage of the pipeline has its own error enum so callers can tell a
//! malformed workbook apart from a bad filter or a failed commit.
//!
//! # Error Categories
//!
//! - **IngestError**: workbook structure and cross-sheet reference failures
//! - **QueryError**: filter predicate and query execution failures
//! - **StoreError**: persistence failures (transaction commit, missing rows)
//! - **ConfigError**: working directory configuration
//! - **ExportError**: CSV rendering
//!
//! # Examples
//!
//! ```rust
//! use cm3d::errors::{IngestError, QueryError};
//!
//! let err = IngestError::DanglingReference {
//!     sheet: "Biological replicas".to_string(),
//!     row: 3,
//!     target: "Group",
//!     id: 7,
//! };
//! assert!(err.is_client_error());
//!
//! let err = QueryError::EmptyPredicate;
//! assert_eq!(err.error_code(), "EMPTY_PREDICATE");
//! ```

pub mod config;
pub mod export;
pub mod ingest;
pub mod query;
pub mod store;

pub use config::ConfigError;
pub use export::ExportError;
pub use ingest::IngestError;
pub use query::QueryError;
pub use store::StoreError;

/// Result type alias for ingestion
pub type IngestResult<T> = Result<T, IngestError>;

/// Result type alias for query execution
pub type QueryResult<T> = Result<T, QueryError>;

/// Result type alias for persistence operations
pub type StoreResult<T> = Result<T, StoreError>;
