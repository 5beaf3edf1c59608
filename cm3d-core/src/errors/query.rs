use thiserror::Error;

/// Filter predicate and query execution errors
#[derive(Error, Debug)]
pub enum QueryError {
    /// The caller passed an empty filter
    #[error("Filter predicate must not be empty")]
    EmptyPredicate,

    /// The filter does not follow the predicate grammar
    #[error("Filter syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    /// The filter names a column outside the joined row schema
    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    /// The database rejected or failed the query
    #[error("Query execution failed: {0}")]
    Execution(#[from] sea_orm::DbErr),
}

impl QueryError {
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        QueryError::Syntax {
            position,
            message: message.into(),
        }
    }

    /// Check if this is a caller error rather than a database failure
    pub fn is_client_error(&self) -> bool {
        !matches!(self, QueryError::Execution(_))
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            QueryError::EmptyPredicate => "EMPTY_PREDICATE",
            QueryError::Syntax { .. } => "PREDICATE_SYNTAX",
            QueryError::UnknownColumn(_) => "UNKNOWN_COLUMN",
            QueryError::Execution(_) => "QUERY_EXECUTION",
        }
    }
}
