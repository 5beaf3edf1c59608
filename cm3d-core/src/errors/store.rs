use thiserror::Error;

/// Persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database or transaction failure; an uncommitted transaction is rolled back
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Study {0} not found")]
    StudyNotFound(i32),

    #[error("Study {0} has no uploaded file")]
    NoUploadedFile(i32),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::StudyNotFound(_) | StoreError::NoUploadedFile(_)
        )
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            StoreError::Database(_) => "DATABASE_ERROR",
            StoreError::StudyNotFound(_) => "STUDY_NOT_FOUND",
            StoreError::NoUploadedFile(_) => "NO_UPLOADED_FILE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = StoreError::StudyNotFound(42);
        assert_eq!(err.to_string(), "Study 42 not found");
        assert!(err.is_not_found());
        assert_eq!(err.error_code(), "STUDY_NOT_FOUND");
    }

    #[test]
    fn test_database_error() {
        let err = StoreError::from(sea_orm::DbErr::Custom("disk full".to_string()));
        assert!(!err.is_not_found());
        assert_eq!(err.error_code(), "DATABASE_ERROR");
    }
}
