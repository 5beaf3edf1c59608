use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::time::Duration;

/// How a connection may touch the database file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessMode {
    /// Read-write, creating the file when absent
    ReadWrite,
    /// Read only; writes fail at the SQLite level
    ReadOnly,
}

pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url);

    // SQLite serialises writers, so a small pool is enough
    opt.max_connections(10)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(5))
        .acquire_timeout(Duration::from_secs(5))
        .idle_timeout(Duration::from_secs(300))
        .max_lifetime(Duration::from_secs(3600))
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    Database::connect(opt).await
}

pub fn get_database_url(database_path: Option<&str>, mode: AccessMode) -> String {
    let suffix = match mode {
        AccessMode::ReadWrite => "rwc",
        AccessMode::ReadOnly => "ro",
    };
    match database_path {
        Some(path) if path == ":memory:" => "sqlite::memory:".to_string(),
        Some(path) => format!("sqlite://{}?mode={}", path, suffix),
        None => format!("sqlite://cm3d.db?mode={}", suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_url_modes() {
        assert_eq!(
            get_database_url(Some("study.db"), AccessMode::ReadWrite),
            "sqlite://study.db?mode=rwc"
        );
        assert_eq!(
            get_database_url(Some("study.db"), AccessMode::ReadOnly),
            "sqlite://study.db?mode=ro"
        );
        assert_eq!(
            get_database_url(None, AccessMode::ReadOnly),
            "sqlite://cm3d.db?mode=ro"
        );
    }

    #[test]
    fn test_memory_url_ignores_mode() {
        assert_eq!(
            get_database_url(Some(":memory:"), AccessMode::ReadOnly),
            "sqlite::memory:"
        );
    }
}
