//! The persistence boundary handed to services and the query engine.
//!
//! A `Store` owns two handles onto one SQLite database: a read-write connection
//! used for ingestion commits and administrative changes, and a read-only
//! connection used for exports and queries. Construct one per command or
//! request and pass it down; nothing in the crate keeps a global connection.

use sea_orm::{DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use super::connection::{establish_connection, get_database_url, AccessMode};
use super::migrations::Migrator;

#[derive(Clone, Debug)]
pub struct Store {
    writer: DatabaseConnection,
    reader: DatabaseConnection,
}

impl Store {
    /// Open the database file at `path`, creating it if needed.
    ///
    /// The read-only handle is opened after the writer so the file exists.
    pub async fn open(path: &str) -> Result<Self, DbErr> {
        if path == ":memory:" {
            return Self::in_memory().await;
        }

        let writer =
            establish_connection(&get_database_url(Some(path), AccessMode::ReadWrite)).await?;
        let reader =
            establish_connection(&get_database_url(Some(path), AccessMode::ReadOnly)).await?;
        debug!("Opened database {} (read-write and read-only)", path);

        Ok(Self { writer, reader })
    }

    /// An in-memory database; both handles share the single connection
    pub async fn in_memory() -> Result<Self, DbErr> {
        let db = sea_orm::Database::connect("sqlite::memory:").await?;
        Ok(Self::from_connection(db))
    }

    pub fn from_connection(db: DatabaseConnection) -> Self {
        Self {
            writer: db.clone(),
            reader: db,
        }
    }

    pub fn writer(&self) -> &DatabaseConnection {
        &self.writer
    }

    pub fn reader(&self) -> &DatabaseConnection {
        &self.reader
    }

    /// Apply all pending migrations
    pub async fn migrate(&self) -> Result<(), DbErr> {
        Migrator::up(&self.writer, None).await?;
        info!("Database schema is up to date");
        Ok(())
    }

    /// Drop every table and recreate the schema
    pub async fn recreate(&self) -> Result<(), DbErr> {
        Migrator::fresh(&self.writer).await?;
        info!("Dropped and recreated database schema");
        Ok(())
    }
}
