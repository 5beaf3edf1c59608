use cm3d::Store;
use sea_orm::DbErr;

/// A migrated store for tests
pub struct TestDb {
    path: String,
}

impl TestDb {
    pub fn new_in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
        }
    }

    pub fn new_file(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub async fn connect(&self) -> Result<Store, DbErr> {
        let store = Store::open(&self.path).await?;
        store.migrate().await?;
        Ok(store)
    }
}
