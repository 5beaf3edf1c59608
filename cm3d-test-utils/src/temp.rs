use std::fs;
use std::path::{Path, PathBuf};

use cm3d::config::WorkingDirectory;
use cm3d::workbook::Workbook;
use uuid::Uuid;

use crate::fixtures::write_xlsx;

/// A throwaway cm3d working directory with its downloads and uploads
/// directories in place; removed on drop.
pub struct TempWorkdir {
    workdir: WorkingDirectory,
}

impl TempWorkdir {
    pub fn new() -> anyhow::Result<Self> {
        let root = std::env::temp_dir().join(format!("cm3d-test-{}", Uuid::new_v4()));
        fs::create_dir_all(&root)?;
        let workdir = WorkingDirectory::open(&root)?;
        workdir.create_dirs()?;
        Ok(Self { workdir })
    }

    pub fn path(&self) -> &Path {
        self.workdir.root()
    }

    pub fn workdir(&self) -> &WorkingDirectory {
        &self.workdir
    }

    pub fn database_path(&self) -> PathBuf {
        self.workdir.database_path()
    }

    /// Write `workbook` as xlsx into the uploads directory
    pub fn upload(&self, name: &str, workbook: &Workbook) -> anyhow::Result<PathBuf> {
        write_xlsx(&self.workdir.uploads_dir(), name, workbook)
    }
}

impl Drop for TempWorkdir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(self.workdir.root());
    }
}
