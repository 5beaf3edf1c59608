//! Working directory configuration.
//!
//! A working directory holds the database, the input template, a downloads and
//! an uploads directory, and optionally a `cm3d.toml` that renames any of them
//! and stores named filters:
//!
//! ```toml
//! database = "cm3d.db"
//!
//! [filters]
//! mammary = "study.title LIKE '%mammary%'"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::ConfigError;

pub const CONFIG_FILENAME: &str = "cm3d.toml";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Cm3dConfig {
    pub database: String,
    pub downloads_dir: String,
    pub uploads_dir: String,
    pub template: String,
    /// Saved filter name -> predicate
    pub filters: BTreeMap<String, String>,
}

impl Default for Cm3dConfig {
    fn default() -> Self {
        Self {
            database: "cm3d.db".to_string(),
            downloads_dir: "downloads".to_string(),
            uploads_dir: "uploads".to_string(),
            template: "CM3D_input_template.xlsx".to_string(),
            filters: BTreeMap::new(),
        }
    }
}

impl Cm3dConfig {
    /// Read a config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn saved_filter(&self, name: &str) -> Result<&str, ConfigError> {
        self.filters
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ConfigError::UnknownFilter(name.to_string()))
    }
}

/// A working directory and the configuration read from it
#[derive(Clone, Debug)]
pub struct WorkingDirectory {
    root: PathBuf,
    config: Cm3dConfig,
}

impl WorkingDirectory {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root = root.into();
        let config = Cm3dConfig::load_from(&root.join(CONFIG_FILENAME))?;
        Ok(Self { root, config })
    }

    pub fn with_config(root: impl Into<PathBuf>, config: Cm3dConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &Cm3dConfig {
        &self.config
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILENAME)
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(&self.config.database)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.root.join(&self.config.downloads_dir)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.root.join(&self.config.uploads_dir)
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.join(&self.config.template)
    }

    /// Names of the required files and directories that do not exist
    pub fn check(&self) -> Vec<String> {
        [
            (&self.config.database, self.database_path()),
            (&self.config.template, self.template_path()),
            (&self.config.downloads_dir, self.downloads_dir()),
            (&self.config.uploads_dir, self.uploads_dir()),
        ]
        .into_iter()
        .filter(|(_, path)| !path.exists())
        .map(|(name, _)| name.clone())
        .collect()
    }

    /// Create the downloads and uploads directories
    pub fn create_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.downloads_dir())?;
        std::fs::create_dir_all(self.uploads_dir())?;
        Ok(())
    }
}
