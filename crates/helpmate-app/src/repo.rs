// Rust guideline compliant 2026-10-14

//! Data directory discovery and path management.

use crate::audit::{JsonlAuditLog, AUDIT_FILE};
use crate::error::{AppError, Result};
use helpmate_core::{Config, JsonlStore};
use std::path::{Path, PathBuf};

/// Name of the data directory under the project root.
pub const DATA_DIR_NAME: &str = ".helpmate";

/// Resolved paths of a Helpmate data directory.
#[derive(Debug, Clone)]
pub struct DataDir {
    root: PathBuf,
    dir: PathBuf,
    config_path: PathBuf,
    audit_path: PathBuf,
}

impl DataDir {
    fn at(root: PathBuf) -> Self {
        let dir = root.join(DATA_DIR_NAME);
        Self {
            config_path: dir.join("config.toml"),
            audit_path: dir.join(AUDIT_FILE),
            dir,
            root,
        }
    }

    /// Discovers the data directory starting from an optional root.
    ///
    /// # Arguments
    ///
    /// * `root` - Optional project root; defaults to the current directory
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The current directory cannot be resolved
    /// - The `.helpmate` directory is missing
    pub fn discover(root: Option<&Path>) -> Result<Self> {
        let root = match root {
            Some(root) => root.to_path_buf(),
            None => std::env::current_dir()?,
        };
        let data_dir = Self::at(root);
        if !data_dir.dir.is_dir() {
            return Err(AppError::RepoNotInitialized {
                path: data_dir.dir.clone(),
            });
        }
        Ok(data_dir)
    }

    /// Creates the data directory and a default config if they are missing.
    ///
    /// # Returns
    ///
    /// The data directory, and whether it was newly created.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or config file cannot be written.
    pub fn init(root: &Path) -> Result<(Self, bool)> {
        let data_dir = Self::at(root.to_path_buf());
        let created = !data_dir.dir.exists();
        std::fs::create_dir_all(&data_dir.dir)?;
        if !data_dir.config_path.exists() {
            Config::default().save(&data_dir.dir)?;
        }
        Ok((data_dir, created))
    }

    /// Returns the project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the `.helpmate` directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the config TOML path.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Opens the JSONL store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened.
    pub fn open_store(&self) -> Result<JsonlStore> {
        Ok(JsonlStore::open(self.dir.clone())?)
    }

    /// Returns the audit log.
    #[must_use]
    pub fn audit_log(&self) -> JsonlAuditLog {
        JsonlAuditLog::new(self.audit_path.clone())
    }

    /// Loads the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be loaded.
    pub fn load_config(&self) -> Result<Config> {
        Ok(Config::load(&self.dir)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_discover_requires_init() {
        let temp_dir = TempDir::new().unwrap();
        let err = DataDir::discover(Some(temp_dir.path())).unwrap_err();
        assert!(matches!(err, AppError::RepoNotInitialized { .. }));

        let (_, created) = DataDir::init(temp_dir.path()).unwrap();
        assert!(created);
        let (_, created_again) = DataDir::init(temp_dir.path()).unwrap();
        assert!(!created_again);

        let data_dir = DataDir::discover(Some(temp_dir.path())).unwrap();
        assert!(data_dir.config_path().exists());
        assert!(data_dir.open_store().is_ok());
    }
}
