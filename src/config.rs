//! Runtime settings shared by every subcommand. Each flag falls back to an
//! environment variable, then to a per-user default location.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use directories::ProjectDirs;
use freeze_core::db::Database;
use freeze_core::local::FileStore;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:3000";

#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// SQLite database file
    #[arg(long, global = true, env = "FREEZE3B_DB")]
    pub db: Option<PathBuf>,

    /// Directory holding this device's anonymous workflow state
    #[arg(long, global = true, env = "FREEZE3B_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Port for the HTTP API
    #[arg(short, long, global = true, env = "FREEZE3B_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Server that receives anonymous freeze telemetry
    #[arg(long, global = true, env = "FREEZE3B_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,
}

impl Settings {
    pub fn open_database(&self) -> Result<Database> {
        let db = match &self.db {
            Some(path) => Database::open(path)?,
            None => Database::open_default()?,
        };
        db.migrate()?;
        Ok(db)
    }

    pub fn device_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(project_dirs()?.data_dir().join("device")),
        }
    }

    /// The device-local key-value store used by the anonymous flow.
    pub fn device_store(&self) -> Result<FileStore> {
        Ok(FileStore::new(self.device_dir()?))
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "3bfreeze", "freeze3b").context("could not determine a home directory")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(dir: &std::path::Path) -> Settings {
        Settings {
            db: Some(dir.join("freeze.db")),
            data_dir: Some(dir.join("device")),
            port: DEFAULT_PORT,
            server: DEFAULT_SERVER.into(),
        }
    }

    #[test]
    fn explicit_paths_win() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        assert_eq!(settings.device_dir().unwrap(), dir.path().join("device"));
    }

    #[test]
    fn opening_creates_and_migrates_the_database() {
        let dir = tempfile::tempdir().unwrap();
        let db = settings(dir.path()).open_database().unwrap();
        assert!(dir.path().join("freeze.db").exists());
        assert!(db.get_bureau_statuses(uuid::Uuid::new_v4()).unwrap().is_empty());
    }
}
