// ⚙️ Configuration - built once at startup, passed by reference
//
// Lookup order for the config file:
// 1. `--config <path>` on the command line (must exist)
// 2. `ccrm.json` in the working directory, if present
// 3. Built-in defaults
//
// Any field missing from the file keeps its default.

use anyhow::{Context as AnyhowContext, Result};
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "ccrm.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the CSV files
    pub data_dir: PathBuf,

    /// Directory receiving `backup_<timestamp>` folders
    pub backup_dir: PathBuf,

    /// chrono format string for backup folder names
    pub timestamp_format: String,

    /// Backups kept by `backup clean` when no count is given
    pub keep_backups: usize,

    pub students_file: String,
    pub courses_file: String,
    pub enrollments_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data_dir: PathBuf::from("data"),
            backup_dir: PathBuf::from("backups"),
            timestamp_format: "%Y-%m-%d_%H-%M-%S".to_string(),
            keep_backups: 5,
            students_file: "students.csv".to_string(),
            courses_file: "courses.csv".to_string(),
            enrollments_file: "enrollments.csv".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Explicit path if given, else `ccrm.json` if it exists, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Config::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Config::from_file(fallback)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    pub fn data_path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn students_path(&self) -> PathBuf {
        self.data_path(&self.students_file)
    }

    pub fn courses_path(&self) -> PathBuf {
        self.data_path(&self.courses_file)
    }

    pub fn enrollments_path(&self) -> PathBuf {
        self.data_path(&self.enrollments_file)
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_dir
    }

    /// Render a backup timestamp for `now` using `timestamp_format`.
    pub fn timestamp<Tz>(&self, now: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        now.format(&self.timestamp_format).to_string()
    }
}
