// 💾 Backups - timestamped copies of the data directory
//
// Layout on disk:
//
//   <backup_dir>/
//     backup_2025-03-14_15-09-26/
//       data/            (copy of <data_dir>)
//
// Folder names sort chronologically, so "newest first" is a reverse name sort.

use crate::config::Config;
use anyhow::{bail, Context, Result};
use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const BACKUP_PREFIX: &str = "backup_";
const DATA_SUBDIR: &str = "data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupInfo {
    pub name: String,
    pub path: PathBuf,
    /// Total bytes of all files under the backup
    pub size: u64,
}

pub struct BackupService {
    data_dir: PathBuf,
    backup_dir: PathBuf,
    timestamp_format: String,
}

impl BackupService {
    pub fn new(config: &Config) -> Self {
        BackupService {
            data_dir: config.data_dir.clone(),
            backup_dir: config.backup_root().to_path_buf(),
            timestamp_format: config.timestamp_format.clone(),
        }
    }

    /// Copy the data directory into a fresh `backup_<timestamp>` folder.
    ///
    /// A missing data directory still produces an (empty) backup folder.
    pub fn create_backup(&self) -> Result<PathBuf> {
        let stamp = Local::now().format(&self.timestamp_format).to_string();
        let target = self.unused_backup_path(&stamp);

        fs::create_dir_all(&target)
            .with_context(|| format!("Failed to create backup directory: {:?}", target))?;

        if self.data_dir.exists() {
            copy_dir(&self.data_dir, &target.join(DATA_SUBDIR))?;
        }

        info!(path = ?target, "backup created");
        Ok(target)
    }

    /// `backup_*` folders in `backup_dir`, newest first. Missing directory means none.
    pub fn list_backups(&self) -> Result<Vec<BackupInfo>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&self.backup_dir)
            .with_context(|| format!("Failed to read backup directory: {:?}", self.backup_dir))?;

        let mut backups = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable backup entry");
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let path = entry.path();
            // only our own `backup_*` folders; the directory may hold anything else
            if !name.starts_with(BACKUP_PREFIX) || !path.is_dir() {
                continue;
            }

            let size = match directory_size(&path) {
                Ok(size) => size,
                Err(e) => {
                    warn!(path = ?path, error = %e, "could not measure backup");
                    0
                }
            };
            backups.push(BackupInfo {
                name,
                path,
                size,
            });
        }

        backups.sort_by(|a, b| b.name.cmp(&a.name));
        Ok(backups)
    }

    /// Delete all but the `keep` newest backups. Returns how many were removed.
    pub fn clean_old_backups(&self, keep: usize) -> Result<usize> {
        let mut removed = 0;
        for backup in self.list_backups()?.into_iter().skip(keep) {
            fs::remove_dir_all(&backup.path)
                .with_context(|| format!("Failed to delete backup: {:?}", backup.path))?;
            debug!(name = %backup.name, "old backup deleted");
            removed += 1;
        }

        if removed > 0 {
            info!(removed, keep, "old backups cleaned");
        }
        Ok(removed)
    }

    /// Replace the data directory with the `data/` folder of a backup.
    pub fn restore(&self, backup_path: &Path) -> Result<()> {
        if !backup_path.exists() {
            bail!("Backup not found: {:?}", backup_path);
        }

        let source = backup_path.join(DATA_SUBDIR);
        if !source.is_dir() {
            bail!("Backup has no data directory: {:?}", backup_path);
        }

        if self.data_dir.exists() {
            fs::remove_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to clear data directory: {:?}", self.data_dir))?;
        }
        copy_dir(&source, &self.data_dir)?;

        info!(from = ?backup_path, "data restored");
        Ok(())
    }

    fn unused_backup_path(&self, stamp: &str) -> PathBuf {
        let base = self.backup_dir.join(format!("{}{}", BACKUP_PREFIX, stamp));
        if !base.exists() {
            return base;
        }
        // same-second backups get a numeric suffix
        (1..)
            .map(|n| self.backup_dir.join(format!("{}{}_{}", BACKUP_PREFIX, stamp, n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(base)
    }
}

/// Total size in bytes of every regular file under `path`; 0 if it does not exist.
pub fn directory_size(path: &Path) -> Result<u64> {
    if !path.exists() {
        return Ok(0);
    }
    if path.is_file() {
        let meta = fs::metadata(path).with_context(|| format!("Failed to stat {:?}", path))?;
        return Ok(meta.len());
    }

    let mut total = 0;
    for entry in fs::read_dir(path).with_context(|| format!("Failed to read {:?}", path))? {
        let entry = entry?;
        total += directory_size(&entry.path())?;
    }
    Ok(total)
}

fn copy_dir(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(target).with_context(|| format!("Failed to create {:?}", target))?;

    for entry in fs::read_dir(source).with_context(|| format!("Failed to read {:?}", source))? {
        let entry = entry?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        if from.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            fs::copy(&from, &to).with_context(|| format!("Failed to copy {:?}", from))?;
        }
    }
    Ok(())
}
