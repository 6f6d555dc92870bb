use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use thiserror::Error;

/// File extensions treated as netplan configuration.
pub const CONFIG_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

// Attempts at a unique directory name before giving up.
const MAX_SUFFIX: u32 = 100;

/// Errors that abort a backup. Per-file copy failures are not errors; see
/// [`BackupSet::skipped`].
#[derive(Debug, Error)]
pub enum BackupError {
    /// The configuration directory exists but could not be listed.
    #[error("failed to list {path}: {source}")]
    Scan { path: String, source: io::Error },
    /// The timestamped backup directory could not be created.
    #[error("failed to create backup directory {path}: {source}")]
    CreateDir { path: String, source: io::Error },
}

/// A configuration file that could not be copied into the backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Result of one backup run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSet {
    /// Freshly created backup directory.
    pub dir: PathBuf,
    /// Backup copies, in source file name order.
    pub copied: Vec<PathBuf>,
    /// Source files that could not be copied.
    pub skipped: Vec<SkippedFile>,
}

/// Timestamp used in backup directory names, e.g. `20250131-142501`.
pub fn backup_stamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d-%H%M%S").to_string()
}

/// [`backup_stamp`] for the current local time.
pub fn current_stamp() -> String {
    backup_stamp(Local::now())
}

/// Return true when `path` has a netplan configuration extension.
pub fn is_config_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| CONFIG_EXTENSIONS.contains(&ext))
}

/// List configuration files directly inside `dir`, sorted by name.
///
/// Directories are ignored; symlinks are listed whatever they point to.
pub fn list_config_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            continue;
        }
        let path = entry.path();
        if is_config_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Copy every configuration file in `dir` into `<dir>/<prefix><stamp>`.
///
/// Returns `Ok(None)` when `dir` does not exist. A file that fails to copy
/// is logged and recorded in [`BackupSet::skipped`]; only listing `dir` or
/// creating the backup directory can fail the whole backup.
pub fn backup_configs(
    dir: &Path,
    prefix: &str,
    stamp: &str,
) -> Result<Option<BackupSet>, BackupError> {
    let sources = match list_config_files(dir) {
        Ok(files) => files,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(BackupError::Scan {
                path: dir.display().to_string(),
                source,
            })
        }
    };

    let backup_dir = create_unique_dir(dir, &format!("{prefix}{stamp}"))?;

    let mut copied = Vec::new();
    let mut skipped = Vec::new();
    for src in sources {
        let Some(name) = src.file_name() else {
            continue;
        };
        let dst = backup_dir.join(name);
        match fs::copy(&src, &dst) {
            Ok(_) => {
                tracing::debug!("backed up {} to {}", src.display(), dst.display());
                copied.push(dst);
            }
            Err(err) => {
                tracing::warn!("could not back up {}: {err}", src.display());
                skipped.push(SkippedFile {
                    path: src,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(Some(BackupSet {
        dir: backup_dir,
        copied,
        skipped,
    }))
}

fn create_unique_dir(parent: &Path, base: &str) -> Result<PathBuf, BackupError> {
    let mut last_err = None;
    for attempt in 0..MAX_SUFFIX {
        let candidate = if attempt == 0 {
            parent.join(base)
        } else {
            parent.join(format!("{base}-{attempt}"))
        };
        match fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => last_err = Some(err),
            Err(source) => {
                return Err(BackupError::CreateDir {
                    path: candidate.display().to_string(),
                    source,
                })
            }
        }
    }

    Err(BackupError::CreateDir {
        path: parent.join(base).display().to_string(),
        source: last_err.unwrap_or_else(|| io::Error::from(io::ErrorKind::AlreadyExists)),
    })
}
