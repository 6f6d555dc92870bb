//! The backup, write and apply sequence.
//!
//! Stages run strictly in order and the first fatal error stops the run:
//!
//! 1. **Overlap scan**: warn about other files defining the same interfaces
//! 2. **Backup**: copy existing YAML files into a timestamped directory
//! 3. **Write**: atomically replace the output file (mode `0600`)
//! 4. **Apply**: run the apply command; its exit code becomes ours
//!
//! Parameters arrive already validated and the document already rendered,
//! so nothing on disk changes before this module runs.

use std::path::{Path, PathBuf};

use netplan_core::{
    backup_configs, find_overlaps, write_document, BackupError, BackupSet, ConfigDocument,
    NetworkParams, Overlap, RenderError, ValidationError, WriteError,
};
use thiserror::Error;

use crate::prompt::PromptError;
use crate::settings::{Settings, SettingsError};
use crate::system::{ApplyError, ConfigApplier};

/// Every fatal failure of a run, labelled with the stage it came from.
#[derive(Debug, Error)]
pub enum NetplanError {
    #[error("configuration failed: {0}")]
    Settings(#[from] SettingsError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("failed to read input: {0}")]
    Input(std::io::Error),
    #[error("this command must run as root (try sudo, or set require_root = false)")]
    NotRoot,
    #[error("render failed: {0}")]
    Render(#[from] RenderError),
    #[error("backup failed: {0}")]
    Backup(#[from] BackupError),
    #[error("write failed: {0}")]
    Write(#[from] WriteError),
    #[error("apply failed: {0}")]
    Apply(#[from] ApplyError),
}

impl From<PromptError> for NetplanError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::Io(err) => Self::Input(err),
            PromptError::Validation(err) => Self::Validation(err),
        }
    }
}

/// Notable steps reported while the pipeline runs.
#[derive(Debug, Clone, Copy)]
pub enum Progress<'a> {
    /// Another file also defines some of the interfaces being written.
    Overlap(&'a Overlap),
    /// A backup directory was created (possibly with skipped files).
    BackedUp(&'a BackupSet),
    /// The netplan directory does not exist yet.
    NothingToBackUp(&'a Path),
    /// Backups were switched off.
    BackupDisabled,
    /// The document is on disk.
    Written(&'a Path),
    /// The apply command is about to run.
    Applying,
    /// The apply command finished with this code.
    Applied(i32),
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub overlaps: Vec<Overlap>,
    pub backup: Option<BackupSet>,
    pub written: PathBuf,
    pub apply_code: Option<i32>,
}

impl Outcome {
    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> i32 {
        self.apply_code.unwrap_or(0)
    }
}

/// Refuse to continue when `require_root` is set and `is_root` says no.
///
/// A dry run changes nothing, so it skips the check.
pub fn check_root(
    require_root: bool,
    dry_run: bool,
    is_root: impl FnOnce() -> bool,
) -> Result<(), NetplanError> {
    if require_root && !dry_run && !is_root() {
        return Err(NetplanError::NotRoot);
    }
    Ok(())
}

/// Back up, write `document` to `params.output_path()`, then optionally apply.
///
/// `stamp` names the backup directory (see [`netplan_core::backup_stamp`]).
pub fn execute(
    params: &NetworkParams,
    document: &ConfigDocument,
    settings: &Settings,
    applier: &dyn ConfigApplier,
    stamp: &str,
    progress: &mut dyn FnMut(Progress<'_>),
) -> Result<Outcome, NetplanError> {
    let output = params.output_path();

    let overlaps = find_overlaps(&settings.netplan_dir, output, &params.interface_names());
    for overlap in &overlaps {
        tracing::debug!(
            "{} also defines {}",
            overlap.file.display(),
            overlap.interfaces.join(", ")
        );
        progress(Progress::Overlap(overlap));
    }

    let backup = if params.backup_enabled() {
        let backup = backup_configs(&settings.netplan_dir, &settings.backup_prefix, stamp)?;
        match &backup {
            Some(set) => progress(Progress::BackedUp(set)),
            None => progress(Progress::NothingToBackUp(&settings.netplan_dir)),
        }
        backup
    } else {
        progress(Progress::BackupDisabled);
        None
    };

    write_document(output, document)?;
    tracing::debug!(
        "wrote {} bytes to {}",
        document.as_str().len(),
        output.display()
    );
    progress(Progress::Written(output));

    let apply_code = if params.apply_enabled() {
        progress(Progress::Applying);
        let code = applier.apply()?;
        progress(Progress::Applied(code));
        Some(code)
    } else {
        None
    };

    Ok(Outcome {
        overlaps,
        backup,
        written: output.to_path_buf(),
        apply_code,
    })
}
