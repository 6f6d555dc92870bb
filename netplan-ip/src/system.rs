//! Process-boundary adapters: listing interfaces and applying a configuration
//! by running external commands, plus the effective-uid check.

use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus};

use netplan_core::{parse_ip_json, InterfaceInfo};
use thiserror::Error;

/// Source of the interfaces offered for selection.
pub trait InterfaceLister {
    /// Best-effort listing; failures yield an empty list.
    fn list_interfaces(&self) -> Vec<InterfaceInfo>;
}

/// Something that activates a written configuration.
pub trait ConfigApplier {
    /// Run the apply step once and return its exit code.
    fn apply(&self) -> Result<i32, ApplyError>;
}

/// The apply command could not be started at all.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
}

/// Lists interfaces by running a command that prints `ip -json` output.
#[derive(Debug, Clone)]
pub struct CommandLister {
    argv: Vec<String>,
}

impl CommandLister {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }
}

impl InterfaceLister for CommandLister {
    fn list_interfaces(&self) -> Vec<InterfaceInfo> {
        let Some((program, args)) = self.argv.split_first() else {
            return Vec::new();
        };
        let output = match Command::new(program).args(args).output() {
            Ok(output) => output,
            Err(err) => {
                tracing::warn!(
                    "could not list interfaces with `{}`: {err}",
                    self.argv.join(" ")
                );
                return Vec::new();
            }
        };
        if !output.status.success() {
            tracing::warn!(
                "`{}` exited with {}: {}",
                self.argv.join(" "),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Vec::new();
        }

        let interfaces = parse_ip_json(&String::from_utf8_lossy(&output.stdout));
        tracing::debug!("enumerated {} interfaces", interfaces.len());
        interfaces
    }
}

/// Applies the configuration by running a command such as `netplan apply`.
#[derive(Debug, Clone)]
pub struct CommandApplier {
    argv: Vec<String>,
}

impl CommandApplier {
    pub fn new(argv: Vec<String>) -> Self {
        Self { argv }
    }

    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

impl ConfigApplier for CommandApplier {
    fn apply(&self) -> Result<i32, ApplyError> {
        let spawn_err = |source: std::io::Error| ApplyError::Spawn {
            command: self.command_line(),
            source,
        };
        let (program, args) = self.argv.split_first().ok_or_else(|| {
            spawn_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "empty command",
            ))
        })?;

        let status = Command::new(program).args(args).status().map_err(spawn_err)?;
        Ok(exit_code(status))
    }
}

/// Shell-style exit code: the process code, or 128 + signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(signal)) => 128 + signal,
        (None, None) => 1,
    }
}

/// Whether the process runs with an effective uid of 0.
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}
