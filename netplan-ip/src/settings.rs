use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Paths, commands and policies threaded through a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Directory netplan reads its YAML files from.
    pub netplan_dir: PathBuf,
    /// File written inside `netplan_dir` (an absolute path is used as is).
    pub output_file: String,
    /// Value of `network.renderer` in generated documents.
    pub renderer: String,
    /// Prefix of timestamped backup directories.
    pub backup_prefix: String,
    /// Command printing `ip -json address show` style output.
    pub list_command: Vec<String>,
    /// Command applying the written configuration.
    pub apply_command: Vec<String>,
    /// Refuse to change anything unless running as root.
    pub require_root: bool,
}

const EMBEDDED: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/defaults/settings.toml"
));

/// Partial settings as found in a TOML file; absent keys keep their value.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsFile {
    netplan_dir: Option<PathBuf>,
    output_file: Option<String>,
    renderer: Option<String>,
    backup_prefix: Option<String>,
    list_command: Option<Vec<String>>,
    apply_command: Option<Vec<String>>,
    require_root: Option<bool>,
}

/// Errors returned when loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid settings in {path}: {reason}")]
    Invalid { path: String, reason: String },
}

impl Settings {
    /// Built-in settings from the embedded `defaults/settings.toml`.
    pub fn builtin() -> Self {
        match parse_overlay(EMBEDDED, Self::fallback(), "embedded settings".to_string()) {
            Ok(settings) => settings,
            Err(err) => {
                tracing::warn!("ignoring built-in settings: {err}");
                Self::fallback()
            }
        }
    }

    /// Built-in settings overlaid with the keys present in `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        parse_overlay(&raw, Self::builtin(), path.display().to_string())
    }

    /// Full path of the file to write.
    pub fn output_path(&self) -> PathBuf {
        self.netplan_dir.join(&self.output_file)
    }

    fn fallback() -> Self {
        Self {
            netplan_dir: PathBuf::from("/etc/netplan"),
            output_file: "01-netplan-ip.yaml".to_string(),
            renderer: "networkd".to_string(),
            backup_prefix: "backup-".to_string(),
            list_command: ["ip", "-json", "address", "show"]
                .map(str::to_string)
                .to_vec(),
            apply_command: ["netplan", "apply"].map(str::to_string).to_vec(),
            require_root: true,
        }
    }
}

fn parse_overlay(raw: &str, base: Settings, path: String) -> Result<Settings, SettingsError> {
    let file: SettingsFile = toml::from_str(raw).map_err(|source| SettingsError::Parse {
        path: path.clone(),
        source,
    })?;

    let settings = Settings {
        netplan_dir: file.netplan_dir.unwrap_or(base.netplan_dir),
        output_file: file.output_file.unwrap_or(base.output_file),
        renderer: file.renderer.unwrap_or(base.renderer),
        backup_prefix: file.backup_prefix.unwrap_or(base.backup_prefix),
        list_command: file.list_command.unwrap_or(base.list_command),
        apply_command: file.apply_command.unwrap_or(base.apply_command),
        require_root: file.require_root.unwrap_or(base.require_root),
    };

    let invalid = |reason: &str| SettingsError::Invalid {
        path: path.clone(),
        reason: reason.to_string(),
    };
    if settings.list_command.is_empty() {
        return Err(invalid("list_command must name a program"));
    }
    if settings.apply_command.is_empty() {
        return Err(invalid("apply_command must name a program"));
    }
    if settings.output_file.trim().is_empty() {
        return Err(invalid("output_file must not be empty"));
    }
    if settings.backup_prefix.contains('/') {
        return Err(invalid("backup_prefix must not contain '/'"));
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::{parse_overlay, Settings, SettingsError, EMBEDDED};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn embedded_defaults_match_fallback() {
        assert_eq!(Settings::builtin(), Settings::fallback());
    }

    #[test]
    fn embedded_defaults_parse_without_falling_back() {
        let parsed = parse_overlay(EMBEDDED, Settings::fallback(), "embedded".to_string())
            .expect("embedded settings must parse");
        assert_eq!(parsed.list_command, vec!["ip", "-json", "address", "show"]);
    }

    #[test]
    fn output_path_joins_dir_and_file() {
        let settings = Settings::builtin();
        assert_eq!(
            settings.output_path(),
            PathBuf::from("/etc/netplan/01-netplan-ip.yaml")
        );
    }

    #[test]
    fn file_overrides_only_present_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.toml");
        fs::write(
            &path,
            r#"
netplan_dir = "/tmp/netplan"
apply_command = ["true"]
require_root = false
"#,
        )
        .expect("write settings");

        let settings = Settings::load(&path).expect("settings should parse");
        assert_eq!(settings.netplan_dir, PathBuf::from("/tmp/netplan"));
        assert_eq!(settings.apply_command, vec!["true"]);
        assert!(!settings.require_root);
        assert_eq!(settings.renderer, "networkd");
        assert_eq!(settings.output_file, "01-netplan-ip.yaml");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_toml() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.toml");

        fs::write(&path, "netplan_directory = \"/x\"").expect("write");
        assert!(matches!(
            Settings::load(&path),
            Err(SettingsError::Parse { .. })
        ));

        fs::write(&path, "renderer = [").expect("write");
        assert!(matches!(
            Settings::load(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_empty_commands() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.toml");
        fs::write(&path, "apply_command = []").expect("write");

        let err = Settings::load(&path).expect_err("should fail");
        match err {
            SettingsError::Invalid { reason, .. } => assert!(reason.contains("apply_command")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Settings::load(&PathBuf::from("/nonexistent/netplan-ip.toml"))
            .expect_err("should fail");
        assert!(matches!(err, SettingsError::Io { .. }));
    }
}
