//! Detection of other netplan files that define the interfaces about to be
//! written. Netplan merges every file in the directory, so such files can
//! override or extend the new configuration. Nothing here modifies them.

use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::backup::list_config_files;

/// Another configuration file that also defines some of our interfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    pub file: PathBuf,
    pub interfaces: Vec<String>,
}

/// Return the `network.ethernets` keys defined by one netplan document.
pub fn ethernet_names(yaml: &str) -> Option<Vec<String>> {
    let value: Value = serde_yaml::from_str(yaml).ok()?;
    let ethernets = value.get("network")?.get("ethernets")?.as_mapping()?;
    Some(
        ethernets
            .keys()
            .filter_map(|key| key.as_str().map(str::to_string))
            .collect(),
    )
}

/// Scan `dir` for configuration files other than `output` that define any
/// of `interfaces`. Unreadable or unparseable files are ignored.
pub fn find_overlaps(dir: &Path, output: &Path, interfaces: &[&str]) -> Vec<Overlap> {
    let files = match list_config_files(dir) {
        Ok(files) => files,
        Err(err) => {
            tracing::debug!("skipping overlap scan of {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut overlaps = Vec::new();
    for file in files {
        if same_file(&file, output) {
            continue;
        }
        let Ok(raw) = fs::read_to_string(&file) else {
            continue;
        };
        let Some(defined) = ethernet_names(&raw) else {
            tracing::debug!("ignoring unparseable netplan file {}", file.display());
            continue;
        };
        let shared: Vec<String> = interfaces
            .iter()
            .filter(|name| defined.iter().any(|d| d == *name))
            .map(|name| name.to_string())
            .collect();
        if !shared.is_empty() {
            overlaps.push(Overlap {
                file,
                interfaces: shared,
            });
        }
    }
    overlaps
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
