use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::render::ConfigDocument;

/// Mode of written netplan files; netplan warns about anything wider.
pub const CONFIG_FILE_MODE: u32 = 0o600;

/// Errors that can occur while writing a [`ConfigDocument`].
#[derive(Debug, Error)]
pub enum WriteError {
    /// The parent directory could not be created.
    #[error("failed to create directory {path}: {source}")]
    CreateDir { path: String, source: io::Error },
    /// Writing, syncing or renaming the file failed.
    #[error("failed to write {path}: {source}")]
    Io { path: String, source: io::Error },
}

/// Write `document` to `path` with mode `0600`.
///
/// The content goes to a temporary file next to `path` which is then
/// renamed over it, so readers see either the old file or the complete new
/// one. On failure the temporary file is removed.
pub fn write_document(path: &Path, document: &ConfigDocument) -> Result<(), WriteError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|source| WriteError::CreateDir {
        path: parent.display().to_string(),
        source,
    })?;

    let io_err = |source: io::Error| WriteError::Io {
        path: path.display().to_string(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(document.as_bytes()).map_err(io_err)?;
    tmp.as_file()
        .set_permissions(Permissions::from_mode(CONFIG_FILE_MODE))
        .map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|err| io_err(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{write_document, WriteError, CONFIG_FILE_MODE};
    use crate::params::{NetworkParams, RawParams};
    use crate::render::{render, ConfigDocument};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn document() -> ConfigDocument {
        let params = NetworkParams::validate(RawParams {
            static_interface: Some("eth0".to_string()),
            address_cidr: Some("192.168.1.50/24".to_string()),
            gateway: Some("192.168.1.1".to_string()),
            dns_servers: vec!["1.1.1.1".to_string()],
            ..RawParams::default()
        })
        .expect("valid params");
        render(&params, "networkd").expect("render")
    }

    #[test]
    fn writes_owner_only_file_and_creates_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("etc/netplan/01-test.yaml");
        let doc = document();

        write_document(&path, &doc).expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), doc.as_str());
        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, CONFIG_FILE_MODE);
    }

    #[test]
    fn replaces_existing_file_without_leftovers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("01-test.yaml");
        fs::write(&path, "old content").expect("seed");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod");

        write_document(&path, &document()).expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), document().as_str());
        let mode = fs::metadata(&path).expect("metadata").permissions().mode();
        assert_eq!(mode & 0o777, CONFIG_FILE_MODE);
        assert_eq!(fs::read_dir(dir.path()).expect("list").count(), 1);
    }

    #[test]
    fn failure_leaves_no_partial_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("occupied.yaml");
        fs::create_dir(&path).expect("directory in the way");
        fs::write(path.join("keep"), "x").expect("populate");

        let err = write_document(&path, &document()).expect_err("must fail");
        assert!(matches!(err, WriteError::Io { .. }));
        assert!(path.is_dir());
        assert_eq!(fs::read_dir(dir.path()).expect("list").count(), 1);
    }

    #[test]
    fn parent_that_is_a_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("netplan");
        fs::write(&blocker, "not a dir").expect("seed");

        let err = write_document(&blocker.join("01.yaml"), &document()).expect_err("must fail");
        assert!(matches!(err, WriteError::CreateDir { .. }));
    }
}
