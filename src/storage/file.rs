//! File-backed storage area for native clients.
//!
//! Each key is one file inside the area's directory. The directory is created
//! lazily on first write; a missing directory reads as empty.

#[cfg(test)]
#[path = "file_test.rs"]
mod file_test;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{StorageArea, StorageError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileArea {
    dir: PathBuf,
}

impl FileArea {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key != "."
            && key != ".."
            && !key.contains(['/', '\\']);
        if !valid {
            return Err(StorageError::Backend(format!("invalid storage key: {key:?}")));
        }
        Ok(self.dir.join(key))
    }
}

fn backend(err: io::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

impl StorageArea for FileArea {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw.trim_end_matches('\n').to_owned())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(backend(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir).map_err(backend)?;
        fs::write(&path, value).map_err(backend)?;
        restrict_permissions(&path).map_err(backend)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(backend(err)),
        }
    }
}

// Tokens are credentials; keep them owner-readable only.
#[cfg(unix)]
fn restrict_permissions(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
}
