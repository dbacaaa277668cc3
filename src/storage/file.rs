//! Directory-backed key/value store.
//!
//! Each key lives in its own `<key>.json` file inside the data directory.
//! Writes land in a temporary file that is renamed over the old one while an
//! exclusive lock on `.lock` is held, so a reader never sees half a value and
//! two invocations never interleave their writes.

use super::KeyValueStore;
use crate::constants::{STORE_FILE_EXTENSION, STORE_LOCK_FILE};
use crate::errors::{AppError, AppResult, StorageError};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// The built-in store: plain files in the data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: &Path) -> Self {
        FileStore {
            dir: dir.to_path_buf(),
        }
    }

    /// Directory holding the key files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maps a key to its file, rejecting keys that could escape the directory.
    fn path_for(&self, key: &str) -> AppResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::Backend {
                backend: self.name().to_string(),
                message: format!("invalid key '{}'", key),
            }
            .into());
        }
        Ok(self.dir.join(format!("{}{}", key, STORE_FILE_EXTENSION)))
    }

    /// Ensures the data directory exists, creating it owner-only if necessary.
    pub fn ensure_dir(&self) -> AppResult<()> {
        if self.dir.exists() {
            return Ok(());
        }

        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create data directory: {}", e),
            ))
        })?;

        #[cfg(unix)]
        {
            let permissions =
                fs::Permissions::from_mode(crate::constants::DEFAULT_DIR_PERMISSIONS);
            fs::set_permissions(&self.dir, permissions)?;
            debug!("Set owner-only permissions on data directory");
        }

        Ok(())
    }

    /// Opens the lock file and takes an exclusive lock on it.
    fn lock(&self) -> AppResult<File> {
        self.ensure_dir()?;
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(self.dir.join(STORE_LOCK_FILE))?;
        lock_file.lock_exclusive()?;
        Ok(lock_file)
    }
}

impl KeyValueStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        let lock = self.lock()?;

        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(value.as_bytes())?;
        temp.as_file().sync_all()?;
        temp.persist(&path).map_err(|e| AppError::Io(e.error))?;
        debug!("Wrote {} bytes to {}", value.len(), path.display());

        lock.unlock()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(());
        }

        let lock = self.lock()?;
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        lock.unlock()?;
        Ok(())
    }
}
