//! File persistence for the uploads directory.
//!
//! A thin, stateless wrapper over the filesystem, rooted at the configured
//! uploads directory. All paths given to [`FileStore`] methods are relative
//! to that root.

use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// File storage rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Absolute-ish location of a stored file (root + relative name).
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Write `bytes` to `name` under the root, creating parent directories
    /// if absent. An existing file is overwritten.
    pub fn save(&self, name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.resolve(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        Ok(())
    }

    /// Delete `name` if present. A missing file is not an error, so the
    /// operation is idempotent.
    pub fn remove(&self, name: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.resolve(name)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Size in bytes of a stored file.
    pub fn stat(&self, name: &str) -> Result<u64, StoreError> {
        let path = self.resolve(name);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.len()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Whether a stored file currently exists on disk.
    pub fn exists(&self, name: &str) -> bool {
        self.resolve(name).exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_creates_parent_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("uploads"));

        store.save("nested/dir/file.bin", b"abc").unwrap();
        assert_eq!(
            fs::read(tmp.path().join("uploads/nested/dir/file.bin")).unwrap(),
            b"abc"
        );
    }

    #[test]
    fn save_overwrites_existing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());

        store.save("file.bin", b"first").unwrap();
        store.save("file.bin", b"second").unwrap();
        assert_eq!(store.stat("file.bin").unwrap(), 6);
    }

    #[test]
    fn remove_is_idempotent() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());

        store.save("file.bin", b"abc").unwrap();
        store.remove("file.bin").unwrap();
        assert!(!store.exists("file.bin"));
        // Second remove of the same name: still Ok.
        store.remove("file.bin").unwrap();
    }

    #[test]
    fn stat_reports_size() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());

        store.save("file.bin", &[0u8; 1234]).unwrap();
        assert_eq!(store.stat("file.bin").unwrap(), 1234);
    }

    #[test]
    fn stat_missing_file_is_not_found() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileStore::new(tmp.path());

        let err = store.stat("missing.bin").unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)), "got {err:?}");
    }
}
