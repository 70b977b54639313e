//! Storage port
//!
//! The file system is the sole persistence layer. Every mutation is a full
//! read-modify-write of one document; writes go through a temp file in the
//! target directory followed by a rename, so readers never observe a torn
//! document. There is no locking: concurrent invocations racing on the same
//! file resolve last-write-wins.

use crate::error::{EngineError, EngineResult};
use std::io::Write;
use std::path::Path;

/// File read/write abstraction consumed by the engine.
pub trait Storage {
    fn read_to_string(&self, path: &Path) -> EngineResult<String>;
    fn write(&self, path: &Path, content: &str) -> EngineResult<()>;
    fn append(&self, path: &Path, content: &str) -> EngineResult<()>;
    fn copy(&self, from: &Path, to: &Path) -> EngineResult<()>;
    fn exists(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> EngineResult<()>;
}

/// Real file-system storage with atomic writes.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl Storage for FsStorage {
    fn read_to_string(&self, path: &Path) -> EngineResult<String> {
        std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))
    }

    fn write(&self, path: &Path, content: &str) -> EngineResult<()> {
        let dir = match path.parent() {
            Some(d) if !d.as_os_str().is_empty() => d,
            _ => Path::new("."),
        };
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| EngineError::io(dir, e))?;
        }

        // Temp file must live in the target directory so the rename stays on
        // one file system.
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(|e| EngineError::io(path, e))?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| EngineError::io(path, e))?;
        tmp.persist(path)
            .map_err(|e| EngineError::io(path, e.error))?;
        Ok(())
    }

    fn append(&self, path: &Path, content: &str) -> EngineResult<()> {
        use std::fs::OpenOptions;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| EngineError::io(path, e))?;
        file.write_all(content.as_bytes())
            .map_err(|e| EngineError::io(path, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> EngineResult<()> {
        std::fs::copy(from, to)
            .map(|_| ())
            .map_err(|e| EngineError::io(from, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn create_dir_all(&self, path: &Path) -> EngineResult<()> {
        std::fs::create_dir_all(path).map_err(|e| EngineError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.md");

        let storage = FsStorage;
        storage.write(&path, "# Heading\n").unwrap();
        assert_eq!(storage.read_to_string(&path).unwrap(), "# Heading\n");
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("core/nested/doc.md");

        FsStorage.write(&path, "x").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_write_replaces_existing_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.md");

        let storage = FsStorage;
        storage.write(&path, "old").unwrap();
        storage.write(&path, "new").unwrap();
        assert_eq!(storage.read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_append_creates_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("log.md");

        let storage = FsStorage;
        storage.append(&path, "- entry one\n").unwrap();
        storage.append(&path, "- entry two\n").unwrap();
        assert_eq!(
            storage.read_to_string(&path).unwrap(),
            "- entry one\n- entry two\n"
        );
    }

    #[test]
    fn test_read_missing_file_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("absent.md");

        let err = FsStorage.read_to_string(&path).unwrap_err();
        assert!(err.to_string().contains("absent.md"));
    }
}
