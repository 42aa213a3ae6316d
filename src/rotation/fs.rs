//! Filesystem access used by the rotation engine

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};

/// A file found in the logs directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub path: PathBuf,
    pub created: DateTime<Utc>,
    pub size: u64,
}

/// Fallible filesystem operations needed to manage log files
pub trait LogFileSystem: Send + Sync {
    fn create_dir_all(&self, dir: &Path) -> io::Result<()>;

    /// Create a new, empty file. Fails if the file already exists.
    fn create_file(&self, path: &Path) -> io::Result<()>;

    fn append(&self, path: &Path, data: &[u8]) -> io::Result<()>;

    fn delete_file(&self, path: &Path) -> io::Result<()>;

    /// Regular files directly inside `dir`
    fn list_directory(&self, dir: &Path) -> io::Result<Vec<FileMetadata>>;
}

/// [`LogFileSystem`] backed by `std::fs`
///
/// Keeps the most recently written file open so consecutive appends reuse
/// the same handle.
#[derive(Debug, Default)]
pub struct StdFileSystem {
    open: Mutex<Option<(PathBuf, File)>>,
}

impl StdFileSystem {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogFileSystem for StdFileSystem {
    fn create_dir_all(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)
    }

    fn create_file(&self, path: &Path) -> io::Result<()> {
        let file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        *open = Some((path.to_path_buf(), file));
        Ok(())
    }

    fn append(&self, path: &Path, data: &[u8]) -> io::Result<()> {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);

        let cached = matches!(open.as_ref(), Some((open_path, _)) if open_path == path);
        if !cached {
            let file = OpenOptions::new().append(true).open(path)?;
            *open = Some((path.to_path_buf(), file));
        }

        match open.as_mut() {
            Some((_, file)) => file.write_all(data),
            None => Err(io::Error::new(io::ErrorKind::Other, "log file not open")),
        }
    }

    fn delete_file(&self, path: &Path) -> io::Result<()> {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        if matches!(open.as_ref(), Some((open_path, _)) if open_path == path) {
            *open = None;
        }
        drop(open);

        fs::remove_file(path)
    }

    fn list_directory(&self, dir: &Path) -> io::Result<Vec<FileMetadata>> {
        let mut files = Vec::new();

        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let metadata = match entry.metadata() {
                Ok(metadata) if metadata.is_file() => metadata,
                _ => continue,
            };

            // Birth time is not available everywhere
            let created = match metadata.created().or_else(|_| metadata.modified()) {
                Ok(time) => DateTime::<Utc>::from(time),
                Err(_) => continue,
            };

            files.push(FileMetadata {
                path: entry.path(),
                created,
                size: metadata.len(),
            });
        }

        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_append_list_delete() {
        let temp_dir = TempDir::new().unwrap();
        let fs = StdFileSystem::new();
        let path = temp_dir.path().join("a.log");

        fs.create_file(&path).unwrap();
        fs.append(&path, b"hello\n").unwrap();
        fs.append(&path, b"world\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\nworld\n");

        let listed = fs.list_directory(temp_dir.path()).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, path);
        assert_eq!(listed[0].size, 12);

        fs.delete_file(&path).unwrap();
        assert!(!path.exists());
        assert!(fs.list_directory(temp_dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_create_file_refuses_existing() {
        let temp_dir = TempDir::new().unwrap();
        let fs = StdFileSystem::new();
        let path = temp_dir.path().join("a.log");

        fs.create_file(&path).unwrap();
        let err = fs.create_file(&path).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_append_switches_files() {
        let temp_dir = TempDir::new().unwrap();
        let fs = StdFileSystem::new();
        let first = temp_dir.path().join("first.log");
        let second = temp_dir.path().join("second.log");

        fs.create_file(&first).unwrap();
        fs.create_file(&second).unwrap();
        fs.append(&first, b"1").unwrap();
        fs.append(&second, b"2").unwrap();
        fs.append(&first, b"3").unwrap();

        assert_eq!(std::fs::read_to_string(&first).unwrap(), "13");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "2");
    }

    #[test]
    fn test_list_skips_directories() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();
        let fs = StdFileSystem::new();
        assert!(fs.list_directory(temp_dir.path()).unwrap().is_empty());
    }
}
