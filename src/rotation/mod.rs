//! Log file rotation
//!
//! The [`RotationEngine`] owns the set of log files in one directory. It
//! decides when the active file is rolled over (size, age or explicit
//! request), creates the next file, and enforces the retention limits after
//! every rollover.
//!
//! The engine is not synchronized; callers serialize access (see
//! [`FileDestination`](crate::destination::FileDestination)).

pub mod fs;
mod naming;
mod retention;

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::{categorize_io_error, Error, Result};

use self::fs::LogFileSystem;

pub use naming::{is_log_file, log_file_path};

/// Default maximum size of a single log file (1 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Default rolling frequency (24 hours)
pub const DEFAULT_ROLLING_FREQUENCY: Duration = Duration::from_secs(24 * 60 * 60);

/// Default maximum number of retained files
pub const DEFAULT_MAX_FILE_COUNT: usize = 5;

/// Default disk quota for all retained files (20 MiB)
pub const DEFAULT_DISK_QUOTA_BYTES: u64 = 20 * 1024 * 1024;

/// Upper bound on name collisions tried when creating a file
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Rotation and retention policy
///
/// `None` disables the corresponding limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// Roll over before a write would grow the active file past this size
    pub max_file_size: Option<u64>,
    /// Roll over on the first write once the active file is this old
    pub rolling_frequency: Option<Duration>,
    /// Maximum number of files kept, including the active one
    pub max_file_count: Option<usize>,
    /// Maximum total size of all files kept, including the active one
    pub disk_quota_bytes: Option<u64>,
    /// Never continue writing to a file left over from a previous run
    pub always_create_new: bool,
}

impl RotationConfig {
    /// Policy without any limit
    pub fn unlimited() -> Self {
        Self {
            max_file_size: None,
            rolling_frequency: None,
            max_file_count: None,
            disk_quota_bytes: None,
            always_create_new: false,
        }
    }
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
            rolling_frequency: Some(DEFAULT_ROLLING_FREQUENCY),
            max_file_count: Some(DEFAULT_MAX_FILE_COUNT),
            disk_quota_bytes: Some(DEFAULT_DISK_QUOTA_BYTES),
            always_create_new: false,
        }
    }
}

/// A retained log file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    pub created: DateTime<Utc>,
    pub size: u64,
}

impl LogFile {
    fn age_exceeds(&self, limit: Duration, now: DateTime<Utc>) -> bool {
        // A creation time in the future yields an error and never expires
        (now - self.created)
            .to_std()
            .map(|elapsed| elapsed >= limit)
            .unwrap_or(false)
    }
}

/// State of the active file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    /// No file has been opened yet
    NoFile,
    /// A file is open for appending
    Open,
}

/// Manages the log files of one directory
pub struct RotationEngine {
    directory: PathBuf,
    prefix: String,
    config: RotationConfig,
    fs: Arc<dyn LogFileSystem>,
    active: Option<LogFile>,
    /// Inactive files, oldest first
    archived: Vec<LogFile>,
    discovered: bool,
}

impl RotationEngine {
    pub fn new(
        directory: impl Into<PathBuf>,
        prefix: impl Into<String>,
        config: RotationConfig,
        fs: Arc<dyn LogFileSystem>,
    ) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            config,
            fs,
            active: None,
            archived: Vec::new(),
            discovered: false,
        }
    }

    pub fn state(&self) -> FileState {
        if self.active.is_some() {
            FileState::Open
        } else {
            FileState::NoFile
        }
    }

    pub fn current_file(&self) -> Option<&LogFile> {
        self.active.as_ref()
    }

    pub fn current_log_file_path(&self) -> Option<PathBuf> {
        self.active.as_ref().map(|f| f.path.clone())
    }

    /// All retained files, newest first
    pub fn sorted_files(&self) -> Vec<LogFile> {
        self.active
            .iter()
            .chain(self.archived.iter().rev())
            .cloned()
            .collect()
    }

    pub fn sorted_log_file_paths(&self) -> Vec<PathBuf> {
        self.sorted_files().into_iter().map(|f| f.path).collect()
    }

    /// Open the active file if none is open yet
    pub fn open(&mut self) -> Result<()> {
        self.open_at(Utc::now())
    }

    pub(crate) fn open_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.active.is_some() {
            return Ok(());
        }

        self.discover();

        if !self.config.always_create_new {
            let reusable = self
                .archived
                .last()
                .map(|newest| self.is_reusable(newest, now))
                .unwrap_or(false);
            if reusable {
                self.active = self.archived.pop();
                if let Some(active) = &self.active {
                    tracing::debug!(path = %active.path.display(), "Reusing log file");
                }
                self.sweep();
                return Ok(());
            }
        }

        let file = self.create_file(now)?;
        self.active = Some(file);
        self.sweep();
        Ok(())
    }

    /// Append one record, rolling over first when a limit requires it
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.write_at(data, Utc::now())
    }

    pub(crate) fn write_at(&mut self, data: &[u8], now: DateTime<Utc>) -> Result<()> {
        self.open_at(now)?;

        if self.should_roll(data.len() as u64, now) {
            // On failure the write goes to the current file
            let _ = self.roll_at(now);
        }

        let active = match self.active.as_mut() {
            Some(active) => active,
            None => return Err(Error::WriterStopped),
        };

        match self.fs.append(&active.path, data) {
            Ok(()) => {
                active.size += data.len() as u64;
                Ok(())
            }
            Err(e) => {
                tracing::error!(
                    path = %active.path.display(),
                    kind = categorize_io_error(&e).describe(),
                    error = %e,
                    "Failed to append to log file"
                );
                Err(Error::io("Failed to append to log file", e))
            }
        }
    }

    /// Close the active file, open a new one and enforce retention
    pub fn roll(&mut self) -> Result<()> {
        self.roll_at(Utc::now())
    }

    pub(crate) fn roll_at(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.active.is_none() {
            self.discover();
        }

        let next = self.create_file(now)?;
        if let Some(previous) = self.active.replace(next) {
            tracing::debug!(
                path = %previous.path.display(),
                size = previous.size,
                "Rolled log file"
            );
            self.archived.push(previous);
        }
        self.sweep();
        Ok(())
    }

    /// Delete an inactive retained file
    pub fn delete(&mut self, path: &Path) -> Result<()> {
        if self.active.as_ref().map(|f| f.path == path).unwrap_or(false) {
            return Err(Error::ActiveLogFile(path.to_path_buf()));
        }

        let index = self
            .archived
            .iter()
            .position(|f| f.path == path)
            .ok_or_else(|| Error::UntrackedLogFile(path.to_path_buf()))?;

        match self.fs.delete_file(path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(Error::io("Failed to delete log file", e)),
        }

        self.archived.remove(index);
        Ok(())
    }

    fn should_roll(&self, pending: u64, now: DateTime<Utc>) -> bool {
        let Some(active) = &self.active else {
            return false;
        };

        if let Some(frequency) = self.config.rolling_frequency {
            if active.age_exceeds(frequency, now) {
                return true;
            }
        }

        // An empty file takes the record regardless of its size
        match self.config.max_file_size {
            Some(max) => active.size > 0 && active.size + pending > max,
            None => false,
        }
    }

    fn is_reusable(&self, file: &LogFile, now: DateTime<Utc>) -> bool {
        let small_enough = self.config.max_file_size.map(|max| file.size < max).unwrap_or(true);
        let young_enough = self
            .config
            .rolling_frequency
            .map(|frequency| !file.age_exceeds(frequency, now))
            .unwrap_or(true);
        small_enough && young_enough
    }

    /// Pick up files left in the directory by earlier runs
    ///
    /// Runs once; later calls return immediately.
    pub(crate) fn discover(&mut self) {
        if self.discovered {
            return;
        }
        self.discovered = true;

        if let Err(e) = self.fs.create_dir_all(&self.directory) {
            tracing::warn!(
                path = %self.directory.display(),
                kind = categorize_io_error(&e).describe(),
                error = %e,
                "Failed to create logs directory"
            );
            return;
        }

        let mut found: Vec<LogFile> = match self.fs.list_directory(&self.directory) {
            Ok(files) => files
                .into_iter()
                .filter(|f| is_log_file(&f.path, &self.prefix))
                .map(|f| LogFile {
                    path: f.path,
                    created: f.created,
                    size: f.size,
                })
                .collect(),
            Err(e) => {
                tracing::warn!(
                    path = %self.directory.display(),
                    error = %e,
                    "Failed to list logs directory"
                );
                return;
            }
        };

        found.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.path.cmp(&b.path)));
        self.archived = found;
    }

    fn create_file(&mut self, now: DateTime<Utc>) -> Result<LogFile> {
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let path = log_file_path(&self.directory, &self.prefix, now, attempt);
            if self.is_tracked(&path) {
                continue;
            }

            match self.fs.create_file(&path) {
                Ok(()) => {
                    tracing::debug!(path = %path.display(), "Created log file");
                    return Ok(LogFile {
                        path,
                        created: now,
                        size: 0,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        kind = categorize_io_error(&e).describe(),
                        error = %e,
                        "Failed to create log file"
                    );
                    return Err(Error::io("Failed to create log file", e));
                }
            }
        }

        Err(Error::io(
            "Failed to create log file",
            io::Error::new(io::ErrorKind::AlreadyExists, "no free log file name"),
        ))
    }

    fn is_tracked(&self, path: &Path) -> bool {
        self.active.iter().chain(self.archived.iter()).any(|f| f.path == path)
    }

    fn sweep(&mut self) {
        let removed = retention::enforce_retention(
            &mut self.archived,
            self.active.as_ref(),
            &self.config,
            self.fs.as_ref(),
        );
        if removed > 0 {
            tracing::debug!(removed, "Enforced log retention");
        }
    }
}
