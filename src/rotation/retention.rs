//! Log file retention
//!
//! Deletes the oldest inactive log files until the file count and disk quota
//! limits hold again.

use std::io;

use crate::error::categorize_io_error;

use super::fs::LogFileSystem;
use super::{LogFile, RotationConfig};

/// Enforce `max_file_count` and `disk_quota_bytes`
///
/// `archived` holds the inactive files ordered oldest first; `active` is the
/// file currently open for writing, which counts towards both limits but is
/// never deleted. Files are dropped from `archived` even when the deletion
/// itself fails.
///
/// Returns the number of files removed.
pub(crate) fn enforce_retention(
    archived: &mut Vec<LogFile>,
    active: Option<&LogFile>,
    config: &RotationConfig,
    fs: &dyn LogFileSystem,
) -> usize {
    let mut removed = 0;

    while !archived.is_empty() && exceeds_limits(archived, active, config) {
        let oldest = archived.remove(0);
        removed += 1;

        match fs.delete_file(&oldest.path) {
            Ok(()) => {
                tracing::debug!(path = %oldest.path.display(), "Deleted old log file");
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %oldest.path.display(), "Old log file already gone");
            }
            Err(e) => {
                tracing::warn!(
                    path = %oldest.path.display(),
                    kind = categorize_io_error(&e).describe(),
                    error = %e,
                    "Failed to delete old log file"
                );
            }
        }
    }

    removed
}

fn exceeds_limits(archived: &[LogFile], active: Option<&LogFile>, config: &RotationConfig) -> bool {
    let count = archived.len() + usize::from(active.is_some());
    if let Some(max_count) = config.max_file_count {
        if count > max_count {
            return true;
        }
    }

    if let Some(quota) = config.disk_quota_bytes {
        let total: u64 = archived
            .iter()
            .chain(active)
            .map(|f| f.size)
            .sum();
        if total > quota {
            return true;
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::fs::StdFileSystem;
    use chrono::{Duration, TimeZone, Utc};
    use std::path::Path;
    use tempfile::TempDir;

    fn make_files(dir: &Path, sizes: &[u64]) -> Vec<LogFile> {
        let base = Utc.with_ymd_and_hms(2026, 1, 21, 0, 0, 0).unwrap();
        sizes
            .iter()
            .enumerate()
            .map(|(i, size)| {
                let path = dir.join(format!("app-{}.log", i));
                std::fs::write(&path, vec![b'x'; *size as usize]).unwrap();
                LogFile {
                    path,
                    created: base + Duration::minutes(i as i64),
                    size: *size,
                }
            })
            .collect()
    }

    fn limits(max_file_count: Option<usize>, disk_quota_bytes: Option<u64>) -> RotationConfig {
        RotationConfig {
            max_file_count,
            disk_quota_bytes,
            ..RotationConfig::unlimited()
        }
    }

    #[test]
    fn test_count_limit_deletes_oldest() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = make_files(temp_dir.path(), &[10, 10, 10, 10]);
        let active = files.pop().unwrap();
        let oldest = files[0].path.clone();

        let removed =
            enforce_retention(&mut files, Some(&active), &limits(Some(2), None), &StdFileSystem::new());

        assert_eq!(removed, 2);
        assert_eq!(files.len(), 1);
        assert!(!oldest.exists());
        assert!(active.path.exists());
        assert!(files[0].path.exists());
    }

    #[test]
    fn test_quota_counts_active_file() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = make_files(temp_dir.path(), &[40, 40, 40, 0]);
        let active = files.pop().unwrap();

        let removed =
            enforce_retention(&mut files, Some(&active), &limits(None, Some(100)), &StdFileSystem::new());

        assert_eq!(removed, 1);
        let total: u64 = files.iter().map(|f| f.size).sum::<u64>() + active.size;
        assert_eq!(total, 80);
    }

    #[test]
    fn test_active_file_never_deleted() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = make_files(temp_dir.path(), &[10, 500]);
        let active = files.pop().unwrap();

        let removed =
            enforce_retention(&mut files, Some(&active), &limits(Some(0), Some(100)), &StdFileSystem::new());

        assert_eq!(removed, 1);
        assert!(files.is_empty());
        assert!(active.path.exists());
    }

    #[test]
    fn test_within_limits_keeps_everything() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = make_files(temp_dir.path(), &[10, 10]);

        let removed =
            enforce_retention(&mut files, None, &limits(Some(5), Some(1000)), &StdFileSystem::new());

        assert_eq!(removed, 0);
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_missing_file_does_not_stop_sweep() {
        let temp_dir = TempDir::new().unwrap();
        let mut files = make_files(temp_dir.path(), &[10, 10, 10]);
        std::fs::remove_file(&files[0].path).unwrap();

        let removed =
            enforce_retention(&mut files, None, &limits(Some(1), None), &StdFileSystem::new());

        assert_eq!(removed, 2);
        assert_eq!(files.len(), 1);
        assert!(files[0].path.exists());
    }
}
