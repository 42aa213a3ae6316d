//! Log file naming
//!
//! Files are named `<prefix>-<local timestamp>.log`, with a numeric suffix
//! when two files are created within the same millisecond.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime, Utc};

const EXTENSION: &str = ".log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S%.3f";

/// Generate a timestamped log file path
pub fn log_file_path(logs_dir: &Path, prefix: &str, created: DateTime<Utc>, attempt: u32) -> PathBuf {
    let timestamp = created.with_timezone(&Local).format(TIMESTAMP_FORMAT);
    let name = if attempt == 0 {
        format!("{}-{}{}", prefix, timestamp, EXTENSION)
    } else {
        format!("{}-{}-{}{}", prefix, timestamp, attempt, EXTENSION)
    };
    logs_dir.join(name)
}

/// Check whether a path is a log file written with `prefix`
///
/// Only names of the exact `<prefix>-<timestamp>[-<n>].log` shape match, so
/// destinations whose prefixes nest (`app` and `app-net`) never claim each
/// other's files.
pub fn is_log_file(path: &Path, prefix: &str) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let Some(stem) = name
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|rest| rest.strip_suffix(EXTENSION))
    else {
        return false;
    };

    let timestamp = match stem.rsplit_once('-') {
        Some((timestamp, attempt))
            if !attempt.is_empty() && attempt.bytes().all(|b| b.is_ascii_digit()) =>
        {
            timestamp
        }
        _ => stem,
    };

    NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT).is_ok()
}
