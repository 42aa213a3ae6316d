//! Error types for catlog

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by catlog
#[derive(Debug, Error)]
pub enum Error {
    /// A logging service was built without any destination
    #[error("no log destinations configured")]
    NoDestinations,

    /// A category name does not belong to the registered category set
    #[error("unknown log category '{0}'")]
    UnknownCategory(String),

    /// The file is the active log file and cannot be removed
    #[error("{} is the active log file", .0.display())]
    ActiveLogFile(PathBuf),

    /// The file is not one of the retained log files
    #[error("{} is not a retained log file", .0.display())]
    UntrackedLogFile(PathBuf),

    /// The background file writer has shut down
    #[error("log file writer is no longer running")]
    WriterStopped,

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Filesystem failure
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            source,
        }
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}

/// Categories of disk errors for fallback reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskErrorKind {
    /// Disk is full or quota exceeded
    DiskFull,
    /// Permission denied (read or write)
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// Other IO error
    Other,
}

impl DiskErrorKind {
    /// Short description of this error kind
    pub fn describe(&self) -> &'static str {
        match self {
            DiskErrorKind::DiskFull => "disk full",
            DiskErrorKind::PermissionDenied => "permission denied",
            DiskErrorKind::NotFound => "file or directory not found",
            DiskErrorKind::Other => "i/o failure",
        }
    }
}

/// Categorize an IO error
pub fn categorize_io_error(e: &std::io::Error) -> DiskErrorKind {
    use std::io::ErrorKind;

    match e.kind() {
        // On some systems, disk full shows up as WriteZero
        ErrorKind::WriteZero => DiskErrorKind::DiskFull,
        ErrorKind::PermissionDenied => DiskErrorKind::PermissionDenied,
        ErrorKind::NotFound => DiskErrorKind::NotFound,
        _ => {
            #[cfg(unix)]
            {
                if let Some(os_error) = e.raw_os_error() {
                    // ENOSPC = 28, EDQUOT = 122 on Linux and 69 on macOS
                    if os_error == 28 || os_error == 122 || os_error == 69 {
                        return DiskErrorKind::DiskFull;
                    }
                    // EACCES
                    if os_error == 13 {
                        return DiskErrorKind::PermissionDenied;
                    }
                }
            }
            DiskErrorKind::Other
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_categorize_by_kind() {
        let e = io::Error::new(io::ErrorKind::NotFound, "gone");
        assert_eq!(categorize_io_error(&e), DiskErrorKind::NotFound);

        let e = io::Error::new(io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(categorize_io_error(&e), DiskErrorKind::PermissionDenied);

        let e = io::Error::new(io::ErrorKind::WriteZero, "short write");
        assert_eq!(categorize_io_error(&e), DiskErrorKind::DiskFull);

        let e = io::Error::new(io::ErrorKind::Other, "weird");
        assert_eq!(categorize_io_error(&e), DiskErrorKind::Other);
    }

    #[cfg(unix)]
    #[test]
    fn test_categorize_enospc() {
        let e = io::Error::from_raw_os_error(28);
        assert_eq!(categorize_io_error(&e), DiskErrorKind::DiskFull);
    }

    #[test]
    fn test_error_display() {
        let e = Error::ActiveLogFile(PathBuf::from("/tmp/a.log"));
        assert_eq!(e.to_string(), "/tmp/a.log is the active log file");

        let e = Error::io("Failed to create log file", io::Error::new(io::ErrorKind::Other, "boom"));
        assert_eq!(e.to_string(), "Failed to create log file: boom");
    }
}
