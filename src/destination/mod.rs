//! Log destinations
//!
//! A destination receives every message the logging service accepts.
//! Destinations that write rotating log files additionally implement
//! [`RotatingFileDestination`].

mod console;
mod file;
mod forward;
mod memory;

use std::path::{Path, PathBuf};

use crate::category::Category;
use crate::error::Result;
use crate::message::Message;
use crate::rotation::RotationConfig;

pub use console::{ConsoleDestination, ConsoleWriter, StderrWriter};
pub use file::{FileDestination, FileDestinationBuilder, DEFAULT_PREFIX};
pub use forward::TracingDestination;
pub use memory::{LogEntry, MemoryDestination};

/// Callback invoked once a requested rollover has finished
pub type Completion = Box<dyn FnOnce() + Send + 'static>;

/// A sink for log messages
pub trait Destination<C: Category>: Send + Sync {
    /// Deliver a message
    ///
    /// Errors are reported to the logging service, which records them on the
    /// diagnostics channel and keeps delivering to the other destinations.
    fn log(&self, message: &Message<C>) -> Result<()>;

    /// Wait until previously delivered messages have been written
    fn flush(&self) {}
}

/// Rotation and retention controls of a file-backed destination
pub trait RotatingFileDestination<C: Category>: Destination<C> {
    /// Rotation policy in effect
    fn rotation_config(&self) -> &RotationConfig;

    /// Directory holding the log files
    fn logs_directory(&self) -> &Path;

    /// Path of the file currently open for writing, if any
    fn current_log_file_path(&self) -> Option<PathBuf>;

    /// All retained log files, newest first
    fn sorted_log_file_paths(&self) -> Vec<PathBuf>;

    /// Request a rollover
    ///
    /// Returns immediately; `completion` runs on the writer thread once the
    /// new file is ready and retention has been enforced.
    fn roll_log_file(&self, completion: Option<Completion>) -> Result<()>;

    /// Delete a retained, inactive log file
    fn delete_log_file(&self, path: &Path) -> Result<()>;
}
