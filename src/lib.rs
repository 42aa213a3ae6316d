//! catlog - category-based logging with fan-out destinations
//!
//! Messages are logged through a per-category [`Logger`], filtered by level,
//! and delivered to every destination registered with the
//! [`LoggingService`]. The [`FileDestination`] writes rotating log files with
//! size, age, count and disk quota limits.
//!
//! ```no_run
//! use std::sync::Arc;
//! use catlog::{ConsoleDestination, FileDestination, Level, LoggingService};
//!
//! catlog::categories! {
//!     pub enum Channel {
//!         App => "app",
//!         Net => "net",
//!     }
//! }
//!
//! # fn main() -> catlog::Result<()> {
//! let service = LoggingService::builder()
//!     .destination(Arc::new(ConsoleDestination::new()))
//!     .file_destination(Arc::new(FileDestination::new("/tmp/logs")?))
//!     .minimum_level(Level::Info)
//!     .build()?;
//!
//! let net = service.logger(Channel::Net);
//! catlog::info!(net, "connected to {}", "example.org");
//! # Ok(())
//! # }
//! ```

pub mod category;
pub mod config;
pub mod destination;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
mod macros;
pub mod message;
pub mod rotation;
pub mod service;

pub use category::Category;
pub use destination::{
    Completion, ConsoleDestination, Destination, FileDestination, LogEntry, MemoryDestination,
    RotatingFileDestination, TracingDestination,
};
pub use error::{Error, Result};
pub use format::{DefaultFormatter, MessageFormatter, PlainFormatter};
pub use level::{Level, LevelHint};
pub use logger::Logger;
pub use message::{Message, SourceLocation};
pub use rotation::RotationConfig;
pub use service::{LoggingService, LoggingServiceBuilder};
