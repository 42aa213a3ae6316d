//! Console destination

use std::io::Write;

use crate::category::Category;
use crate::error::Result;
use crate::format::{DefaultFormatter, MessageFormatter};
use crate::level::LevelHint;
use crate::message::Message;

use super::Destination;

/// Host primitive that prints one formatted line
///
/// Implementations must not fail observably.
pub trait ConsoleWriter: Send + Sync {
    fn write_line(&self, text: &str, hint: LevelHint);
}

/// Writes every line to standard error
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrWriter;

impl ConsoleWriter for StderrWriter {
    fn write_line(&self, text: &str, _hint: LevelHint) {
        let stderr = std::io::stderr();
        let mut handle = stderr.lock();
        let _ = writeln!(handle, "{}", text);
    }
}

/// Destination that passes formatted messages to a [`ConsoleWriter`]
pub struct ConsoleDestination<C: Category> {
    formatter: Box<dyn MessageFormatter<C>>,
    writer: Box<dyn ConsoleWriter>,
}

impl<C: Category> ConsoleDestination<C> {
    /// Console destination on stderr with category labels and no timestamps
    pub fn new() -> Self {
        Self::with_writer(DefaultFormatter::new(false, true), StderrWriter)
    }

    pub fn with_formatter(formatter: impl MessageFormatter<C> + 'static) -> Self {
        Self::with_writer(formatter, StderrWriter)
    }

    pub fn with_writer(
        formatter: impl MessageFormatter<C> + 'static,
        writer: impl ConsoleWriter + 'static,
    ) -> Self {
        Self {
            formatter: Box::new(formatter),
            writer: Box::new(writer),
        }
    }
}

impl<C: Category> Default for ConsoleDestination<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Category> Destination<C> for ConsoleDestination<C> {
    fn log(&self, message: &Message<C>) -> Result<()> {
        let line = self.formatter.format(message);
        self.writer.write_line(&line, message.level().hint());
        Ok(())
    }
}
