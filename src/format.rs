//! Message formatting
//!
//! Formatters turn a [`Message`] into the text a destination writes.

use chrono::Local;

use crate::category::Category;
use crate::message::Message;

/// Timestamp pattern used by [`DefaultFormatter`] (second resolution)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Converts messages into displayable strings
pub trait MessageFormatter<C: Category>: Send + Sync {
    fn format(&self, message: &Message<C>) -> String;
}

/// Formatter that emits only the message text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainFormatter;

impl<C: Category> MessageFormatter<C> for PlainFormatter {
    fn format(&self, message: &Message<C>) -> String {
        message.text().to_string()
    }
}

/// Formatter producing `[level] [category] timestamp (file:line) text`
///
/// The category and timestamp components are optional and are left out
/// entirely when disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultFormatter {
    pub include_timestamp: bool,
    pub include_category: bool,
}

impl DefaultFormatter {
    pub fn new(include_timestamp: bool, include_category: bool) -> Self {
        Self {
            include_timestamp,
            include_category,
        }
    }
}

impl Default for DefaultFormatter {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl<C: Category> MessageFormatter<C> for DefaultFormatter {
    fn format(&self, message: &Message<C>) -> String {
        let mut components = Vec::with_capacity(5);

        components.push(format!("[{}]", message.level()));
        if self.include_category {
            components.push(format!("[{}]", message.category().name()));
        }
        if self.include_timestamp {
            components.push(
                message
                    .timestamp()
                    .with_timezone(&Local)
                    .format(TIMESTAMP_FORMAT)
                    .to_string(),
            );
        }
        let location = message.location();
        components.push(format!("({}:{})", location.file_name(), location.line));
        components.push(message.text().to_string());

        components.join(" ")
    }
}
