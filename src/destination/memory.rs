//! In-memory log destination for real-time viewing
//!
//! Keeps the most recent formatted entries in a bounded ring buffer, plus a
//! separate buffer holding only warnings and errors.

use std::collections::VecDeque;
use std::sync::{PoisonError, RwLock};

use chrono::{DateTime, Utc};

use crate::category::Category;
use crate::error::Result;
use crate::format::{DefaultFormatter, MessageFormatter};
use crate::level::Level;
use crate::message::Message;

use super::Destination;

/// A single buffered entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Timestamp of the original message
    pub timestamp: DateTime<Utc>,
    /// Message level
    pub level: Level,
    /// Category name
    pub category: &'static str,
    /// Formatted text
    pub text: String,
}

/// Thread-safe ring buffer destination
pub struct MemoryDestination<C: Category> {
    formatter: Box<dyn MessageFormatter<C>>,
    /// All entries (capped at max_entries)
    entries: RwLock<VecDeque<LogEntry>>,
    /// Warnings and errors only
    alerts: RwLock<VecDeque<LogEntry>>,
    max_entries: usize,
    max_alerts: usize,
}

impl<C: Category> MemoryDestination<C> {
    /// Create a buffer with the given capacities
    pub fn new(max_entries: usize, max_alerts: usize) -> Self {
        Self::with_formatter(max_entries, max_alerts, DefaultFormatter::new(false, true))
    }

    pub fn with_formatter(
        max_entries: usize,
        max_alerts: usize,
        formatter: impl MessageFormatter<C> + 'static,
    ) -> Self {
        Self {
            formatter: Box::new(formatter),
            entries: RwLock::new(VecDeque::with_capacity(max_entries)),
            alerts: RwLock::new(VecDeque::with_capacity(max_alerts)),
            max_entries,
            max_alerts,
        }
    }

    fn push(&self, entry: LogEntry) {
        if entry.level.is_alert() && self.max_alerts > 0 {
            let mut alerts = self.alerts.write().unwrap_or_else(PoisonError::into_inner);
            if alerts.len() >= self.max_alerts {
                alerts.pop_front();
            }
            alerts.push_back(entry.clone());
        }

        if self.max_entries == 0 {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// Snapshot of all buffered entries, oldest first
    pub fn all_entries(&self) -> Vec<LogEntry> {
        self.entries
            .read()
            .map(|e| e.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending warnings and errors
    pub fn pending_alerts(&self) -> Vec<LogEntry> {
        self.alerts
            .read()
            .map(|a| a.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.read().map(|a| a.len()).unwrap_or(0)
    }

    /// Clear all alerts (after they've been acknowledged)
    pub fn clear_alerts(&self) {
        if let Ok(mut alerts) = self.alerts.write() {
            alerts.clear();
        }
    }
}

impl<C: Category> Destination<C> for MemoryDestination<C> {
    fn log(&self, message: &Message<C>) -> Result<()> {
        self.push(LogEntry {
            timestamp: message.timestamp(),
            level: message.level(),
            category: message.category().name(),
            text: self.formatter.format(message),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::tests::TestCategory;
    use crate::format::PlainFormatter;
    use crate::message::SourceLocation;

    fn message(level: Level, text: &str) -> Message<TestCategory> {
        Message::new(
            level,
            TestCategory::App,
            text,
            SourceLocation::new("app.rs", "app", 1),
        )
    }

    #[test]
    fn test_memory_push_and_retrieve() {
        let buffer: MemoryDestination<TestCategory> = MemoryDestination::with_formatter(100, 10, PlainFormatter);

        buffer.log(&message(Level::Info, "message 1")).unwrap();
        buffer.log(&message(Level::Warning, "warning 1")).unwrap();
        buffer.log(&message(Level::Error, "error 1")).unwrap();

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.alert_count(), 2);

        let entries = buffer.all_entries();
        assert_eq!(entries[0].text, "message 1");
        assert_eq!(entries[1].text, "warning 1");
        assert_eq!(entries[2].text, "error 1");
        assert_eq!(entries[0].category, "app");

        let alerts = buffer.pending_alerts();
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].text, "warning 1");
        assert_eq!(alerts[1].text, "error 1");

        buffer.clear_alerts();
        assert_eq!(buffer.alert_count(), 0);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_memory_capacity() {
        let buffer: MemoryDestination<TestCategory> = MemoryDestination::with_formatter(3, 2, PlainFormatter);

        for i in 0..5 {
            buffer.log(&message(Level::Info, &format!("msg {}", i))).unwrap();
        }

        assert_eq!(buffer.len(), 3);
        let entries = buffer.all_entries();
        assert_eq!(entries[0].text, "msg 2");
        assert_eq!(entries[1].text, "msg 3");
        assert_eq!(entries[2].text, "msg 4");
    }

    #[test]
    fn test_memory_uses_formatter() {
        let buffer: MemoryDestination<TestCategory> = MemoryDestination::new(10, 10);
        buffer.log(&message(Level::Debug, "formatted")).unwrap();
        assert_eq!(buffer.all_entries()[0].text, "[debug] [app] (app.rs:1) formatted");
    }
}
